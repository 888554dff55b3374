//! The playback session service
//!
//! [`PlayerService`] is the single source of truth for the shared
//! playback session. It is an explicitly constructed, injected object
//! (one per server process); tests instantiate isolated instances with
//! an in-memory catalog.
//!
//! Locking discipline: the state lives behind one `RwLock` that is
//! never held across an await. Catalog lookups complete before the
//! lock is taken, so each operation's mutation is atomic and
//! conflicting writers resolve last-writer-wins.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Track;

use super::events::{PlaybackEvent, StateChange};
use super::state::{PlayerState, QueuedTrack, RepeatMode};

/// Channel capacity for state-change notifications
const EVENT_CAPACITY: usize = 256;

/// Most recently started tracks remembered for "previous"
const HISTORY_LIMIT: usize = 50;

/// Typed errors for playback operations
///
/// All of these are local and recoverable: the dispatch boundary turns
/// them into client-visible error replies and nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The catalog cannot resolve the given track id
    #[error("track not found: {0}")]
    TrackNotFound(Uuid),

    /// Bad input shape or range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The queue is exhausted and repeat does not wrap
    #[error("no next track available")]
    NoNextTrack,

    /// The play history is empty
    #[error("no previous track available")]
    NoPreviousTrack,

    /// Seek target outside [0, duration], or no current track
    #[error("invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// Queue index past the end of the queue
    #[error("queue index out of range: {0}")]
    QueueIndexOutOfRange(usize),

    /// The catalog collaborator failed
    #[error("catalog error: {0}")]
    Catalog(String),
}

/// Track lookup collaborator owned by the catalog layer
///
/// The player is otherwise unaware of how tracks are stored, searched,
/// or rated.
pub trait Catalog: Send + Sync {
    /// Resolve a track by id; `None` when the id is unknown
    fn track_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Track>, PlaybackError>> + Send;
}

#[derive(Debug, Default)]
struct PlayerInner {
    state: PlayerState,
    history: VecDeque<QueuedTrack>,
}

/// The shared playback session
pub struct PlayerService<C> {
    catalog: C,
    inner: RwLock<PlayerInner>,
    events: broadcast::Sender<StateChange>,
}

impl<C: Catalog> PlayerService<C> {
    /// Create a new session with a fresh (stopped) state
    pub fn new(catalog: C) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog,
            inner: RwLock::new(PlayerInner::default()),
            events,
        }
    }

    /// Subscribe to state-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> PlayerState {
        self.read().state.clone()
    }

    /// Start playing a track from the beginning
    pub async fn start(&self, track_id: Uuid) -> Result<PlayerState, PlaybackError> {
        let track = self.resolve(track_id).await?;
        let state = {
            let mut inner = self.write();
            begin_track(&mut inner, track);
            inner.state.clone()
        };
        self.emit(PlaybackEvent::Started { track_id }, state.clone());
        Ok(state)
    }

    /// Pause playback; a no-op when already paused or nothing is current
    pub fn pause(&self) -> PlayerState {
        let (event, state) = {
            let mut inner = self.write();
            let current_id = inner.state.current_track.as_ref().map(|t| t.id);
            let event = match current_id {
                Some(track_id) if inner.state.is_playing => {
                    inner.state.is_playing = false;
                    Some(PlaybackEvent::Paused { track_id })
                }
                _ => None,
            };
            (event, inner.state.clone())
        };
        if let Some(event) = event {
            self.emit(event, state.clone());
        }
        state
    }

    /// Resume playback; a no-op when already playing or nothing is current
    pub fn resume(&self) -> PlayerState {
        let (event, state) = {
            let mut inner = self.write();
            let current_id = inner.state.current_track.as_ref().map(|t| t.id);
            let event = match current_id {
                Some(track_id) if !inner.state.is_playing => {
                    inner.state.is_playing = true;
                    Some(PlaybackEvent::Resumed { track_id })
                }
                _ => None,
            };
            (event, inner.state.clone())
        };
        if let Some(event) = event {
            self.emit(event, state.clone());
        }
        state
    }

    /// Stop playback and clear the current track
    pub fn stop(&self) -> PlayerState {
        let state = {
            let mut inner = self.write();
            inner.state.current_track = None;
            inner.state.is_playing = false;
            inner.state.position = 0.0;
            inner.state.clone()
        };
        self.emit(PlaybackEvent::Stopped, state.clone());
        state
    }

    /// Advance to the next track
    ///
    /// The queue is FIFO: the head becomes current and leaves the queue.
    /// `repeat=track` replays the current track instead, and
    /// `repeat=queue` re-appends the just-finished track to the tail
    /// before advancing, which makes a lone track wrap onto itself.
    pub fn play_next(&self) -> Result<PlayerState, PlaybackError> {
        let (event, state) = {
            let mut inner = self.write();
            let current = inner.state.current_track.clone();

            match (inner.state.repeat, current) {
                (RepeatMode::Track, Some(track)) => {
                    inner.state.position = 0.0;
                    inner.state.is_playing = true;
                    let event = PlaybackEvent::Next { track_id: track.id };
                    (event, inner.state.clone())
                }
                (repeat, current) => {
                    if repeat == RepeatMode::Queue {
                        if let Some(track) = current {
                            inner.state.queue.push(track);
                        }
                    }
                    if inner.state.queue.is_empty() {
                        return Err(PlaybackError::NoNextTrack);
                    }
                    let track = inner.state.queue.remove(0);
                    let event = PlaybackEvent::Next { track_id: track.id };
                    begin_track(&mut inner, track);
                    (event, inner.state.clone())
                }
            }
        };
        self.emit(event, state.clone());
        Ok(state)
    }

    /// Step back to the previously played track
    ///
    /// Uses the bounded play history, not the forward queue. With a
    /// single history entry the current track restarts from the
    /// beginning.
    pub fn play_previous(&self) -> Result<PlayerState, PlaybackError> {
        let (event, state) = {
            let mut inner = self.write();
            if inner.history.is_empty() {
                return Err(PlaybackError::NoPreviousTrack);
            }
            let current_id = inner.state.current_track.as_ref().map(|t| t.id);
            let tip_is_current =
                current_id.is_some() && inner.history.back().map(|t| t.id) == current_id;

            let track = if tip_is_current && inner.history.len() > 1 {
                inner.history.pop_back();
                inner.history.back().cloned()
            } else {
                // Either only one entry (restart it) or the session was
                // stopped, in which case the tip is the last played track.
                inner.history.back().cloned()
            };
            let Some(track) = track else {
                return Err(PlaybackError::NoPreviousTrack);
            };
            let event = PlaybackEvent::Previous { track_id: track.id };
            begin_track(&mut inner, track);
            (event, inner.state.clone())
        };
        self.emit(event, state.clone());
        Ok(state)
    }

    /// Seek within the current track
    pub fn seek_to(&self, position: f64) -> Result<PlayerState, PlaybackError> {
        let state = {
            let mut inner = self.write();
            let duration = match &inner.state.current_track {
                Some(track) => track.duration_secs,
                None => return Err(PlaybackError::InvalidSeekPosition(position)),
            };
            if !position.is_finite() || position < 0.0 || position > duration {
                return Err(PlaybackError::InvalidSeekPosition(position));
            }
            inner.state.position = position;
            inner.state.clone()
        };
        self.emit(PlaybackEvent::Seeked { position }, state.clone());
        Ok(state)
    }

    /// Set the volume, silently clamped to [0, 100]
    pub fn set_volume(&self, volume: i64) -> PlayerState {
        let clamped = volume.clamp(0, 100) as u8;
        let state = {
            let mut inner = self.write();
            inner.state.volume = clamped;
            inner.state.clone()
        };
        self.emit(PlaybackEvent::VolumeChanged { volume: clamped }, state.clone());
        state
    }

    /// Insert a track into the queue at `index`, or append when absent
    /// (an index past the end also appends)
    pub async fn add_to_queue(
        &self,
        track_id: Uuid,
        index: Option<usize>,
    ) -> Result<PlayerState, PlaybackError> {
        let track = self.resolve(track_id).await?;
        let (event, state) = {
            let mut inner = self.write();
            let at = index
                .unwrap_or(inner.state.queue.len())
                .min(inner.state.queue.len());
            inner.state.queue.insert(at, track);
            (
                PlaybackEvent::QueueAdded {
                    track_id,
                    index: at,
                },
                inner.state.clone(),
            )
        };
        self.emit(event, state.clone());
        Ok(state)
    }

    /// Remove the queue entry at `index`
    pub fn remove_from_queue(&self, index: usize) -> Result<PlayerState, PlaybackError> {
        let (event, state) = {
            let mut inner = self.write();
            if index >= inner.state.queue.len() {
                return Err(PlaybackError::QueueIndexOutOfRange(index));
            }
            let track = inner.state.queue.remove(index);
            (
                PlaybackEvent::QueueRemoved {
                    track_id: track.id,
                    index,
                },
                inner.state.clone(),
            )
        };
        self.emit(event, state.clone());
        Ok(state)
    }

    /// Empty the queue
    pub fn clear_queue(&self) -> PlayerState {
        let state = {
            let mut inner = self.write();
            inner.state.queue.clear();
            inner.state.clone()
        };
        self.emit(PlaybackEvent::QueueCleared, state.clone());
        state
    }

    /// Set the repeat mode
    pub fn set_repeat(&self, mode: RepeatMode) -> PlayerState {
        let state = {
            let mut inner = self.write();
            inner.state.repeat = mode;
            inner.state.clone()
        };
        self.emit(PlaybackEvent::RepeatChanged { mode }, state.clone());
        state
    }

    /// Flip the shuffle flag
    pub fn toggle_shuffle(&self) -> PlayerState {
        let (enabled, state) = {
            let mut inner = self.write();
            inner.state.shuffle = !inner.state.shuffle;
            (inner.state.shuffle, inner.state.clone())
        };
        self.emit(PlaybackEvent::ShuffleChanged { enabled }, state.clone());
        state
    }

    async fn resolve(&self, track_id: Uuid) -> Result<QueuedTrack, PlaybackError> {
        let track = self
            .catalog
            .track_by_id(track_id)
            .await?
            .ok_or(PlaybackError::TrackNotFound(track_id))?;
        Ok(QueuedTrack::from(&track))
    }

    fn emit(&self, event: PlaybackEvent, state: PlayerState) {
        // No subscribers is fine (e.g. REST-only usage).
        let _ = self.events.send(StateChange { event, state });
    }

    fn read(&self) -> RwLockReadGuard<'_, PlayerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PlayerInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Make `track` current, playing from position zero, and record it in
/// the play history (consecutive replays collapse into one entry).
fn begin_track(inner: &mut PlayerInner, track: QueuedTrack) {
    if inner.history.back().map(|t| t.id) != Some(track.id) {
        if inner.history.len() == HISTORY_LIMIT {
            inner.history.pop_front();
        }
        inner.history.push_back(track.clone());
    }
    inner.state.current_track = Some(track);
    inner.state.is_playing = true;
    inner.state.position = 0.0;
}
