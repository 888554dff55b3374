//! Typed playback events
//!
//! Every mutation of the playback session produces one of these events,
//! delivered to subscribers together with the full state snapshot so
//! listeners never need a follow-up read.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{PlayerState, RepeatMode};

/// Event emitted by the player on state mutations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A track started from the beginning
    Started { track_id: Uuid },

    /// Playback paused
    Paused { track_id: Uuid },

    /// Playback resumed
    Resumed { track_id: Uuid },

    /// Playback stopped and the current track cleared
    Stopped,

    /// Advanced to the next track
    Next { track_id: Uuid },

    /// Stepped back to a previously played track
    Previous { track_id: Uuid },

    /// Position changed within the current track
    Seeked { position: f64 },

    /// Volume changed
    VolumeChanged { volume: u8 },

    /// A track was inserted into the queue
    QueueAdded { track_id: Uuid, index: usize },

    /// A track was removed from the queue
    QueueRemoved { track_id: Uuid, index: usize },

    /// The queue was emptied
    QueueCleared,

    /// Repeat mode changed
    RepeatChanged { mode: RepeatMode },

    /// Shuffle flag flipped
    ShuffleChanged { enabled: bool },
}

/// Notification delivered to state subscribers
#[derive(Debug, Clone)]
pub struct StateChange {
    /// What happened
    pub event: PlaybackEvent,

    /// Full snapshot after the mutation
    pub state: PlayerState,
}
