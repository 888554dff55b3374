//! Playback state snapshots
//!
//! These types are both the internal representation of the playback
//! session and the wire payloads reported to clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Track;

/// Default volume for a fresh session
pub const DEFAULT_VOLUME: u8 = 70;

/// Repeat mode options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    None,
    Track,
    Queue,
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepeatMode::None => write!(f, "none"),
            RepeatMode::Track => write!(f, "track"),
            RepeatMode::Queue => write!(f, "queue"),
        }
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RepeatMode::None),
            "track" => Ok(RepeatMode::Track),
            "queue" => Ok(RepeatMode::Queue),
            _ => Err(()),
        }
    }
}

/// Denormalized track snapshot held by the playback session
///
/// The session never reaches back into the catalog for display fields;
/// whatever was true at enqueue time is what gets reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedTrack {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_secs: f64,
}

impl From<&Track> for QueuedTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id,
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            duration_secs: f64::from(track.duration_secs),
        }
    }
}

/// Snapshot of the shared playback state
///
/// `position` is meaningful only while `current_track` is set, and
/// `is_playing` is false whenever it is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    /// Currently playing track (None when stopped)
    pub current_track: Option<QueuedTrack>,

    /// Whether playback is active
    pub is_playing: bool,

    /// Current position in seconds
    pub position: f64,

    /// Volume level (0-100)
    pub volume: u8,

    /// Upcoming tracks in play order
    pub queue: Vec<QueuedTrack>,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Shuffle mode enabled
    pub shuffle: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position: 0.0,
            volume: DEFAULT_VOLUME,
            queue: Vec::new(),
            repeat: RepeatMode::None,
            shuffle: false,
        }
    }
}
