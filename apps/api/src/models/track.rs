//! Track model for the Cantata catalog
//!
//! Tracks are the unit of playback. Identity is stable after creation;
//! `file_path` and `rating` are the only fields the catalog mutates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Track record from the tracks table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Track {
    /// Unique track identifier
    pub id: Uuid,

    /// Track title
    pub title: String,

    /// Artist name (denormalized for display and snapshots)
    pub artist: String,

    /// Album title (denormalized, optional for singles)
    pub album: Option<String>,

    /// Album this track belongs to
    pub album_id: Option<Uuid>,

    /// Duration in seconds
    pub duration_secs: i32,

    /// Path to the audio file on disk
    pub file_path: String,

    /// Identifier of the external source the track was imported from
    pub source_id: Option<String>,

    /// URL of the track at its external source
    pub source_url: Option<String>,

    /// User likeability rating (0 is neutral)
    pub rating: i32,

    /// Track number on the album
    pub track_number: Option<i16>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Track {
    /// Returns a formatted duration string (e.g., "3:45")
    pub fn formatted_duration(&self) -> String {
        let minutes = self.duration_secs / 60;
        let seconds = self.duration_secs % 60;
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Track creation input
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub album_id: Option<Uuid>,
    pub duration_secs: i32,
    pub file_path: String,
    pub source_id: Option<String>,
    pub source_url: Option<String>,
    pub track_number: Option<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_duration() {
        let mut track = test_track();
        track.duration_secs = 225;
        assert_eq!(track.formatted_duration(), "3:45");

        track.duration_secs = 60;
        assert_eq!(track.formatted_duration(), "1:00");

        track.duration_secs = 5;
        assert_eq!(track.formatted_duration(), "0:05");
    }

    fn test_track() -> Track {
        Track {
            id: Uuid::new_v4(),
            title: "Test Track".to_string(),
            artist: "Test Artist".to_string(),
            album: Some("Test Album".to_string()),
            album_id: Some(Uuid::new_v4()),
            duration_secs: 180,
            file_path: "/music/test.mp3".to_string(),
            source_id: None,
            source_url: None,
            rating: 0,
            track_number: Some(1),
            created_at: Utc::now(),
        }
    }
}
