//! Album model for the Cantata catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Album kind enum matching PostgreSQL album_kind
///
/// Imported collections keep their source distinction: a real album
/// release or an arbitrary playlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "album_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlbumKind {
    #[default]
    Album,
    Playlist,
}

impl std::fmt::Display for AlbumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlbumKind::Album => write!(f, "album"),
            AlbumKind::Playlist => write!(f, "playlist"),
        }
    }
}

/// Album record from the albums table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Album {
    /// Unique album identifier
    pub id: Uuid,

    /// Album title
    pub title: String,

    /// Artist name (optional for compilations and playlists)
    pub artist_name: Option<String>,

    /// Whether this is an album release or a playlist
    pub kind: AlbumKind,

    /// URL of the album at its external source
    pub source_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_kind_display() {
        assert_eq!(AlbumKind::Album.to_string(), "album");
        assert_eq!(AlbumKind::Playlist.to_string(), "playlist");
    }

    #[test]
    fn test_album_kind_serialization() {
        assert_eq!(serde_json::to_string(&AlbumKind::Album).unwrap(), "\"album\"");
        assert_eq!(
            serde_json::to_string(&AlbumKind::Playlist).unwrap(),
            "\"playlist\""
        );
    }
}
