//! Test fixtures for API integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cantata_api::models::Track;
use cantata_api::player::{Catalog, PlaybackError, PlayerService};

/// In-memory catalog collaborator
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tracks: HashMap<Uuid, Track>,
}

impl MemoryCatalog {
    /// Build a catalog over the given tracks
    pub fn new(tracks: impl IntoIterator<Item = Track>) -> Self {
        Self {
            tracks: tracks.into_iter().map(|t| (t.id, t)).collect(),
        }
    }
}

impl Catalog for MemoryCatalog {
    fn track_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Track>, PlaybackError>> + Send {
        let track = self.tracks.get(&id).cloned();
        async move { Ok(track) }
    }
}

/// Build a catalog track with the given title and duration
pub fn track(title: &str, duration_secs: i32) -> Track {
    Track {
        id: Uuid::new_v4(),
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        album_id: None,
        duration_secs,
        file_path: format!("/music/{}.mp3", title.to_lowercase().replace(' ', "-")),
        source_id: None,
        source_url: None,
        rating: 0,
        track_number: Some(1),
        created_at: Utc::now(),
    }
}

/// Build a player over an in-memory catalog of the given tracks
pub fn player_with(tracks: &[Track]) -> Arc<PlayerService<MemoryCatalog>> {
    Arc::new(PlayerService::new(MemoryCatalog::new(tracks.iter().cloned())))
}
