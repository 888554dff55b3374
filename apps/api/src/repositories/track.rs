//! Track repository for centralized database operations
//!
//! All track-related SQL lives here, following the repository pattern.
//! The repository doubles as the player's [`Catalog`] collaborator.

use std::future::Future;

use sqlx::PgPool;
use uuid::Uuid;

use super::utils::{escape_ilike, TRACK_COLUMNS};
use crate::models::Track;
use crate::player::{Catalog, PlaybackError};

/// Repository for track database operations
#[derive(Clone)]
pub struct TrackRepository {
    pool: PgPool,
}

impl TrackRepository {
    /// Create a new TrackRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a track by its unique ID
    pub async fn find_by_id(&self, track_id: Uuid) -> Result<Option<Track>, sqlx::Error> {
        let sql = format!("SELECT {} FROM tracks WHERE id = $1", TRACK_COLUMNS);
        sqlx::query_as::<_, Track>(&sql)
            .bind(track_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a track by its external source id
    #[allow(dead_code)]
    pub async fn find_by_source_id(&self, source_id: &str) -> Result<Option<Track>, sqlx::Error> {
        let sql = format!("SELECT {} FROM tracks WHERE source_id = $1", TRACK_COLUMNS);
        sqlx::query_as::<_, Track>(&sql)
            .bind(source_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find all tracks with pagination
    pub async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Track>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM tracks ORDER BY title ASC LIMIT $1 OFFSET $2",
            TRACK_COLUMNS
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Find tracks by album ID in track order
    pub async fn find_by_album(&self, album_id: Uuid) -> Result<Vec<Track>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM tracks WHERE album_id = $1 ORDER BY track_number ASC, title ASC",
            TRACK_COLUMNS
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(album_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Search tracks by title or artist
    ///
    /// Escapes ILIKE special characters to prevent pattern injection.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<Track>, sqlx::Error> {
        let escaped = escape_ilike(query);
        let sql = format!(
            r#"SELECT {} FROM tracks
            WHERE title ILIKE $1 OR artist ILIKE $1
            ORDER BY
                CASE WHEN title ILIKE $2 THEN 0 ELSE 1 END,
                title ASC
            LIMIT $3"#,
            TRACK_COLUMNS
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(format!("%{}%", escaped))
            .bind(format!("{}%", escaped))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    /// Set the user rating for a track, returning the updated record
    pub async fn set_rating(
        &self,
        track_id: Uuid,
        rating: i32,
    ) -> Result<Option<Track>, sqlx::Error> {
        let sql = format!(
            "UPDATE tracks SET rating = $2 WHERE id = $1 RETURNING {}",
            TRACK_COLUMNS
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(track_id)
            .bind(rating)
            .fetch_optional(&self.pool)
            .await
    }

    /// Update the file path of a track (used when files are moved on disk)
    pub async fn update_file_path(
        &self,
        track_id: Uuid,
        file_path: &str,
    ) -> Result<Option<Track>, sqlx::Error> {
        let sql = format!(
            "UPDATE tracks SET file_path = $2 WHERE id = $1 RETURNING {}",
            TRACK_COLUMNS
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(track_id)
            .bind(file_path)
            .fetch_optional(&self.pool)
            .await
    }

    /// Total number of tracks in the catalog
    #[allow(dead_code)]
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
            .fetch_one(&self.pool)
            .await
    }
}

impl Catalog for TrackRepository {
    fn track_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Track>, PlaybackError>> + Send {
        let repo = self.clone();
        async move {
            repo.find_by_id(id)
                .await
                .map_err(|e| PlaybackError::Catalog(e.to_string()))
        }
    }
}
