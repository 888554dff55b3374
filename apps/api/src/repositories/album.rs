//! Album repository for centralized database operations

use sqlx::PgPool;
use uuid::Uuid;

use super::utils::ALBUM_COLUMNS;
use crate::models::Album;

/// Repository for album database operations
#[derive(Clone)]
pub struct AlbumRepository {
    pool: PgPool,
}

impl AlbumRepository {
    /// Create a new AlbumRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an album by its unique ID
    pub async fn find_by_id(&self, album_id: Uuid) -> Result<Option<Album>, sqlx::Error> {
        let sql = format!("SELECT {} FROM albums WHERE id = $1", ALBUM_COLUMNS);
        sqlx::query_as::<_, Album>(&sql)
            .bind(album_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find all albums with pagination
    pub async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Album>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM albums ORDER BY title ASC LIMIT $1 OFFSET $2",
            ALBUM_COLUMNS
        );
        sqlx::query_as::<_, Album>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Find albums by artist name
    #[allow(dead_code)]
    pub async fn find_by_artist(&self, artist_name: &str) -> Result<Vec<Album>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM albums WHERE artist_name = $1 ORDER BY title ASC",
            ALBUM_COLUMNS
        );
        sqlx::query_as::<_, Album>(&sql)
            .bind(artist_name)
            .fetch_all(&self.pool)
            .await
    }
}
