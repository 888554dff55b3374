//! Artist repository for centralized database operations

use sqlx::PgPool;

use super::utils::ARTIST_COLUMNS;
use crate::models::Artist;

/// Repository for artist database operations
#[derive(Clone)]
pub struct ArtistRepository {
    pool: PgPool,
}

impl ArtistRepository {
    /// Create a new ArtistRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an artist by name
    #[allow(dead_code)]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Artist>, sqlx::Error> {
        let sql = format!("SELECT {} FROM artists WHERE name = $1", ARTIST_COLUMNS);
        sqlx::query_as::<_, Artist>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find all artists with pagination
    pub async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Artist>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM artists ORDER BY name ASC LIMIT $1 OFFSET $2",
            ARTIST_COLUMNS
        );
        sqlx::query_as::<_, Artist>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }
}
