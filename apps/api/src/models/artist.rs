//! Artist model for the Cantata catalog

use serde::Serialize;
use sqlx::FromRow;

/// Artist record from the artists table
///
/// Artists are keyed by name, as delivered by import metadata.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artist {
    /// Artist name (primary key)
    pub name: String,

    /// Free-form description
    pub description: Option<String>,
}
