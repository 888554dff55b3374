//! Shared utility functions for repositories

/// Escape special characters in ILIKE patterns to prevent pattern injection.
///
/// ILIKE uses `%` for any sequence and `_` for single character wildcards.
/// If user input contains these characters, they must be escaped to match literally.
pub fn escape_ilike(pattern: &str) -> String {
    pattern
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

// ============================================================================
// SQL Column Constants
// ============================================================================

/// SQL columns for track queries
pub const TRACK_COLUMNS: &str = r#"
    id, title, artist, album, album_id,
    duration_secs, file_path, source_id, source_url,
    rating, track_number, created_at
"#;

/// SQL columns for album queries
pub const ALBUM_COLUMNS: &str = r#"
    id, title, artist_name, kind, source_url, created_at
"#;

/// SQL columns for artist queries
pub const ARTIST_COLUMNS: &str = "name, description";
