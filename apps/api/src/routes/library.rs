//! Catalog HTTP route handlers
//!
//! Read-mostly surface over the track/album/artist repositories. The
//! two mutable track fields (`rating`, `file_path`) are updated here —
//! the playback session never writes to the catalog.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Album, Artist, Track};
use crate::repositories::{AlbumRepository, ArtistRepository, TrackRepository};

/// Shared application state for library handlers
#[derive(Clone)]
pub struct LibraryState {
    pub tracks: TrackRepository,
    pub albums: AlbumRepository,
    pub artists: ArtistRepository,
}

impl LibraryState {
    /// Create new library route state
    pub fn new(tracks: TrackRepository, albums: AlbumRepository, artists: ArtistRepository) -> Self {
        Self {
            tracks,
            albums,
            artists,
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    20
}

/// Request body for rating updates
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: i32,
}

/// Request body for file path updates
#[derive(Debug, Deserialize)]
pub struct FilePathRequest {
    pub file_path: String,
}

/// Create library router
pub fn library_router(state: LibraryState) -> Router {
    Router::new()
        .route("/tracks", get(list_tracks))
        .route("/tracks/search", get(search_tracks))
        .route("/tracks/:track_id", get(get_track))
        .route("/tracks/:track_id/rating", patch(rate_track))
        .route("/tracks/:track_id/file-path", patch(move_track))
        .route("/albums", get(list_albums))
        .route("/albums/:album_id/tracks", get(album_tracks))
        .route("/artists", get(list_artists))
        .with_state(state)
}

async fn list_tracks(
    State(state): State<LibraryState>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Vec<Track>>> {
    let tracks = state.tracks.find_all(page.limit, page.offset).await?;
    Ok(Json(tracks))
}

async fn search_tracks(
    State(state): State<LibraryState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Track>>> {
    if params.q.trim().is_empty() {
        return Err(ApiError::InvalidQueryParam {
            name: "q",
            reason: "must not be empty".to_string(),
        });
    }
    let tracks = state.tracks.search(params.q.trim(), params.limit).await?;
    Ok(Json(tracks))
}

async fn get_track(
    State(state): State<LibraryState>,
    Path(track_id): Path<Uuid>,
) -> ApiResult<Json<Track>> {
    let track = state
        .tracks
        .find_by_id(track_id)
        .await?
        .ok_or_else(|| ApiError::not_found("track", track_id.to_string()))?;
    Ok(Json(track))
}

async fn rate_track(
    State(state): State<LibraryState>,
    Path(track_id): Path<Uuid>,
    Json(body): Json<RatingRequest>,
) -> ApiResult<Json<Track>> {
    let track = state
        .tracks
        .set_rating(track_id, body.rating)
        .await?
        .ok_or_else(|| ApiError::not_found("track", track_id.to_string()))?;
    Ok(Json(track))
}

async fn move_track(
    State(state): State<LibraryState>,
    Path(track_id): Path<Uuid>,
    Json(body): Json<FilePathRequest>,
) -> ApiResult<Json<Track>> {
    if body.file_path.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "file_path must not be empty".to_string(),
        ));
    }
    let track = state
        .tracks
        .update_file_path(track_id, body.file_path.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("track", track_id.to_string()))?;
    Ok(Json(track))
}

async fn list_albums(
    State(state): State<LibraryState>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Vec<Album>>> {
    let albums = state.albums.find_all(page.limit, page.offset).await?;
    Ok(Json(albums))
}

async fn album_tracks(
    State(state): State<LibraryState>,
    Path(album_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Track>>> {
    // Distinguish "no such album" from "album with no tracks".
    state
        .albums
        .find_by_id(album_id)
        .await?
        .ok_or_else(|| ApiError::not_found("album", album_id.to_string()))?;
    let tracks = state.tracks.find_by_album(album_id).await?;
    Ok(Json(tracks))
}

async fn list_artists(
    State(state): State<LibraryState>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Vec<Artist>>> {
    let artists = state.artists.find_all(page.limit, page.offset).await?;
    Ok(Json(artists))
}
