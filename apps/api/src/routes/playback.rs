//! Playback control HTTP route handlers
//!
//! REST mirror of the WebSocket command set. Both surfaces share the
//! same injected player, so REST clients and WebSocket clients observe
//! one playback session.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::player::{
    Catalog, PlaybackError, PlayerService, PlayerState, QueuedTrack, RepeatMode,
};

/// Shared application state for playback handlers
pub struct PlaybackState<C> {
    pub player: Arc<PlayerService<C>>,
}

impl<C> Clone for PlaybackState<C> {
    fn clone(&self) -> Self {
        Self {
            player: self.player.clone(),
        }
    }
}

impl<C> PlaybackState<C> {
    /// Create new playback route state
    pub fn new(player: Arc<PlayerService<C>>) -> Self {
        Self { player }
    }
}

/// Request body for seek
#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub position: f64,
}

/// Request body for volume
#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: i64,
}

/// Request body for enqueueing a track
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub track_id: Uuid,
    #[serde(default)]
    pub index: Option<usize>,
}

/// Request body for setting the repeat mode
#[derive(Debug, Deserialize)]
pub struct RepeatRequest {
    pub mode: String,
}

/// Create playback control router
pub fn playback_router<C>(state: PlaybackState<C>) -> Router
where
    C: Catalog + 'static,
{
    Router::new()
        .route("/play/:track_id", post(play::<C>))
        .route("/pause", post(pause::<C>))
        .route("/resume", post(resume::<C>))
        .route("/stop", post(stop::<C>))
        .route("/next", post(next::<C>))
        .route("/previous", post(previous::<C>))
        .route("/seek", post(seek::<C>))
        .route("/volume", post(volume::<C>))
        .route("/state", get(state_snapshot::<C>))
        .route("/queue", get(queue::<C>).post(enqueue::<C>).delete(clear_queue::<C>))
        .route("/queue/:index", delete(dequeue::<C>))
        .route("/repeat", post(repeat::<C>))
        .route("/shuffle", post(shuffle::<C>))
        .with_state(state)
}

async fn play<C: Catalog>(
    State(state): State<PlaybackState<C>>,
    Path(track_id): Path<Uuid>,
) -> ApiResult<Json<PlayerState>> {
    Ok(Json(state.player.start(track_id).await?))
}

async fn pause<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<PlayerState> {
    Json(state.player.pause())
}

async fn resume<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<PlayerState> {
    Json(state.player.resume())
}

async fn stop<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<PlayerState> {
    Json(state.player.stop())
}

async fn next<C: Catalog>(State(state): State<PlaybackState<C>>) -> ApiResult<Json<PlayerState>> {
    Ok(Json(state.player.play_next()?))
}

async fn previous<C: Catalog>(
    State(state): State<PlaybackState<C>>,
) -> ApiResult<Json<PlayerState>> {
    Ok(Json(state.player.play_previous()?))
}

async fn seek<C: Catalog>(
    State(state): State<PlaybackState<C>>,
    Json(body): Json<SeekRequest>,
) -> ApiResult<Json<PlayerState>> {
    Ok(Json(state.player.seek_to(body.position)?))
}

async fn volume<C: Catalog>(
    State(state): State<PlaybackState<C>>,
    Json(body): Json<VolumeRequest>,
) -> Json<PlayerState> {
    Json(state.player.set_volume(body.volume))
}

async fn state_snapshot<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<PlayerState> {
    Json(state.player.state())
}

async fn queue<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<Vec<QueuedTrack>> {
    Json(state.player.state().queue)
}

async fn enqueue<C: Catalog>(
    State(state): State<PlaybackState<C>>,
    Json(body): Json<EnqueueRequest>,
) -> ApiResult<Json<PlayerState>> {
    Ok(Json(state.player.add_to_queue(body.track_id, body.index).await?))
}

async fn dequeue<C: Catalog>(
    State(state): State<PlaybackState<C>>,
    Path(index): Path<usize>,
) -> ApiResult<Json<PlayerState>> {
    Ok(Json(state.player.remove_from_queue(index)?))
}

async fn clear_queue<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<PlayerState> {
    Json(state.player.clear_queue())
}

async fn repeat<C: Catalog>(
    State(state): State<PlaybackState<C>>,
    Json(body): Json<RepeatRequest>,
) -> ApiResult<Json<PlayerState>> {
    let mode = body.mode.parse::<RepeatMode>().map_err(|_| {
        PlaybackError::InvalidArgument(format!("unknown repeat mode: {}", body.mode))
    })?;
    Ok(Json(state.player.set_repeat(mode)))
}

async fn shuffle<C: Catalog>(State(state): State<PlaybackState<C>>) -> Json<PlayerState> {
    Json(state.player.toggle_shuffle())
}
