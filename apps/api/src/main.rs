use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod player;
mod repositories;
mod routes;
mod websocket;

pub use error::{ApiError, ApiResult, ErrorResponse};

use player::PlayerService;
use repositories::{AlbumRepository, ArtistRepository, TrackRepository};
use routes::{
    health_router, library_router, playback_router, HealthState, LibraryState, PlaybackState,
};
use websocket::{
    spawn_heartbeat, spawn_state_broadcast, ws_handler, ConnectionRegistry, WsState,
};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &config::Config) -> CorsLayer {
    let is_production = config.is_production();

    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PATCH,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                    .max_age(std::time::Duration::from_secs(3600))
            }
        }
        _ if is_production => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cantata_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting Cantata API server on port {}", config.port);

    // Initialize database pool
    let database_url = &config.common.database.url;
    tracing::info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(config.common.database.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.common.database.connect_timeout_secs,
        ))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed successfully");

    // Catalog repositories
    let track_repo = TrackRepository::new(pool.clone());
    let album_repo = AlbumRepository::new(pool.clone());
    let artist_repo = ArtistRepository::new(pool.clone());

    // One playback session for the whole process; the track repository
    // is its catalog collaborator.
    let player = Arc::new(PlayerService::new(track_repo.clone()));
    tracing::info!("PlayerService initialized");

    // Connection registry plus its background tasks: state fan-out to
    // all clients and the liveness heartbeat.
    let registry = ConnectionRegistry::new();
    spawn_state_broadcast(registry.clone(), player.clone());
    spawn_heartbeat(registry.clone(), config.sync());
    tracing::info!(
        interval_secs = config.sync().heartbeat_interval_secs,
        max_missed = config.sync().max_missed_heartbeats,
        "Heartbeat task started"
    );

    // Build the CORS layer from configuration
    let cors_layer = build_cors_layer(&config);

    // Per-router state
    let health_state = HealthState::new(pool.clone(), registry.clone());
    let library_state = LibraryState::new(track_repo, album_repo, artist_repo);
    let playback_state = PlaybackState::new(player.clone());
    let ws_routes = Router::new()
        .route("/", get(ws_handler::<TrackRepository>))
        .with_state(WsState { registry, player });

    // Build the router
    let app = Router::new()
        .route("/", get(root))
        // WebSocket endpoint: /ws
        .nest("/ws", ws_routes)
        // Nested health routes: /health, /health/live, /health/ready, /health/stats
        .nest("/health", health_router(health_state))
        // Playback control routes: /playback/play/:id, /playback/state, ...
        .nest("/playback", playback_router(playback_state))
        // Catalog routes: /library/tracks, /library/albums, ...
        .nest("/library", library_router(library_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    "Welcome to Cantata - Personal Music Library"
}
