//! Cantata API library
//!
//! This module exposes the core API components for use in integration
//! tests and as a library.

pub mod config;
pub mod error;
pub mod models;
pub mod player;
pub mod repositories;
pub mod routes;
pub mod websocket;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use player::{PlaybackError, PlayerService};
pub use websocket::ConnectionRegistry;
