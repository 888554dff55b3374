//! HTTP route handlers for the Cantata API
//!
//! This module contains all REST endpoint handlers:
//! - Playback control endpoints (mirror of the WebSocket command set)
//! - Catalog (library) endpoints
//! - Health check and status endpoints

pub mod health;
pub mod library;
pub mod playback;

pub use health::{health_router, HealthState};
pub use library::{library_router, LibraryState};
pub use playback::{playback_router, PlaybackState};
