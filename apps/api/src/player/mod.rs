//! Shared playback session
//!
//! This module owns the process-wide "what is playing right now" state:
//! the current track, position, volume, the upcoming queue, and the
//! repeat/shuffle flags. All clients (WebSocket and REST) observe and
//! mutate the same injected [`PlayerService`] instance; every mutation
//! is announced on a typed broadcast channel.

pub mod events;
pub mod service;
pub mod state;

pub use events::{PlaybackEvent, StateChange};
pub use service::{Catalog, PlaybackError, PlayerService};
pub use state::{PlayerState, QueuedTrack, RepeatMode};
