//! Real-time WebSocket layer
//!
//! This module handles:
//! - Connection tracking and liveness (heartbeat) for all clients
//! - Command dispatch from clients to the shared player
//! - Fan-out of playback state changes to every connection

pub mod dispatch;
pub mod handler;
pub mod heartbeat;
pub mod messages;
pub mod registry;

pub use dispatch::CommandDispatcher;
pub use handler::{spawn_state_broadcast, ws_handler, WsState};
pub use heartbeat::spawn_heartbeat;
pub use messages::{ClientEnvelope, Command, ErrorPayload, ServerEnvelope, ServerMessage};
pub use registry::{
    BroadcastOptions, ConnectionRegistry, InboundEvent, Outbound, RegistryStats,
};
