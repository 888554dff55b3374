//! WebSocket wire protocol
//!
//! All frames are JSON objects of shape `{type, payload, timestamp}`.
//! Inbound `command` frames carry an `action`-tagged payload which
//! parses into the closed [`Command`] enum; anything the enum does not
//! name is an unknown command, answered with an error reply.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::player::{PlaybackEvent, PlayerState};

// =============================================================================
// Client -> Server
// =============================================================================

/// Raw inbound frame
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    /// Frame type: `command`, `pong`, or anything a listener may care about
    #[serde(rename = "type")]
    pub kind: String,

    /// Frame payload; commands put `{action, ...}` here
    #[serde(default)]
    pub payload: Value,

    /// Client-reported send time (informational only)
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Command payload of a `command` frame
///
/// Track ids arrive as strings and are validated at dispatch so that
/// empty or malformed ids produce a typed invalid-argument error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    Play {
        track_id: String,
    },
    Pause,
    Resume,
    Stop,
    Next,
    Previous,
    Seek {
        position: f64,
    },
    SetVolume {
        volume: i64,
    },
    AddToQueue {
        track_id: String,
        #[serde(default)]
        index: Option<usize>,
    },
    RemoveFromQueue {
        index: usize,
    },
    ClearQueue,
    GetState,
    ToggleShuffle,
    SetRepeat {
        mode: String,
    },
    Ping,
    GetStatus,
}

impl Command {
    /// Action name, as used in error replies and logs
    pub fn action(&self) -> &'static str {
        match self {
            Command::Play { .. } => "play",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::Seek { .. } => "seek",
            Command::SetVolume { .. } => "set_volume",
            Command::AddToQueue { .. } => "add_to_queue",
            Command::RemoveFromQueue { .. } => "remove_from_queue",
            Command::ClearQueue => "clear_queue",
            Command::GetState => "get_state",
            Command::ToggleShuffle => "toggle_shuffle",
            Command::SetRepeat { .. } => "set_repeat",
            Command::Ping => "ping",
            Command::GetStatus => "get_status",
        }
    }
}

/// Actions the dispatcher recognizes, for error wording
pub const KNOWN_ACTIONS: &[&str] = &[
    "play",
    "pause",
    "resume",
    "stop",
    "next",
    "previous",
    "seek",
    "set_volume",
    "add_to_queue",
    "remove_from_queue",
    "clear_queue",
    "get_state",
    "toggle_shuffle",
    "set_repeat",
    "ping",
    "get_status",
];

/// Whether `action` names a recognized command
pub fn is_known_action(action: &str) -> bool {
    KNOWN_ACTIONS.contains(&action)
}

// =============================================================================
// Server -> Client
// =============================================================================

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once after accept: the assigned client id and server time
    Welcome(WelcomePayload),

    /// Reply to a `ping` command
    Pong { server_time: i64 },

    /// Reply to a `get_status` command
    Status(StatusPayload),

    /// Error reply, delivered only to the originating client
    Error(ErrorPayload),

    /// Direct reply carrying the updated state snapshot
    State(PlayerState),

    /// Typed playback event, broadcast to all clients
    Playback(PlaybackEvent),

    /// Full snapshot broadcast after every mutation
    StateChanged(PlayerState),

    /// Server-initiated liveness probe; clients answer with a `pong` frame
    Ping,
}

/// Outbound frame; every server message carries a timestamp
#[derive(Debug, Clone, Serialize)]
pub struct ServerEnvelope {
    #[serde(flatten)]
    pub message: ServerMessage,

    /// Server send time, RFC 3339
    pub timestamp: String,
}

impl ServerEnvelope {
    /// Wrap a message with the current server time
    pub fn now(message: ServerMessage) -> Self {
        Self {
            message,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Payload for the welcome message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomePayload {
    pub client_id: Uuid,
    pub server_time: DateTime<Utc>,
}

/// Payload for the status message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Currently connected clients
    pub connections: usize,

    /// Seconds since the server started
    pub uptime_secs: u64,
}

/// Payload for error replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// The command action that failed, when one could be identified
    pub command: Option<String>,

    /// Human-readable description
    pub message: String,
}

impl ErrorPayload {
    pub fn new(command: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            command: command.map(str::to_owned),
            message: message.into(),
        }
    }

    pub fn unknown_command(action: &str) -> Self {
        Self::new(Some(action), "Unknown command")
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}
