//! Command dispatch for WebSocket clients
//!
//! One dispatcher exists per connection. It parses the payload of a
//! `command` frame into the closed [`Command`] enum and executes it
//! against the shared player. Every failure — unknown action, malformed
//! payload, typed playback error — becomes exactly one `error` reply to
//! the originating client; nothing propagates to other clients and
//! nothing terminates the registry.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::player::{Catalog, PlaybackError, PlayerService, RepeatMode};

use super::messages::{is_known_action, Command, ErrorPayload, ServerMessage, StatusPayload};
use super::registry::ConnectionRegistry;

/// Routes commands from one client to the shared player
pub struct CommandDispatcher<C> {
    player: Arc<PlayerService<C>>,
    registry: ConnectionRegistry,
    client_id: Uuid,
}

impl<C: Catalog> CommandDispatcher<C> {
    /// Create a dispatcher bound to one client connection
    pub fn new(
        player: Arc<PlayerService<C>>,
        registry: ConnectionRegistry,
        client_id: Uuid,
    ) -> Self {
        Self {
            player,
            registry,
            client_id,
        }
    }

    /// Parse and execute one command payload
    pub async fn dispatch(&self, payload: Value) {
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let command = match serde_json::from_value::<Command>(payload) {
            Ok(command) => command,
            Err(e) => {
                let reply = match action.as_deref() {
                    None => ErrorPayload::malformed("Missing command action"),
                    Some(action) if !is_known_action(action) => {
                        ErrorPayload::unknown_command(action)
                    }
                    Some(action) => {
                        ErrorPayload::new(Some(action), format!("Invalid payload: {}", e))
                    }
                };
                tracing::debug!(
                    client_id = %self.client_id,
                    "rejected command: {}",
                    reply.message
                );
                self.reply(ServerMessage::Error(reply));
                return;
            }
        };

        let action = command.action();
        if let Err(e) = self.execute(command).await {
            tracing::debug!(
                client_id = %self.client_id,
                command = action,
                error = %e,
                "command failed"
            );
            self.reply(ServerMessage::Error(ErrorPayload::new(
                Some(action),
                e.to_string(),
            )));
        }
    }

    async fn execute(&self, command: Command) -> Result<(), PlaybackError> {
        let reply = match command {
            Command::Ping => ServerMessage::Pong {
                server_time: chrono::Utc::now().timestamp_millis(),
            },
            Command::GetStatus => ServerMessage::Status(StatusPayload {
                connections: self.registry.connection_count(),
                uptime_secs: self.registry.uptime().as_secs(),
            }),
            Command::GetState => ServerMessage::State(self.player.state()),
            Command::Play { track_id } => {
                let track_id = parse_track_id(&track_id)?;
                ServerMessage::State(self.player.start(track_id).await?)
            }
            Command::Pause => ServerMessage::State(self.player.pause()),
            Command::Resume => ServerMessage::State(self.player.resume()),
            Command::Stop => ServerMessage::State(self.player.stop()),
            Command::Next => ServerMessage::State(self.player.play_next()?),
            Command::Previous => ServerMessage::State(self.player.play_previous()?),
            Command::Seek { position } => ServerMessage::State(self.player.seek_to(position)?),
            Command::SetVolume { volume } => ServerMessage::State(self.player.set_volume(volume)),
            Command::AddToQueue { track_id, index } => {
                let track_id = parse_track_id(&track_id)?;
                ServerMessage::State(self.player.add_to_queue(track_id, index).await?)
            }
            Command::RemoveFromQueue { index } => {
                ServerMessage::State(self.player.remove_from_queue(index)?)
            }
            Command::ClearQueue => ServerMessage::State(self.player.clear_queue()),
            Command::ToggleShuffle => ServerMessage::State(self.player.toggle_shuffle()),
            Command::SetRepeat { mode } => {
                let mode = mode.parse::<RepeatMode>().map_err(|_| {
                    PlaybackError::InvalidArgument(format!("unknown repeat mode: {}", mode))
                })?;
                ServerMessage::State(self.player.set_repeat(mode))
            }
        };
        self.reply(reply);
        Ok(())
    }

    fn reply(&self, message: ServerMessage) {
        self.registry.send_to(self.client_id, message);
    }
}

/// Track ids arrive as strings on the wire; empty and malformed ids are
/// rejected before the catalog is consulted
pub fn parse_track_id(raw: &str) -> Result<Uuid, PlaybackError> {
    if raw.is_empty() {
        return Err(PlaybackError::InvalidArgument(
            "track id must not be empty".to_string(),
        ));
    }
    raw.parse()
        .map_err(|_| PlaybackError::InvalidArgument(format!("invalid track id: {}", raw)))
}
