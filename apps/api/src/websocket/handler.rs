//! WebSocket upgrade and per-connection socket loops
//!
//! Each accepted socket gets a registry entry, a send task draining its
//! outbound channel, and a receive task parsing inbound frames. Frames
//! from a single connection are processed in receipt order; across
//! connections no ordering is guaranteed.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::player::{Catalog, PlayerService};

use super::dispatch::CommandDispatcher;
use super::messages::{ClientEnvelope, ErrorPayload, ServerMessage};
use super::registry::{BroadcastOptions, ConnectionRegistry, InboundEvent, Outbound};

/// Shared state for the WebSocket endpoint
pub struct WsState<C> {
    pub registry: ConnectionRegistry,
    pub player: Arc<PlayerService<C>>,
}

impl<C> Clone for WsState<C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            player: self.player.clone(),
        }
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler<C>(ws: WebSocketUpgrade, State(state): State<WsState<C>>) -> Response
where
    C: Catalog + 'static,
{
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive an established WebSocket connection until either side closes
async fn handle_socket<C>(socket: WebSocket, state: WsState<C>)
where
    C: Catalog + 'static,
{
    let WsState { registry, player } = state;

    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    // accept() queues the welcome message ahead of anything else.
    let client_id = registry.accept(tx);

    // The connecting client starts from the current shared state.
    registry.send_to(client_id, ServerMessage::StateChanged(player.state()));

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Message(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json) => {
                        if ws_sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize message");
                    }
                },
                Outbound::Close { code, reason } => {
                    let _ = ws_sender
                        .send(Message::Close(Some(CloseFrame {
                            code,
                            reason: reason.into(),
                        })))
                        .await;
                    break;
                }
            }
        }
    });

    let dispatcher = CommandDispatcher::new(player, registry.clone(), client_id);
    let recv_registry = registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    handle_frame(&recv_registry, &dispatcher, client_id, &text).await;
                }
                Ok(Message::Pong(_)) => {
                    recv_registry.mark_alive(client_id);
                }
                Ok(Message::Ping(_)) => {
                    // axum answers protocol pings automatically
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(client_id = %client_id, "ignoring binary frame");
                }
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::debug!(client_id = %client_id, error = %e, "websocket error");
                    break;
                }
            }
        }
    });

    // Whichever task finishes first tears down the other.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.remove(client_id);
    tracing::info!(
        client_id = %client_id,
        connections = registry.connection_count(),
        "client disconnected"
    );
}

/// Parse one inbound text frame and route it
async fn handle_frame<C: Catalog>(
    registry: &ConnectionRegistry,
    dispatcher: &CommandDispatcher<C>,
    client_id: Uuid,
    text: &str,
) {
    let envelope = match serde_json::from_str::<ClientEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(client_id = %client_id, error = %e, "malformed frame");
            registry.send_to(
                client_id,
                ServerMessage::Error(ErrorPayload::malformed("Invalid JSON message")),
            );
            return;
        }
    };

    match envelope.kind.as_str() {
        "command" => dispatcher.dispatch(envelope.payload).await,
        "pong" => {
            registry.mark_alive(client_id);
        }
        other => registry.emit_inbound(InboundEvent {
            client_id,
            kind: other.to_string(),
            payload: envelope.payload,
        }),
    }
}

/// Forward player state changes to every connected client
///
/// Each change goes out twice: a typed `playback` event and the full
/// `state_changed` snapshot.
pub fn spawn_state_broadcast<C>(
    registry: ConnectionRegistry,
    player: Arc<PlayerService<C>>,
) -> JoinHandle<()>
where
    C: Catalog + 'static,
{
    let mut events = player.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(change) => {
                    registry.broadcast(
                        ServerMessage::Playback(change.event),
                        BroadcastOptions::default(),
                    );
                    registry.broadcast(
                        ServerMessage::StateChanged(change.state),
                        BroadcastOptions::default(),
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "state broadcast fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
