//! WebSocket connection registry
//!
//! Tracks every live client connection for the process, delivers
//! messages to one, many, or all of them, and carries the per-connection
//! liveness bookkeeping the heartbeat task drives. Delivery is
//! best-effort and fire-and-forget: a `true` return means the message
//! was handed to an open connection's channel, nothing more.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use super::messages::{ServerEnvelope, ServerMessage, WelcomePayload};

/// Channel capacity for inbound event fan-out
const INBOUND_CAPACITY: usize = 256;

/// Close code used when evicting unresponsive connections
pub const CLOSE_GOING_AWAY: u16 = 1001;

/// Control frames delivered to a connection's socket task
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Serialize and send as a text frame
    Message(ServerEnvelope),

    /// Send a close frame and stop the socket task
    Close { code: u16, reason: String },
}

/// Handle for one live client connection
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Channel into the connection's socket send task
    sender: mpsc::UnboundedSender<Outbound>,

    /// Cleared by each probe, set again by the liveness response
    alive: AtomicBool,

    /// Consecutive probes without a response
    missed: AtomicU32,

    /// Last liveness response (Unix timestamp ms)
    last_heartbeat: AtomicI64,

    /// When this connection was accepted (Unix timestamp ms)
    connected_at: i64,
}

impl ConnectionHandle {
    fn new(sender: mpsc::UnboundedSender<Outbound>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            sender,
            alive: AtomicBool::new(true),
            missed: AtomicU32::new(0),
            last_heartbeat: AtomicI64::new(now),
            connected_at: now,
        }
    }

    /// Queue a message for delivery; false when the socket task is gone
    pub fn send(&self, message: ServerMessage) -> bool {
        self.sender
            .send(Outbound::Message(ServerEnvelope::now(message)))
            .is_ok()
    }

    /// Queue a close frame
    pub fn close(&self, code: u16, reason: &str) -> bool {
        self.sender
            .send(Outbound::Close {
                code,
                reason: reason.to_string(),
            })
            .is_ok()
    }

    /// Record a liveness response
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
        self.missed.store(0, Ordering::Relaxed);
        self.last_heartbeat
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Clear the liveness flag ahead of a probe
    fn mark_probed(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Whether a liveness response arrived since the last probe
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Count one missed probe; returns the consecutive total
    fn record_miss(&self) -> u32 {
        self.missed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Last liveness response (Unix timestamp ms)
    pub fn last_heartbeat(&self) -> i64 {
        self.last_heartbeat.load(Ordering::Relaxed)
    }

    /// When this connection was accepted (Unix timestamp ms)
    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }

    /// Whether the socket task is still receiving
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Non-command inbound frame surfaced to external listeners
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub client_id: Uuid,
    pub kind: String,
    pub payload: Value,
}

/// Snapshot of registry counters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegistryStats {
    /// Connections accepted over the process lifetime
    pub total_connected: u64,

    /// Currently connected clients
    pub current_connections: usize,

    /// Liveness probes sent
    pub heartbeats_sent: u64,

    /// Liveness responses received
    pub heartbeats_received: u64,

    /// Probe intervals that passed without a response
    pub heartbeats_missed: u64,
}

/// Delivery filter for [`ConnectionRegistry::broadcast`]
#[derive(Debug, Clone, Default)]
pub struct BroadcastOptions {
    /// Skip this client (typically the sender)
    pub exclude_client_id: Option<Uuid>,

    /// When set, deliver only to these clients
    pub include_only_client_ids: Option<Vec<Uuid>>,
}

/// Result of one heartbeat sweep
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatCycle {
    /// Connections probed this interval
    pub probed: usize,

    /// Connections closed for unresponsiveness
    pub evicted: usize,
}

struct RegistryInner {
    connections: DashMap<Uuid, ConnectionHandle>,
    started_at: Instant,
    total_connected: AtomicU64,
    heartbeats_sent: AtomicU64,
    heartbeats_received: AtomicU64,
    heartbeats_missed: AtomicU64,
    inbound: broadcast::Sender<InboundEvent>,
}

/// Registry of live client connections
///
/// Thread-safe and cheaply cloneable; uses DashMap and atomics for
/// concurrent access without explicit locking.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);
        Self {
            inner: Arc::new(RegistryInner {
                connections: DashMap::new(),
                started_at: Instant::now(),
                total_connected: AtomicU64::new(0),
                heartbeats_sent: AtomicU64::new(0),
                heartbeats_received: AtomicU64::new(0),
                heartbeats_missed: AtomicU64::new(0),
                inbound,
            }),
        }
    }

    /// Register a new connection and send its welcome message
    ///
    /// Returns the freshly assigned client id, unique for the process
    /// lifetime.
    pub fn accept(&self, sender: mpsc::UnboundedSender<Outbound>) -> Uuid {
        let client_id = Uuid::new_v4();
        let handle = ConnectionHandle::new(sender);
        handle.send(ServerMessage::Welcome(WelcomePayload {
            client_id,
            server_time: chrono::Utc::now(),
        }));
        self.inner.connections.insert(client_id, handle);
        self.inner.total_connected.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            client_id = %client_id,
            connections = self.connection_count(),
            "client connected"
        );
        client_id
    }

    /// Drop a connection's handle (called when its socket closes)
    pub fn remove(&self, client_id: Uuid) -> bool {
        self.inner.connections.remove(&client_id).is_some()
    }

    /// Whether a client id is currently registered
    pub fn is_connected(&self, client_id: Uuid) -> bool {
        self.inner.connections.contains_key(&client_id)
    }

    /// Deliver a message to one client
    ///
    /// Returns whether delivery was attempted on an open connection;
    /// false for unknown ids or connections whose socket task is gone.
    pub fn send_to(&self, client_id: Uuid, message: ServerMessage) -> bool {
        match self.inner.connections.get(&client_id) {
            Some(handle) if handle.is_open() => handle.send(message),
            _ => false,
        }
    }

    /// Deliver a message to the filtered set of open connections
    ///
    /// Returns the number of recipients the message was handed to.
    pub fn broadcast(&self, message: ServerMessage, options: BroadcastOptions) -> usize {
        let mut sent = 0;
        for entry in self.inner.connections.iter() {
            let client_id = *entry.key();
            if options.exclude_client_id == Some(client_id) {
                continue;
            }
            if let Some(include) = &options.include_only_client_ids {
                if !include.contains(&client_id) {
                    continue;
                }
            }
            if entry.value().send(message.clone()) {
                sent += 1;
            }
        }
        sent
    }

    /// Initiate close on one connection and drop its handle
    pub fn disconnect(&self, client_id: Uuid, code: u16, reason: &str) -> bool {
        match self.inner.connections.remove(&client_id) {
            Some((_, handle)) => {
                // The queued close frame survives the sender being dropped.
                handle.close(code, reason);
                true
            }
            None => false,
        }
    }

    /// Initiate close on every connection
    pub fn disconnect_all(&self, code: u16, reason: &str) -> usize {
        let client_ids: Vec<Uuid> = self.inner.connections.iter().map(|e| *e.key()).collect();
        let mut closed = 0;
        for client_id in client_ids {
            if self.disconnect(client_id, code, reason) {
                closed += 1;
            }
        }
        closed
    }

    /// Record a liveness response from a client
    pub fn mark_alive(&self, client_id: Uuid) -> bool {
        if let Some(handle) = self.inner.connections.get(&client_id) {
            handle.mark_alive();
            self.inner.heartbeats_received.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Run one heartbeat sweep
    ///
    /// Connections that stayed silent since the previous probe accrue a
    /// miss; those at `max_missed` consecutive misses, past the
    /// staleness limit, or with a dead socket task are closed. Everyone
    /// else is marked not-alive and probed again.
    pub fn heartbeat_cycle(&self, max_missed: u32, liveness_timeout: Duration) -> HeartbeatCycle {
        let now = chrono::Utc::now().timestamp_millis();
        let timeout_ms = liveness_timeout.as_millis() as i64;
        let mut evict: Vec<Uuid> = Vec::new();
        let mut probed = 0;

        for entry in self.inner.connections.iter() {
            let client_id = *entry.key();
            let handle = entry.value();

            if !handle.is_open() {
                evict.push(client_id);
                continue;
            }
            if !handle.is_alive() {
                self.inner.heartbeats_missed.fetch_add(1, Ordering::Relaxed);
                let misses = handle.record_miss();
                let stale = now - handle.last_heartbeat() > timeout_ms;
                if misses >= max_missed || stale {
                    evict.push(client_id);
                    continue;
                }
            }
            handle.mark_probed();
            if handle.send(ServerMessage::Ping) {
                self.inner.heartbeats_sent.fetch_add(1, Ordering::Relaxed);
                probed += 1;
            }
        }

        let evicted = evict.len();
        for client_id in evict {
            tracing::info!(client_id = %client_id, "closing unresponsive connection");
            self.disconnect(client_id, CLOSE_GOING_AWAY, "heartbeat timeout");
        }

        HeartbeatCycle { probed, evicted }
    }

    /// Registry counters
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_connected: self.inner.total_connected.load(Ordering::Relaxed),
            current_connections: self.connection_count(),
            heartbeats_sent: self.inner.heartbeats_sent.load(Ordering::Relaxed),
            heartbeats_received: self.inner.heartbeats_received.load(Ordering::Relaxed),
            heartbeats_missed: self.inner.heartbeats_missed.load(Ordering::Relaxed),
        }
    }

    /// Currently connected clients
    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Time since the registry (i.e. the server) started
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Surface a non-command inbound frame to listeners
    pub fn emit_inbound(&self, event: InboundEvent) {
        // No listeners is fine.
        let _ = self.inner.inbound.send(event);
    }

    /// Subscribe to non-command inbound frames
    pub fn subscribe_inbound(&self) -> broadcast::Receiver<InboundEvent> {
        self.inner.inbound.subscribe()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(registry: &ConnectionRegistry) -> (Uuid, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client_id = registry.accept(tx);
        // Consume the welcome message so tests see only their own traffic.
        let welcome = rx.try_recv().expect("welcome message");
        assert!(matches!(
            welcome,
            Outbound::Message(ServerEnvelope {
                message: ServerMessage::Welcome(_),
                ..
            })
        ));
        (client_id, rx)
    }

    #[test]
    fn test_accept_and_remove() {
        let registry = ConnectionRegistry::new();
        let (client_id, _rx) = connect(&registry);

        assert!(registry.is_connected(client_id));
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.stats().total_connected, 1);

        assert!(registry.remove(client_id));
        assert!(!registry.is_connected(client_id));
        assert_eq!(registry.connection_count(), 0);
        // Lifetime counter is unaffected by removal.
        assert_eq!(registry.stats().total_connected, 1);
    }

    #[test]
    fn test_send_to_unknown_client() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send_to(Uuid::new_v4(), ServerMessage::Ping));
    }

    #[test]
    fn test_send_to_closed_connection() {
        let registry = ConnectionRegistry::new();
        let (client_id, rx) = connect(&registry);
        drop(rx);
        assert!(!registry.send_to(client_id, ServerMessage::Ping));
    }

    #[test]
    fn test_broadcast_reaches_all() {
        let registry = ConnectionRegistry::new();
        let (_, mut rx1) = connect(&registry);
        let (_, mut rx2) = connect(&registry);

        let sent = registry.broadcast(ServerMessage::Ping, BroadcastOptions::default());
        assert_eq!(sent, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_exclude() {
        let registry = ConnectionRegistry::new();
        let (client1, mut rx1) = connect(&registry);
        let (_, mut rx2) = connect(&registry);

        let sent = registry.broadcast(
            ServerMessage::Ping,
            BroadcastOptions {
                exclude_client_id: Some(client1),
                ..Default::default()
            },
        );
        assert_eq!(sent, 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_include_only() {
        let registry = ConnectionRegistry::new();
        let (_, mut rx1) = connect(&registry);
        let (client2, mut rx2) = connect(&registry);

        let sent = registry.broadcast(
            ServerMessage::Ping,
            BroadcastOptions {
                include_only_client_ids: Some(vec![client2]),
                ..Default::default()
            },
        );
        assert_eq!(sent, 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_disconnect_queues_close_frame() {
        let registry = ConnectionRegistry::new();
        let (client_id, mut rx) = connect(&registry);

        assert!(registry.disconnect(client_id, CLOSE_GOING_AWAY, "bye"));
        assert!(!registry.is_connected(client_id));
        assert!(matches!(
            rx.try_recv(),
            Ok(Outbound::Close { code: CLOSE_GOING_AWAY, .. })
        ));
    }

    #[test]
    fn test_disconnect_all() {
        let registry = ConnectionRegistry::new();
        let (_, _rx1) = connect(&registry);
        let (_, _rx2) = connect(&registry);

        assert_eq!(registry.disconnect_all(CLOSE_GOING_AWAY, "shutdown"), 2);
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_heartbeat_probe_and_response() {
        let registry = ConnectionRegistry::new();
        let (client_id, mut rx) = connect(&registry);

        let cycle = registry.heartbeat_cycle(3, Duration::from_secs(30));
        assert_eq!(cycle.probed, 1);
        assert_eq!(cycle.evicted, 0);
        assert!(matches!(
            rx.try_recv(),
            Ok(Outbound::Message(ServerEnvelope {
                message: ServerMessage::Ping,
                ..
            }))
        ));

        assert!(registry.mark_alive(client_id));
        let stats = registry.stats();
        assert_eq!(stats.heartbeats_sent, 1);
        assert_eq!(stats.heartbeats_received, 1);
        assert_eq!(stats.heartbeats_missed, 0);
    }

    #[test]
    fn test_heartbeat_evicts_after_max_missed() {
        let registry = ConnectionRegistry::new();
        let (client_id, mut rx) = connect(&registry);

        // First sweep probes; the client never answers.
        registry.heartbeat_cycle(2, Duration::from_secs(3600));
        assert_eq!(registry.heartbeat_cycle(2, Duration::from_secs(3600)).evicted, 0);
        let cycle = registry.heartbeat_cycle(2, Duration::from_secs(3600));
        assert_eq!(cycle.evicted, 1);
        assert!(!registry.is_connected(client_id));

        // Drain pings, then expect the close frame.
        let mut saw_close = false;
        while let Ok(outbound) = rx.try_recv() {
            if matches!(outbound, Outbound::Close { .. }) {
                saw_close = true;
            }
        }
        assert!(saw_close);
        assert_eq!(registry.stats().heartbeats_missed, 2);
    }

    #[test]
    fn test_heartbeat_spares_responsive_connections() {
        let registry = ConnectionRegistry::new();
        let (client_id, _rx) = connect(&registry);

        for _ in 0..5 {
            registry.heartbeat_cycle(2, Duration::from_secs(3600));
            registry.mark_alive(client_id);
        }
        assert!(registry.is_connected(client_id));
        assert_eq!(registry.stats().heartbeats_missed, 0);
    }

    #[tokio::test]
    async fn test_inbound_event_fanout() {
        let registry = ConnectionRegistry::new();
        let mut listener = registry.subscribe_inbound();
        let (client_id, _rx) = connect(&registry);

        registry.emit_inbound(InboundEvent {
            client_id,
            kind: "telemetry".to_string(),
            payload: serde_json::json!({"fps": 60}),
        });

        let event = listener.recv().await.unwrap();
        assert_eq!(event.client_id, client_id);
        assert_eq!(event.kind, "telemetry");
    }
}
