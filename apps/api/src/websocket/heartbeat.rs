//! Periodic liveness probing for WebSocket connections
//!
//! Every interval each open connection is marked not-alive and sent a
//! JSON `ping` probe; a `pong` frame (or a protocol-level pong) marks it
//! alive again. Connections that stay silent past the configured limits
//! are closed rather than lingering in the registry.

use cantata_shared_config::SyncConfig;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::registry::ConnectionRegistry;

/// Spawn the heartbeat task for a registry
pub fn spawn_heartbeat(registry: ConnectionRegistry, config: SyncConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.heartbeat_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so fresh connections
        // get a full interval before their first probe.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let cycle = registry
                .heartbeat_cycle(config.max_missed_heartbeats, config.liveness_timeout());
            if cycle.evicted > 0 {
                tracing::info!(
                    probed = cycle.probed,
                    evicted = cycle.evicted,
                    "heartbeat sweep"
                );
            } else {
                tracing::trace!(probed = cycle.probed, "heartbeat sweep");
            }
        }
    })
}
