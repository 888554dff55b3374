//! Real-time sync configuration types

use std::time::Duration;

use crate::{parse_env, ConfigResult};

/// Heartbeat and liveness tuning for the WebSocket layer
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Seconds between heartbeat sweeps
    pub heartbeat_interval_secs: u64,

    /// Seconds of silence after which a connection is considered stale
    pub liveness_timeout_secs: u64,

    /// Consecutive missed probes before a connection is closed
    pub max_missed_heartbeats: u32,
}

impl SyncConfig {
    /// Load sync configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            heartbeat_interval_secs: parse_env("HEARTBEAT_INTERVAL", 10)?,
            liveness_timeout_secs: parse_env("LIVENESS_TIMEOUT", 30)?,
            max_missed_heartbeats: parse_env("MAX_MISSED_HEARTBEATS", 3)?,
        })
    }

    /// Heartbeat interval as a [`Duration`]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Liveness timeout as a [`Duration`]
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 10,
            liveness_timeout_secs: 30,
            max_missed_heartbeats: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.heartbeat_interval_secs, 10);
        assert_eq!(config.liveness_timeout_secs, 30);
        assert_eq!(config.max_missed_heartbeats, 3);
    }

    #[test]
    fn test_durations() {
        let config = SyncConfig::default();
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(10));
        assert_eq!(config.liveness_timeout(), Duration::from_secs(30));
    }
}
