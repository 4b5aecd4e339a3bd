// Device liveness derived from the server-stamped last-seen heartbeat
use serde::Serialize;
use std::time::Duration;

/// A device is offline once its heartbeat is older than this.
pub const OFFLINE_AFTER_MS: i64 = 5_000;

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Liveness {
    #[default]
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LivenessMonitor {
    last_seen_ms: Option<i64>,
    state: Liveness,
}

impl LivenessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Liveness {
        self.state
    }

    pub fn last_seen_ms(&self) -> Option<i64> {
        self.last_seen_ms
    }

    pub fn is_online(&self) -> bool {
        self.state == Liveness::Online
    }

    /// Record a heartbeat from the store.
    ///
    /// The first heartbeat is evaluated right away; later ones only move the
    /// anchor and are picked up by the next [`tick`](Self::tick). A missing
    /// heartbeat resets the monitor to `Unknown`.
    pub fn observe(self, last_seen_ms: Option<i64>, now_ms: i64) -> Self {
        match last_seen_ms {
            None => Self::default(),
            Some(seen) => {
                let state = match self.state {
                    Liveness::Unknown => classify(seen, now_ms),
                    known => known,
                };
                Self {
                    last_seen_ms: Some(seen),
                    state,
                }
            }
        }
    }

    /// Re-evaluate against the polling clock. No-op while nothing was seen.
    pub fn tick(self, now_ms: i64) -> Self {
        match self.last_seen_ms {
            Some(seen) => Self {
                last_seen_ms: Some(seen),
                state: classify(seen, now_ms),
            },
            None => self,
        }
    }
}

fn classify(last_seen_ms: i64, now_ms: i64) -> Liveness {
    if now_ms.saturating_sub(last_seen_ms) > OFFLINE_AFTER_MS {
        Liveness::Offline
    } else {
        Liveness::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn test_starts_unknown() {
        let monitor = LivenessMonitor::new();
        assert_eq!(monitor.state(), Liveness::Unknown);
        assert!(!monitor.is_online());
        assert_eq!(monitor.tick(T), monitor);
    }

    #[test]
    fn test_threshold() {
        let monitor = LivenessMonitor::new().observe(Some(T), T);
        assert_eq!(monitor.tick(T + 4_999).state(), Liveness::Online);
        assert_eq!(monitor.tick(T + 5_000).state(), Liveness::Online);
        assert_eq!(monitor.tick(T + 5_001).state(), Liveness::Offline);
    }

    #[test]
    fn test_first_observation_evaluates_immediately() {
        let stale = LivenessMonitor::new().observe(Some(T), T + 60_000);
        assert_eq!(stale.state(), Liveness::Offline);

        let fresh = LivenessMonitor::new().observe(Some(T), T + 100);
        assert_eq!(fresh.state(), Liveness::Online);
    }

    #[test]
    fn test_recovery_waits_for_tick() {
        let offline = LivenessMonitor::new()
            .observe(Some(T), T)
            .tick(T + 10_000);
        assert_eq!(offline.state(), Liveness::Offline);

        let refreshed = offline.observe(Some(T + 9_800), T + 10_000);
        assert_eq!(refreshed.state(), Liveness::Offline);
        assert_eq!(refreshed.last_seen_ms(), Some(T + 9_800));

        assert_eq!(refreshed.tick(T + 11_000).state(), Liveness::Online);
    }

    #[test]
    fn test_missing_heartbeat_resets() {
        let monitor = LivenessMonitor::new().observe(Some(T), T).observe(None, T);
        assert_eq!(monitor.state(), Liveness::Unknown);
        assert_eq!(monitor.last_seen_ms(), None);
    }

    #[test]
    fn test_server_ahead_of_client_is_online() {
        let monitor = LivenessMonitor::new().observe(Some(T + 2_000), T);
        assert_eq!(monitor.state(), Liveness::Online);
    }
}
