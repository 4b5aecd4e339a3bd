// Realtime store trait and the paths the dashboard reads and writes
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// `{temperature, humidity, soil, pumpStatus}`
pub const SENSOR_DATA_PATH: &str = "irrigation/data";
/// `{auto, manualPump}`
pub const CONTROL_PATH: &str = "irrigation/control";
/// Server timestamp (ms) of the device's last heartbeat
pub const LAST_SEEN_PATH: &str = "irrigation/status/lastSeen";
/// `timestamp -> soil value`
pub const SOIL_HISTORY_PATH: &str = "irrigation/history/soil";

/// Stream of full snapshots for one path.
///
/// Dropping the subscription stops the task feeding it.
pub struct Subscription {
    rx: mpsc::Receiver<Value>,
    feeder: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<Value>, feeder: JoinHandle<()>) -> Self {
        Self {
            rx,
            feeder: Some(feeder),
        }
    }

    /// A subscription fed by someone else's sender, e.g. an in-memory store.
    #[cfg(test)]
    pub fn from_receiver(rx: mpsc::Receiver<Value>) -> Self {
        Self { rx, feeder: None }
    }

    /// Next snapshot, or `None` once the source has closed.
    pub async fn next(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Subscribe to snapshots of `path`. The current value is delivered first.
    async fn subscribe(&self, path: &str) -> anyhow::Result<Subscription>;

    /// Merge `fields` into the object at `path` in a single write.
    async fn update(&self, path: &str, fields: Value) -> anyhow::Result<()>;
}
