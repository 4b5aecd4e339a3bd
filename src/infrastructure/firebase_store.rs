// Firebase Realtime Database client over the REST streaming API
use crate::application::realtime_store::{RealtimeStore, Subscription};
use crate::domain::auth::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, watch};

const SNAPSHOT_BUFFER: usize = 16;

#[derive(Debug, Clone)]
pub struct FirebaseStore {
    database_url: String,
    auth_token: Option<String>,
    user: Option<watch::Receiver<Option<User>>>,
    client: reqwest::Client,
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Splits a byte stream into server-sent events. Chunks may end anywhere,
/// including inside a multi-byte character.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block[..end])) {
                events.push(event);
            }
        }
        events
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = None;
    let mut data = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseEvent {
        event: event.unwrap_or_else(|| "message".to_string()),
        data: data.join("\n"),
    })
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StreamStep {
    Changed,
    Unchanged,
    Closed(String),
}

#[derive(Debug, Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

/// Apply one streaming event to the locally mirrored snapshot.
pub(crate) fn apply_event(tree: &mut Value, event: &SseEvent) -> Result<StreamStep> {
    match event.event.as_str() {
        "put" => {
            let put: PathData = serde_json::from_str(&event.data).context("Malformed put event")?;
            set_at(tree, &put.path, put.data);
            Ok(StreamStep::Changed)
        }
        "patch" => {
            let patch: PathData = serde_json::from_str(&event.data).context("Malformed patch event")?;
            let Value::Object(fields) = patch.data else {
                anyhow::bail!("Patch event at {} carries no object", patch.path);
            };
            let base = patch.path.trim_end_matches('/');
            for (key, value) in fields {
                set_at(tree, &format!("{}/{}", base, key), value);
            }
            Ok(StreamStep::Changed)
        }
        "keep-alive" => Ok(StreamStep::Unchanged),
        "cancel" | "auth_revoked" => Ok(StreamStep::Closed(event.event.clone())),
        other => {
            tracing::debug!("Ignoring unknown stream event {}", other);
            Ok(StreamStep::Unchanged)
        }
    }
}

/// Replace the value at a `/`-separated path; `null` deletes it.
fn set_at(tree: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        *tree = value;
        return;
    };

    let mut node = tree;
    for segment in parents {
        node = as_object(node)
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }

    let parent = as_object(node);
    if value.is_null() {
        parent.remove(*last);
    } else {
        parent.insert(last.to_string(), value);
    }
}

fn as_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

impl FirebaseStore {
    pub fn new(database_url: String, auth_token: Option<String>) -> Self {
        Self {
            database_url: database_url.trim_end_matches('/').to_string(),
            auth_token,
            user: None,
            client: reqwest::Client::new(),
        }
    }

    /// Authenticate requests as the signed-in user. The configured token is
    /// only used while nobody is signed in.
    pub fn with_user(mut self, user: watch::Receiver<Option<User>>) -> Self {
        self.user = Some(user);
        self
    }

    fn credential(&self) -> Option<String> {
        let id_token = self
            .user
            .as_ref()
            .and_then(|rx| rx.borrow().as_ref().map(|user| user.id_token.clone()));
        id_token.or_else(|| self.auth_token.clone())
    }

    fn path_url(&self, path: &str) -> String {
        let mut url = format!("{}/{}.json", self.database_url, path.trim_matches('/'));
        if let Some(token) = self.credential() {
            url.push_str("?auth=");
            url.push_str(&urlencoding::encode(&token));
        }
        url
    }
}

#[async_trait]
impl RealtimeStore for FirebaseStore {
    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        let url = self.path_url(path);

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .with_context(|| format!("Failed to open stream for {}", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Stream for {} failed with status {}: {}", path, status, body);
        }

        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let path = path.to_string();
        tracing::debug!("Subscribed to {}", path);

        let feeder = tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::default();
            let mut tree = Value::Null;

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::error!("Stream for {} failed: {}", path, e);
                        return;
                    }
                };

                for event in decoder.push(&chunk) {
                    match apply_event(&mut tree, &event) {
                        Ok(StreamStep::Changed) => {
                            if tx.send(tree.clone()).await.is_err() {
                                return;
                            }
                        }
                        Ok(StreamStep::Unchanged) => {}
                        Ok(StreamStep::Closed(reason)) => {
                            tracing::warn!("Stream for {} closed by server: {}", path, reason);
                            return;
                        }
                        Err(e) => tracing::warn!("Skipping event on {}: {:#}", path, e),
                    }
                }
            }

            tracing::info!("Stream for {} ended", path);
        });

        Ok(Subscription::new(rx, feeder))
    }

    async fn update(&self, path: &str, fields: Value) -> Result<()> {
        let url = self.path_url(path);

        let response = self
            .client
            .patch(&url)
            .json(&fields)
            .send()
            .await
            .with_context(|| format!("Failed to send update for {}", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Update of {} failed with status {}: {}", path, status, body);
        }

        tracing::debug!("Updated {}", path);
        Ok(())
    }
}
