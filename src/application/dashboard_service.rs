// Dashboard service - Keeps the dashboard snapshot in sync with the realtime store
use crate::application::forecast_service::ForecastService;
use crate::application::realtime_store::{
    RealtimeStore, Subscription, CONTROL_PATH, LAST_SEEN_PATH, SENSOR_DATA_PATH, SOIL_HISTORY_PATH,
};
use crate::domain::auth::User;
use crate::domain::control::ControlState;
use crate::domain::dashboard::DashboardState;
use crate::domain::history::HistorySeries;
use crate::domain::liveness::POLL_INTERVAL;
use crate::domain::telemetry::{decode_timestamp, SensorFrame};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Wall-clock milliseconds used for liveness polling.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn RealtimeStore>,
    forecast: ForecastService,
    state: Arc<watch::Sender<DashboardState>>,
    clock: Clock,
    retry_delay: Duration,
}

/// Live subscriptions, the liveness ticker and the forecast load for one
/// signed-in session. Dropping it stops all of them.
pub struct DashboardSession {
    tasks: Vec<JoinHandle<()>>,
}

impl DashboardSession {
    /// Abort every task and wait until none of them can touch the snapshot.
    async fn stop(mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            let _ = task.await;
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl DashboardService {
    pub fn new(store: Arc<dyn RealtimeStore>, forecast: ForecastService) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            store,
            forecast,
            state: Arc::new(state),
            clock: Arc::new(|| Utc::now().timestamp_millis()),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// First delay before resubscribing or restarting; doubles up to
    /// [`MAX_RETRY_DELAY`] while failures continue.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub async fn start(&self) -> anyhow::Result<DashboardSession> {
        let mut session = DashboardSession { tasks: Vec::new() };

        let data = self.store.subscribe(SENSOR_DATA_PATH).await?;
        session.tasks.push(self.follow(data, SENSOR_DATA_PATH, |state, value, _| {
            match SensorFrame::decode(value) {
                Ok(frame) => {
                    if !frame.rejected.is_empty() {
                        tracing::debug!("Ignoring malformed sensor fields: {:?}", frame.rejected);
                    }
                    state.with_sensor_frame(&frame)
                }
                Err(e) => {
                    tracing::warn!("Malformed sensor payload: {}", e);
                    state.with_sensor_frame(&SensorFrame::default())
                }
            }
        }));

        let control = self.store.subscribe(CONTROL_PATH).await?;
        session.tasks.push(self.follow(control, CONTROL_PATH, |state, value, _| {
            match ControlState::decode(value) {
                Ok(control) => state.with_control(control),
                Err(e) => {
                    tracing::warn!("Malformed control payload: {}", e);
                    state.with_control(ControlState::new(false, false))
                }
            }
        }));

        let last_seen = self.store.subscribe(LAST_SEEN_PATH).await?;
        session.tasks.push(self.follow(last_seen, LAST_SEEN_PATH, |state, value, now_ms| {
            state.with_last_seen(decode_timestamp(value), now_ms)
        }));

        let history = self.store.subscribe(SOIL_HISTORY_PATH).await?;
        session.tasks.push(self.follow(history, SOIL_HISTORY_PATH, |state, value, _| {
            match HistorySeries::from_snapshot(value) {
                Ok(history) => state.with_soil_history(history),
                Err(e) => {
                    tracing::warn!("Malformed soil history payload: {}", e);
                    state.with_soil_history(HistorySeries::new())
                }
            }
        }));

        session.tasks.push(self.spawn_liveness_ticker());
        session.tasks.push(self.spawn_forecast_load());

        tracing::info!("Dashboard session started");
        Ok(session)
    }

    /// Start a session whenever a user signs in and stop it on sign-out.
    /// A session that fails to start is retried while the user stays signed in.
    pub async fn supervise(self, mut users: watch::Receiver<Option<User>>) {
        let mut session: Option<DashboardSession> = None;
        let mut retry_delay = self.retry_delay;

        loop {
            let signed_in = users.borrow_and_update().is_some();
            match (signed_in, session.is_some()) {
                (true, false) => match self.start().await {
                    Ok(started) => {
                        session = Some(started);
                        retry_delay = self.retry_delay;
                    }
                    Err(e) => tracing::error!(
                        "Failed to start dashboard session, retrying in {:?}: {:#}",
                        retry_delay,
                        e
                    ),
                },
                (false, true) => {
                    if let Some(stopped) = session.take() {
                        stopped.stop().await;
                    }
                    self.state.send_replace(DashboardState::default());
                    tracing::info!("Dashboard session stopped");
                }
                _ => {}
            }

            let waiting = signed_in && session.is_none();
            tokio::select! {
                changed = users.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(retry_delay), if waiting => {
                    retry_delay = next_retry_delay(retry_delay);
                }
            }
        }
    }

    pub fn toggle_auto(&self) -> ControlState {
        let mut control = ControlState::default();
        self.state.send_modify(|state| {
            control = state.control.toggle_auto();
            *state = state.with_control_written(control);
        });
        self.write_control(control);
        control
    }

    /// `None` when rejected because auto mode is on; nothing is written then.
    pub fn toggle_manual(&self) -> Option<ControlState> {
        let mut accepted = None;
        self.state.send_if_modified(|state| match state.control.toggle_manual() {
            Some(control) => {
                *state = state.with_control_written(control);
                accepted = Some(control);
                true
            }
            None => false,
        });

        match accepted {
            Some(control) => self.write_control(control),
            None => tracing::debug!("Manual pump toggle ignored while auto mode is on"),
        }
        accepted
    }

    /// Fire-and-forget write of the whole control pair.
    fn write_control(&self, control: ControlState) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.update(CONTROL_PATH, control.to_update()).await {
                tracing::error!("Failed to write control state: {:#}", e);
            }
        });
    }

    /// Apply every snapshot of `path`, resubscribing with backoff whenever
    /// the stream ends.
    fn follow<F>(&self, first: Subscription, path: &'static str, apply: F) -> JoinHandle<()>
    where
        F: Fn(&DashboardState, &Value, i64) -> DashboardState + Send + 'static,
    {
        let store = self.store.clone();
        let state = self.state.clone();
        let clock = self.clock.clone();
        let initial_delay = self.retry_delay;

        tokio::spawn(async move {
            let mut subscription = Some(first);
            let mut delay = initial_delay;

            loop {
                if let Some(mut active) = subscription.take() {
                    while let Some(value) = active.next().await {
                        delay = initial_delay;
                        let now_ms = clock();
                        state.send_modify(|current| *current = apply(current, &value, now_ms));
                    }
                    tracing::warn!("Subscription to {} closed, resubscribing in {:?}", path, delay);
                }

                tokio::time::sleep(delay).await;
                delay = next_retry_delay(delay);

                match store.subscribe(path).await {
                    Ok(resumed) => subscription = Some(resumed),
                    Err(e) => tracing::error!("Failed to resubscribe to {}: {:#}", path, e),
                }
            }
        })
    }

    fn spawn_liveness_ticker(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let clock = self.clock.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                let now_ms = clock();
                // Only wake watchers when something actually changed.
                state.send_if_modified(|current| {
                    let next = current.with_tick(now_ms);
                    if next == *current {
                        return false;
                    }
                    if next.is_online() != current.is_online() {
                        tracing::info!("Device liveness changed to {:?}", next.liveness.state());
                    }
                    *current = next;
                    true
                });
            }
        })
    }

    fn spawn_forecast_load(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let forecast = self.forecast.clone();
        let today = local_date((self.clock)());

        tokio::spawn(async move {
            let days = forecast.load(today).await;
            state.send_modify(|current| *current = current.with_forecast(days));
        })
    }
}

fn next_retry_delay(delay: Duration) -> Duration {
    (delay * 2).min(MAX_RETRY_DELAY)
}

fn local_date(now_ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(now_ms)
        .map(|utc| utc.with_timezone(&Local).date_naive())
        .unwrap_or_else(|| Local::now().date_naive())
}
