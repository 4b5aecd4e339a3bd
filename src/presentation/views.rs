// JSON views of the dashboard snapshot
use crate::domain::control::ControlState;
use crate::domain::dashboard::DashboardState;
use crate::domain::forecast::ForecastDay;
use crate::domain::gauge::{moisture_color, Gauge};
use crate::domain::liveness::Liveness;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub online: bool,
    pub liveness: Liveness,
    pub last_seen_ms: Option<i64>,
    pub readings: ReadingsView,
    pub gauges: Vec<Gauge>,
    pub pump_status: String,
    pub pump_on: bool,
    pub control: ControlState,
    pub status_text: Option<String>,
    pub soil_history: HistoryView,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingsView {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub latest: Option<f64>,
    pub color: &'static str,
}

impl From<&DashboardState> for DashboardView {
    fn from(state: &DashboardState) -> Self {
        let history = &state.soil_history;
        let latest = history.latest();

        Self {
            online: state.is_online(),
            liveness: state.liveness.state(),
            last_seen_ms: state.liveness.last_seen_ms(),
            readings: ReadingsView {
                temperature: state.temperature,
                humidity: state.humidity,
                soil: state.soil,
            },
            gauges: state.gauges().to_vec(),
            pump_status: state
                .pump_status
                .as_ref()
                .map_or_else(|| "--".to_string(), ToString::to_string),
            pump_on: state.pump_on(),
            control: state.control,
            status_text: state.status_text.clone(),
            soil_history: HistoryView {
                labels: history.labels(),
                values: history.values(),
                latest,
                color: moisture_color(latest),
            },
            forecast: state.forecast.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::HistorySeries;
    use crate::domain::telemetry::{PumpStatus, Sample, SensorFrame};
    use serde_json::{json, Value};

    #[test]
    fn test_initial_view() {
        let view = DashboardView::from(&DashboardState::default());

        assert!(!view.online);
        assert_eq!(view.liveness, Liveness::Unknown);
        assert_eq!(view.pump_status, "--");
        assert_eq!(view.control, ControlState::new(true, false));
        assert!(view.soil_history.values.is_empty());
        assert_eq!(view.gauges.len(), 3);
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let now = 1_700_000_000_000;
        let mut history = HistorySeries::new();
        history.append(Sample::new(now, 42.0));
        let state = DashboardState::default()
            .with_last_seen(Some(now), now)
            .with_sensor_frame(&SensorFrame {
                temperature: Some(23.5),
                humidity: None,
                soil: Some(42.0),
                pump_status: Some(PumpStatus::On),
                rejected: Vec::new(),
            })
            .with_soil_history(history);

        let value = serde_json::to_value(DashboardView::from(&state)).unwrap();

        assert_eq!(value["online"], json!(true));
        assert_eq!(value["liveness"], json!("ONLINE"));
        assert_eq!(value["lastSeenMs"], json!(now));
        assert_eq!(value["pumpOn"], json!(true));
        assert_eq!(value["pumpStatus"], json!("ON"));
        assert_eq!(value["control"], json!({"auto": true, "manualPump": false}));
        assert_eq!(value["readings"]["humidity"], Value::Null);
        assert_eq!(value["soilHistory"]["latest"], json!(42.0));
    }
}
