// Dashboard view state: one immutable snapshot, one transition per event
use super::control::ControlState;
use super::forecast::ForecastDay;
use super::gauge::{Gauge, SensorKind};
use super::history::HistorySeries;
use super::liveness::{Liveness, LivenessMonitor};
use super::telemetry::{PumpStatus, SensorFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil: Option<f64>,
    /// `None` until the device reports one.
    pub pump_status: Option<PumpStatus>,
    pub control: ControlState,
    pub liveness: LivenessMonitor,
    pub soil_history: HistorySeries,
    pub forecast: Vec<ForecastDay>,
    pub status_text: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            temperature: None,
            humidity: None,
            soil: None,
            pump_status: None,
            control: ControlState::default(),
            liveness: LivenessMonitor::new(),
            soil_history: HistorySeries::new(),
            forecast: Vec::new(),
            status_text: None,
        }
    }
}

impl DashboardState {
    /// Readings are replaced wholesale; the pump status is only replaced when
    /// the frame carries one.
    pub fn with_sensor_frame(&self, frame: &SensorFrame) -> Self {
        let next = Self {
            temperature: frame.temperature,
            humidity: frame.humidity,
            soil: frame.soil,
            pump_status: frame.pump_status.clone().or_else(|| self.pump_status.clone()),
            ..self.clone()
        };
        next.blank_if_offline()
    }

    pub fn with_control(&self, control: ControlState) -> Self {
        Self {
            control,
            ..self.clone()
        }
    }

    /// A control change made from this dashboard, with its status line.
    pub fn with_control_written(&self, control: ControlState) -> Self {
        Self {
            control,
            status_text: Some(control.to_string()),
            ..self.clone()
        }
    }

    pub fn with_last_seen(&self, last_seen_ms: Option<i64>, now_ms: i64) -> Self {
        Self {
            liveness: self.liveness.observe(last_seen_ms, now_ms),
            ..self.clone()
        }
        .blank_if_offline()
    }

    pub fn with_tick(&self, now_ms: i64) -> Self {
        Self {
            liveness: self.liveness.tick(now_ms),
            ..self.clone()
        }
        .blank_if_offline()
    }

    pub fn with_soil_history(&self, soil_history: HistorySeries) -> Self {
        Self {
            soil_history,
            ..self.clone()
        }
    }

    pub fn with_forecast(&self, forecast: Vec<ForecastDay>) -> Self {
        Self {
            forecast,
            ..self.clone()
        }
    }

    pub fn is_online(&self) -> bool {
        self.liveness.is_online()
    }

    pub fn pump_on(&self) -> bool {
        self.pump_status.as_ref().is_some_and(PumpStatus::is_on)
    }

    pub fn gauges(&self) -> [Gauge; 3] {
        [
            Gauge::new(SensorKind::SoilMoisture, self.soil),
            Gauge::new(SensorKind::SoilTemperature, self.temperature),
            Gauge::new(SensorKind::Humidity, self.humidity),
        ]
    }

    /// An offline device never shows its last readings as current.
    fn blank_if_offline(self) -> Self {
        if self.liveness.state() != Liveness::Offline {
            return self;
        }
        Self {
            temperature: None,
            humidity: None,
            soil: None,
            pump_status: Some(PumpStatus::Off),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::synthetic_forecast;
    use crate::domain::telemetry::Sample;
    use chrono::NaiveDate;

    const T: i64 = 1_700_000_000_000;

    fn frame(soil: f64, pump: Option<&str>) -> SensorFrame {
        SensorFrame {
            temperature: Some(24.0),
            humidity: Some(60.0),
            soil: Some(soil),
            pump_status: pump.map(PumpStatus::parse),
            rejected: Vec::new(),
        }
    }

    fn online() -> DashboardState {
        DashboardState::default().with_last_seen(Some(T), T)
    }

    #[test]
    fn test_sensor_frame_applied() {
        let state = online().with_sensor_frame(&frame(45.0, Some("ON")));
        assert_eq!(state.soil, Some(45.0));
        assert!(state.pump_on());
    }

    #[test]
    fn test_missing_pump_status_keeps_previous() {
        let state = online()
            .with_sensor_frame(&frame(45.0, Some("ON")))
            .with_sensor_frame(&frame(46.0, None));
        assert_eq!(state.pump_status, Some(PumpStatus::On));
        assert_eq!(state.soil, Some(46.0));
    }

    #[test]
    fn test_going_offline_blanks_readings() {
        let state = online()
            .with_sensor_frame(&frame(45.0, Some("ON")))
            .with_tick(T + 5_001);

        assert!(!state.is_online());
        assert_eq!(state.liveness.state(), Liveness::Offline);
        assert_eq!((state.temperature, state.humidity, state.soil), (None, None, None));
        assert_eq!(state.pump_status, Some(PumpStatus::Off));
        assert!(state.gauges().iter().all(|g| g.display == "--"));
    }

    #[test]
    fn test_frames_while_offline_stay_blank() {
        let state = online()
            .with_tick(T + 10_000)
            .with_sensor_frame(&frame(45.0, Some("ON")));

        assert_eq!(state.soil, None);
        assert!(!state.pump_on());
    }

    #[test]
    fn test_recovers_after_fresh_heartbeat() {
        let state = online()
            .with_tick(T + 10_000)
            .with_last_seen(Some(T + 9_500), T + 10_000)
            .with_tick(T + 10_400)
            .with_sensor_frame(&frame(50.0, Some("OFF")));

        assert!(state.is_online());
        assert_eq!(state.soil, Some(50.0));
    }

    #[test]
    fn test_control_written_sets_status() {
        let state = DashboardState::default().with_control_written(ControlState::new(false, true));
        assert_eq!(state.status_text.as_deref(), Some("Auto = OFF, Manual Pump = ON"));

        let remote = state.with_control(ControlState::new(true, false));
        assert_eq!(remote.control, ControlState::new(true, false));
        assert_eq!(remote.status_text, state.status_text);
    }

    #[test]
    fn test_history_and_forecast_are_independent() {
        let mut history = HistorySeries::new();
        history.append(Sample::new(T, 41.0));
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let state = online()
            .with_soil_history(history.clone())
            .with_forecast(synthetic_forecast(today))
            .with_tick(T + 60_000);

        assert_eq!(state.soil_history, history);
        assert_eq!(state.forecast.len(), 5);
    }
}
