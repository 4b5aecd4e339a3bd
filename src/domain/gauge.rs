// Half-dial gauges for the live sensor readings
use super::geometry::Domain;
use serde::Serialize;

const COLOR_OK: &str = "#22c55e";
const COLOR_DRY: &str = "#f97316";
const COLOR_WET: &str = "#0ea5e9";

const DRY_BELOW: f64 = 30.0;
const WET_ABOVE: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    SoilMoisture,
    SoilTemperature,
    Humidity,
}

impl SensorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::SoilMoisture => "Soil Moisture",
            Self::SoilTemperature => "Soil Temperature",
            Self::Humidity => "Surrounding Humidity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::SoilMoisture => "",
            Self::SoilTemperature => "°C",
            Self::Humidity => "%",
        }
    }

    fn hint(self, value: f64) -> &'static str {
        match self {
            Self::SoilMoisture if value < DRY_BELOW => "Soil is dry - pump may turn ON in auto mode.",
            Self::SoilMoisture if value > WET_ABOVE => "Soil is very wet - consider stopping pump.",
            Self::SoilMoisture => "Soil moisture is in optimal range.",
            Self::SoilTemperature => "Monitor soil temperature for crop health.",
            Self::Humidity => "Ambient humidity around your field.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub label: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
    pub percent: f64,
    /// Needle rotation in degrees, -90 (left) to 90 (right).
    pub angle: f64,
    pub display: String,
    pub hint: &'static str,
    pub color: &'static str,
}

impl Gauge {
    pub fn new(kind: SensorKind, value: Option<f64>) -> Self {
        let domain = Domain::PERCENT;
        let percent = value.map(|v| domain.normalize(v)).unwrap_or(0.0);
        let unit = kind.unit();

        let display = match value {
            None => "--".to_string(),
            Some(v) if unit == "%" => format!("{v:.0}"),
            Some(v) => format!("{v:.1}"),
        };

        let color = match kind {
            SensorKind::SoilMoisture => moisture_color(value),
            _ => COLOR_OK,
        };

        Self {
            label: kind.label(),
            unit,
            value,
            percent,
            angle: -90.0 + 180.0 * percent,
            display,
            hint: value.map_or("Waiting for sensor data...", |v| kind.hint(v)),
            color,
        }
    }
}

pub fn moisture_color(value: Option<f64>) -> &'static str {
    match value {
        Some(v) if v < DRY_BELOW => COLOR_DRY,
        Some(v) if v > WET_ABOVE => COLOR_WET,
        _ => COLOR_OK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reading() {
        let gauge = Gauge::new(SensorKind::SoilTemperature, None);
        assert_eq!(gauge.display, "--");
        assert_eq!(gauge.percent, 0.0);
        assert_eq!(gauge.angle, -90.0);
        assert_eq!(gauge.hint, "Waiting for sensor data...");
    }

    #[test]
    fn test_needle_angle() {
        assert_eq!(Gauge::new(SensorKind::Humidity, Some(50.0)).angle, 0.0);
        assert_eq!(Gauge::new(SensorKind::Humidity, Some(250.0)).angle, 90.0);
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(Gauge::new(SensorKind::Humidity, Some(61.6)).display, "62");
        assert_eq!(Gauge::new(SensorKind::SoilTemperature, Some(24.26)).display, "24.3");
        assert_eq!(Gauge::new(SensorKind::SoilMoisture, Some(40.0)).display, "40.0");
    }

    #[test]
    fn test_moisture_bands() {
        let dry = Gauge::new(SensorKind::SoilMoisture, Some(12.0));
        assert_eq!(dry.color, COLOR_DRY);
        assert!(dry.hint.starts_with("Soil is dry"));

        let wet = Gauge::new(SensorKind::SoilMoisture, Some(91.0));
        assert_eq!(wet.color, COLOR_WET);
        assert!(wet.hint.starts_with("Soil is very wet"));

        let ok = Gauge::new(SensorKind::SoilMoisture, Some(55.0));
        assert_eq!(ok.color, COLOR_OK);
        assert_eq!(moisture_color(None), COLOR_OK);
    }
}
