// Telemetry domain models and realtime feed decoding
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Pump state as reported by the device. Only the literal `ON` counts as on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpStatus {
    On,
    Off,
    Other(String),
}

impl PumpStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ON" => Self::On,
            "OFF" => Self::Off,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("expected an object payload, got {0}")]
    NotAnObject(&'static str),
}

/// One decoded snapshot of `irrigation/data`.
///
/// Fields that are missing or carry the wrong JSON type decode to `None` and
/// are listed in `rejected`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorFrame {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil: Option<f64>,
    pub pump_status: Option<PumpStatus>,
    pub rejected: Vec<&'static str>,
}

impl SensorFrame {
    pub fn decode(value: &Value) -> Result<Self, FeedError> {
        let fields = object_or_empty(value)?;
        let mut rejected = Vec::new();

        let temperature = number_field(&fields, "temperature", &mut rejected);
        let humidity = number_field(&fields, "humidity", &mut rejected);
        let soil = number_field(&fields, "soil", &mut rejected);
        let pump_status = match fields.get("pumpStatus") {
            Some(Value::String(status)) => Some(PumpStatus::parse(status)),
            Some(_) => {
                rejected.push("pumpStatus");
                None
            }
            None => None,
        };

        Ok(Self {
            temperature,
            humidity,
            soil,
            pump_status,
            rejected,
        })
    }
}

/// A null snapshot (path deleted or never written) decodes like an empty object.
pub(crate) fn object_or_empty(value: &Value) -> Result<Map<String, Value>, FeedError> {
    match value {
        Value::Object(fields) => Ok(fields.clone()),
        Value::Null => Ok(Map::new()),
        other => Err(FeedError::NotAnObject(json_kind(other))),
    }
}

fn number_field(
    fields: &Map<String, Value>,
    name: &'static str,
    rejected: &mut Vec<&'static str>,
) -> Option<f64> {
    match fields.get(name) {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(_) => {
            rejected.push(name);
            None
        }
        None => None,
    }
}

/// Loose numeric coercion used for history entries: JSON numbers and
/// numeric strings are accepted, everything else is not a number.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Server timestamps arrive as plain JSON numbers (milliseconds since epoch).
pub fn decode_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        _ => None,
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
