// Soil moisture history: the most recent samples, oldest first
use super::telemetry::{coerce_number, object_or_empty, FeedError, Sample};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;

pub const HISTORY_CAPACITY: usize = 15;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySeries {
    samples: VecDeque<Sample>,
}

impl HistorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the tail, evicting from the head once over capacity.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    /// Rebuild from an authoritative `timestamp -> value` snapshot.
    ///
    /// Entries with a non-numeric key or value are dropped. The remaining
    /// entries are ordered by timestamp and only the newest
    /// [`HISTORY_CAPACITY`] are kept.
    pub fn from_snapshot(value: &Value) -> Result<Self, FeedError> {
        let entries = object_or_empty(value)?;

        let mut samples: Vec<Sample> = entries
            .iter()
            .filter_map(|(key, value)| {
                let time_ms = parse_timestamp_key(key)?;
                let value = coerce_number(value)?;
                Some(Sample::new(time_ms, value))
            })
            .collect();
        samples.sort_by_key(|s| s.time_ms);

        let mut series = Self::new();
        for sample in samples {
            series.append(sample);
        }
        Ok(series)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().map(|s| s.value)
    }

    /// Time-of-day labels (`HH:MM`) in the server's local zone.
    pub fn labels(&self) -> Vec<String> {
        self.labels_in(&Local)
    }

    pub fn labels_in<Tz>(&self, tz: &Tz) -> Vec<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.samples
            .iter()
            .map(|s| match DateTime::from_timestamp_millis(s.time_ms) {
                Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
                None => "--:--".to_string(),
            })
            .collect()
    }
}

fn parse_timestamp_key(key: &str) -> Option<i64> {
    key.parse::<i64>().ok().or_else(|| {
        key.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_append_keeps_most_recent() {
        let mut history = HistorySeries::new();
        for i in 0..40 {
            history.append(Sample::new(i, i as f64));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        let times: Vec<i64> = history.iter().map(|s| s.time_ms).collect();
        assert_eq!(times, (25..40).collect::<Vec<_>>());
        assert_eq!(history.latest(), Some(39.0));
    }

    #[test]
    fn test_append_under_capacity() {
        let mut history = HistorySeries::new();
        history.append(Sample::new(10, 1.0));
        history.append(Sample::new(20, 2.0));

        assert_eq!(history.values(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_snapshot_sorted_by_timestamp() {
        // Lexical key order would put 900 last.
        let history = HistorySeries::from_snapshot(&json!({
            "1000": 40,
            "900": 35,
            "10000": 50
        }))
        .unwrap();

        let times: Vec<i64> = history.iter().map(|s| s.time_ms).collect();
        assert_eq!(times, vec![900, 1000, 10000]);
        assert_eq!(history.values(), vec![35.0, 40.0, 50.0]);
    }

    #[test]
    fn test_snapshot_truncates_to_newest() {
        let mut entries = serde_json::Map::new();
        for i in 0..20 {
            entries.insert((1_000 + i * 60_000).to_string(), json!(i));
        }

        let history = HistorySeries::from_snapshot(&Value::Object(entries)).unwrap();

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.values().first(), Some(&5.0));
        assert_eq!(history.latest(), Some(19.0));
    }

    #[test]
    fn test_snapshot_drops_non_numeric() {
        let history = HistorySeries::from_snapshot(&json!({
            "1000": 40,
            "2000": "41.5",
            "3000": "dry",
            "4000": null,
            "later": 44
        }))
        .unwrap();

        assert_eq!(history.values(), vec![40.0, 41.5]);
    }

    #[test]
    fn test_null_snapshot_is_empty() {
        assert!(HistorySeries::from_snapshot(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_labels_are_time_of_day() {
        let mut history = HistorySeries::new();
        // 2024-01-01T08:05:00Z and 2024-01-01T17:30:00Z
        history.append(Sample::new(1_704_096_300_000, 30.0));
        history.append(Sample::new(1_704_130_200_000, 31.0));

        assert_eq!(history.labels_in(&Utc), vec!["08:05", "17:30"]);
    }
}
