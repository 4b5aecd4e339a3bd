// Daily temperature extremes from a 3-hourly forecast
use chrono::{DateTime, Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const FORECAST_DAYS: usize = 5;

/// One forecast instant as delivered by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSample {
    /// Unix timestamp in seconds.
    pub dt: i64,
    pub temp_min: f64,
    pub temp_max: f64,
}

impl ForecastSample {
    pub fn new(dt: i64, temp_min: f64, temp_max: f64) -> Self {
        Self {
            dt,
            temp_min,
            temp_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl ForecastDay {
    pub fn new(date: NaiveDate, min: f64, max: f64) -> Self {
        Self {
            date,
            label: day_label(date),
            min,
            max,
        }
    }
}

/// Bucket samples by UTC calendar day, reduce each bucket to its extremes and
/// keep the first [`FORECAST_DAYS`] days.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Vec<ForecastDay> {
    let mut buckets: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for sample in samples {
        let Some(instant) = DateTime::from_timestamp(sample.dt, 0) else {
            tracing::debug!("Skipping forecast sample with out-of-range dt {}", sample.dt);
            continue;
        };

        buckets
            .entry(instant.date_naive())
            .and_modify(|(min, max)| {
                *min = min.min(sample.temp_min);
                *max = max.max(sample.temp_max);
            })
            .or_insert((sample.temp_min, sample.temp_max));
    }

    buckets
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, (min, max))| ForecastDay::new(date, min, max))
        .collect()
}

/// Demo forecast shown when the real one is unavailable: a gently rising
/// baseline with a fixed 6 degree band, starting at `today`.
pub fn synthetic_forecast(today: NaiveDate) -> Vec<ForecastDay> {
    (0..FORECAST_DAYS as u64)
        .filter_map(|i| {
            let date = today.checked_add_days(Days::new(i))?;
            let base = 22.0 + i as f64 * 1.5;
            Some(ForecastDay::new(date, base - 3.0, base + 3.0))
        })
        .collect()
}

/// Short day/month label, e.g. `07 Mar`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d %b").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-01T00:00:00Z
    const MARCH_1: i64 = 1_709_251_200;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 24 * HOUR;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_buckets_by_day() {
        let samples = vec![
            ForecastSample::new(MARCH_1 + 3 * HOUR, 18.0, 21.0),
            ForecastSample::new(MARCH_1 + 12 * HOUR, 24.0, 29.5),
            ForecastSample::new(MARCH_1 + 21 * HOUR, 16.5, 19.0),
            ForecastSample::new(MARCH_1 + DAY + 6 * HOUR, 20.0, 23.0),
        ];

        let days = aggregate_daily(&samples);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2024, 3, 1));
        assert_eq!(days[0].min, 16.5);
        assert_eq!(days[0].max, 29.5);
        assert_eq!(days[0].label, "01 Mar");
        assert_eq!(days[1].date, date(2024, 3, 2));
        assert_eq!((days[1].min, days[1].max), (20.0, 23.0));
    }

    #[test]
    fn test_six_days_yield_first_five_ascending() {
        // Deliberately out of order, eight samples per day.
        let mut samples = Vec::new();
        for day in (0..6).rev() {
            for slot in 0..8 {
                let t = 15.0 + day as f64 + slot as f64 * 0.5;
                samples.push(ForecastSample::new(MARCH_1 + day * DAY + slot * 3 * HOUR, t, t + 2.0));
            }
        }

        let days = aggregate_daily(&samples);

        assert_eq!(days.len(), FORECAST_DAYS);
        assert_eq!(days[0].date, date(2024, 3, 1));
        assert_eq!(days[4].date, date(2024, 3, 5));
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        assert!(days.iter().all(|d| d.max >= d.min));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn test_synthetic_forecast() {
        let days = synthetic_forecast(date(2024, 2, 27));

        assert_eq!(days.len(), FORECAST_DAYS);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        assert!(days.iter().all(|d| d.max - d.min == 6.0));
        assert_eq!((days[0].min, days[0].max), (19.0, 25.0));
        assert_eq!((days[4].min, days[4].max), (25.0, 31.0));
        // Crosses the leap day.
        let labels: Vec<&str> = days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["27 Feb", "28 Feb", "29 Feb", "01 Mar", "02 Mar"]);
    }
}
