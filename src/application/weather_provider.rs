// Weather provider trait for the multi-day forecast
use crate::domain::forecast::ForecastSample;
use async_trait::async_trait;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Raw 3-hourly forecast samples for `city`. Any error sends the caller
    /// down the synthetic fallback.
    async fn fetch_forecast(&self, city: &str) -> anyhow::Result<Vec<ForecastSample>>;
}
