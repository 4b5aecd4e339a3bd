// Forecast service - Daily min/max forecast with a synthetic fallback
use crate::application::weather_provider::WeatherProvider;
use crate::domain::forecast::{aggregate_daily, synthetic_forecast, ForecastDay};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct ForecastService {
    provider: Option<Arc<dyn WeatherProvider>>,
    city: String,
}

impl ForecastService {
    /// `provider` is `None` when no weather API key is configured.
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>, city: String) -> Self {
        Self { provider, city }
    }

    /// Never empty: any failure degrades to the synthetic forecast.
    pub async fn load(&self, today: NaiveDate) -> Vec<ForecastDay> {
        let Some(provider) = &self.provider else {
            tracing::warn!("No weather API key configured, using demo forecast");
            return synthetic_forecast(today);
        };

        match provider.fetch_forecast(&self.city).await {
            Ok(samples) => {
                let days = aggregate_daily(&samples);
                if days.is_empty() {
                    tracing::warn!("Weather provider returned no samples for {}, using demo forecast", self.city);
                    return synthetic_forecast(today);
                }
                tracing::debug!("Loaded {} forecast days for {}", days.len(), self.city);
                days
            }
            Err(e) => {
                tracing::error!("Weather error for {}, using demo forecast: {:#}", self.city, e);
                synthetic_forecast(today)
            }
        }
    }
}
