// OpenWeatherMap 5 day / 3 hour forecast client
use crate::application::weather_provider::WeatherProvider;
use crate::domain::forecast::ForecastSample;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp_min: f64,
    temp_max: f64,
}

impl OpenWeatherProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn forecast_url(&self, city: &str) -> String {
        format!(
            "{}/data/2.5/forecast?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key)
        )
    }

    fn parse_forecast(body: &str) -> Result<Vec<ForecastSample>> {
        let response: ForecastResponse =
            serde_json::from_str(body).context("Failed to parse forecast response")?;

        Ok(response
            .list
            .into_iter()
            .map(|entry| ForecastSample::new(entry.dt, entry.main.temp_min, entry.main.temp_max))
            .collect())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastSample>> {
        let url = self.forecast_url(city);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to weather API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Weather API failed with status {}: {}", status, body);
        }

        let body = response.text().await.context("Failed to read forecast body")?;
        let samples = Self::parse_forecast(&body)?;
        tracing::debug!("Weather API returned {} samples for {}", samples.len(), city);
        Ok(samples)
    }
}
