use serde::Deserialize;

pub const DEFAULT_CITY: &str = "Indore,IN";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub firebase: FirebaseSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FirebaseSettings {
    pub database_url: String,
    pub api_key: String,
    /// Database secret or token appended as `auth=` to store requests.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    /// First wait before reopening a failed or closed subscription.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            city: default_city(),
            base_url: default_weather_url(),
        }
    }
}

impl WeatherSettings {
    /// A blank key counts as not configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// `config/dashboard.toml`, overridden by `IRRIGATION__SECTION__KEY` variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("IRRIGATION").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> DashboardConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(
            r#"
            [firebase]
            database_url = "https://rig-default-rtdb.firebaseio.com"
            api_key = "web-key"
            "#,
        );

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.weather.city, "Indore,IN");
        assert_eq!(config.weather.api_key(), None);
        assert_eq!(config.firebase.auth_token, None);
        assert_eq!(config.firebase.identity_url, DEFAULT_IDENTITY_URL);
        assert_eq!(config.firebase.retry_delay_ms, 1000);
    }

    #[test]
    fn test_blank_weather_key_is_unset() {
        let config = parse(
            r#"
            [firebase]
            database_url = "https://rig-default-rtdb.firebaseio.com"
            api_key = "web-key"

            [weather]
            api_key = "  "
            city = "Pune,IN"
            "#,
        );

        assert_eq!(config.weather.api_key(), None);
        assert_eq!(config.weather.city, "Pune,IN");
    }

    #[test]
    fn test_weather_key() {
        let config = parse(
            r#"
            [firebase]
            database_url = "https://rig-default-rtdb.firebaseio.com"
            api_key = "web-key"

            [weather]
            api_key = "abc123"
            "#,
        );

        assert_eq!(config.weather.api_key(), Some("abc123"));
    }
}
