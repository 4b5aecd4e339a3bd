// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::auth_provider::AuthProvider;
use crate::application::auth_service::AuthService;
use crate::application::dashboard_service::DashboardService;
use crate::application::forecast_service::ForecastService;
use crate::application::weather_provider::WeatherProvider;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::firebase_auth::FirebaseAuth;
use crate::infrastructure::firebase_store::FirebaseStore;
use crate::infrastructure::openweather::OpenWeatherProvider;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_user, dashboard, health_check, sign_in, sign_out, sign_up, soil_history_chart,
    stream_dashboard, toggle_auto, toggle_manual, weather_chart,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config().context("Failed to load dashboard configuration")?;

    // Create adapters (infrastructure layer)
    let auth = Arc::new(FirebaseAuth::new(
        config.firebase.identity_url.clone(),
        config.firebase.api_key.clone(),
    ));
    // Store requests carry the signed-in user's ID token
    let store = Arc::new(
        FirebaseStore::new(config.firebase.database_url.clone(), config.firebase.auth_token.clone())
            .with_user(auth.watch_user()),
    );
    let weather = config.weather.api_key().map(|key| {
        Arc::new(OpenWeatherProvider::new(config.weather.base_url.clone(), key.to_string()))
            as Arc<dyn WeatherProvider>
    });

    // Create services (application layer)
    let forecast_service = ForecastService::new(weather, config.weather.city.clone());
    let dashboard_service = DashboardService::new(store, forecast_service)
        .with_retry_delay(Duration::from_millis(config.firebase.retry_delay_ms));
    let auth_service = AuthService::new(auth);

    // Live subscriptions follow the signed-in user
    tokio::spawn(dashboard_service.clone().supervise(auth_service.watch_user()));

    // Create application state
    let state = Arc::new(AppState {
        auth_service,
        dashboard_service,
    });

    // Build router (presentation layer)
    // Compression is applied per response by the handlers, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signout", post(sign_out))
        .route("/auth/user", get(current_user))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/charts/soil-history.svg", get(soil_history_chart))
        .route("/charts/weather.svg", get(weather_chart))
        .route("/control/auto", post(toggle_auto))
        .route("/control/manual", post(toggle_manual))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting irrigation-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
