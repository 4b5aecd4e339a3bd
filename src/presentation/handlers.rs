// HTTP request handlers
use crate::domain::auth::{AuthError, Credentials, User};
use crate::domain::dashboard::DashboardState;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response, svg_response};
use crate::infrastructure::svg_chart::{render_history_chart, render_weather_chart};
use crate::presentation::app_state::AppState;
use crate::presentation::views::DashboardView;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

const AUTO_MODE_ON: &str = "Turn off Auto mode to control the pump manually.";

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn auth_error_response(error: AuthError) -> Response {
    let status = match &error {
        e if e.is_validation() => StatusCode::BAD_REQUEST,
        AuthError::Rejected(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_body(status, &error.to_string())
}

/// Dashboard routes are only served to a signed-in user.
fn require_user(state: &AppState) -> Result<User, Response> {
    state
        .auth_service
        .current_user()
        .ok_or_else(|| error_body(StatusCode::UNAUTHORIZED, "Sign in to view the dashboard."))
}

fn unwrap_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

pub async fn sign_in(State(state): State<Arc<AppState>>, Json(credentials): Json<Credentials>) -> Response {
    match state.auth_service.sign_in(&credentials).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => auth_error_response(e),
    }
}

pub async fn sign_up(State(state): State<Arc<AppState>>, Json(credentials): Json<Credentials>) -> Response {
    match state.auth_service.sign_up(&credentials).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => auth_error_response(e),
    }
}

pub async fn sign_out(State(state): State<Arc<AppState>>) -> Response {
    match state.auth_service.sign_out().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => auth_error_response(e),
    }
}

pub async fn current_user(State(state): State<Arc<AppState>>) -> Response {
    match require_user(&state) {
        Ok(user) => Json(user).into_response(),
        Err(response) => response,
    }
}

/// Current dashboard snapshot
pub async fn dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    if let Err(response) = require_user(&state) {
        return response;
    }

    let view = DashboardView::from(&state.dashboard_service.snapshot());
    unwrap_response(json_response(&view, accepts_brotli(&headers)).await)
}

/// Stream every dashboard change as a length-prefixed JSON chunk
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    if let Err(response) = require_user(&state) {
        return response;
    }

    let rx = state.dashboard_service.watch();
    stream_from_watch(rx, |s: &DashboardState| DashboardView::from(s), accepts_brotli(&headers))
        .await
        .into_response()
}

pub async fn soil_history_chart(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    if let Err(response) = require_user(&state) {
        return response;
    }

    let snapshot = state.dashboard_service.snapshot();
    let svg = render_history_chart(&snapshot.soil_history, &snapshot.soil_history.labels());
    unwrap_response(svg_response(svg, accepts_brotli(&headers)).await)
}

pub async fn weather_chart(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    if let Err(response) = require_user(&state) {
        return response;
    }

    let svg = render_weather_chart(&state.dashboard_service.snapshot().forecast);
    unwrap_response(svg_response(svg, accepts_brotli(&headers)).await)
}

pub async fn toggle_auto(State(state): State<Arc<AppState>>) -> Response {
    if let Err(response) = require_user(&state) {
        return response;
    }

    Json(state.dashboard_service.toggle_auto()).into_response()
}

pub async fn toggle_manual(State(state): State<Arc<AppState>>) -> Response {
    if let Err(response) = require_user(&state) {
        return response;
    }

    match state.dashboard_service.toggle_manual() {
        Some(control) => Json(control).into_response(),
        None => error_body(StatusCode::CONFLICT, AUTO_MODE_ON),
    }
}
