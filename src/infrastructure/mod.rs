// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod firebase_auth;
pub mod firebase_store;
pub mod http_response;
pub mod openweather;
pub mod svg_chart;
