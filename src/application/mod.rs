// Application layer - Use cases and the traits external collaborators implement
pub mod auth_provider;
pub mod auth_service;
pub mod dashboard_service;
pub mod forecast_service;
pub mod realtime_store;
pub mod weather_provider;
