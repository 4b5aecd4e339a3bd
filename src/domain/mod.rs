// Domain layer - Pure dashboard models and transformations
pub mod auth;
pub mod control;
pub mod dashboard;
pub mod forecast;
pub mod gauge;
pub mod geometry;
pub mod history;
pub mod liveness;
pub mod telemetry;
