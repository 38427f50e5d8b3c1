use axum::{Router, routing::get};

pub mod admin;
pub mod alerts;
pub mod daily_stock;
pub mod liquor;
pub mod other_stock;
pub mod setup;
pub mod stock_movement;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/liquor", liquor::router())
        .nest("/other-stock", other_stock::router())
        .nest("/daily-stock", daily_stock::router())
        .nest("/stock-movement", stock_movement::router())
        .nest("/alerts", alerts::router())
        .nest("/admin", admin::router())
}
