use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::IntoResponse,
    routing::get,
};

use stocktally_auth::{Capabilities, Permission};

use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/low-stock", get(low_stock))
}

/// GET /alerts/low-stock
pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::ViewInventory) {
        return errors::forbidden(e);
    }

    match services.catalog.low_stock().await {
        Ok(alerts) => Json(alerts).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
