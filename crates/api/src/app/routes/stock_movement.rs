use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::IntoResponse,
    routing::{get, post},
};

use stocktally_auth::{Capabilities, Permission};
use stocktally_infra::Derivation;

use crate::app::dto::{DateQuery, MovementResponse, RederiveRequest};
use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stock_movement))
        .route("/rederive", post(rederive_movement))
}

/// GET /stock-movement?date=YYYY-MM-DD (defaults to today)
pub async fn list_stock_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Query(query): Query<DateQuery>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::ViewSales) {
        return errors::forbidden(e);
    }
    let date = match errors::parse_date(query.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    match services.daily_stock.get_stock_movement(date).await {
        Ok(movements) => Json(
            movements
                .into_iter()
                .map(MovementResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /stock-movement/rederive
pub async fn rederive_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Json(body): Json<RederiveRequest>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::EditInventory) {
        return errors::forbidden(e);
    }

    match services
        .daily_stock
        .rederive_movement(body.item_id, body.date)
        .await
    {
        Ok(Derivation::Written(record)) => Json(serde_json::json!({
            "derived": true,
            "movement": MovementResponse::from(record),
        }))
        .into_response(),
        Ok(Derivation::Skipped) => Json(serde_json::json!({
            "derived": false,
            "movement": null,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
