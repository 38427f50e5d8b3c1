use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stocktally_auth::{Capabilities, Permission};
use stocktally_infra::ServiceError;
use stocktally_inventory::ItemType;

use crate::app::dto::{DailyStockRequest, DateQuery, SnapshotResponse};
use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/", get(list_daily_stock).post(record_daily_stock))
}

/// GET /daily-stock?date=YYYY-MM-DD (defaults to today)
pub async fn list_daily_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Query(query): Query<DateQuery>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::ViewInventory) {
        return errors::forbidden(e);
    }
    let date = match errors::parse_date(query.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    match services.daily_stock.get_daily_stock(date).await {
        Ok(snapshots) => Json(
            snapshots
                .into_iter()
                .map(SnapshotResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /daily-stock
pub async fn record_daily_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Json(body): Json<DailyStockRequest>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::AddInventory) {
        return errors::forbidden(e);
    }

    let entry = match body.into_entry() {
        Ok(entry) => entry,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Stock can only be recorded against a catalog item of the same kind.
    let known = match entry.item_type {
        ItemType::Liquor => services.catalog.get_liquor(entry.item_id).await.map(|_| ()),
        ItemType::Other => services.catalog.get_other(entry.item_id).await.map(|_| ()),
    };
    if let Err(e) = known {
        return errors::service_error_to_response(e);
    }

    let date = entry.date;
    let item_id = entry.item_id;
    match services.daily_stock.record_daily_stock(entry).await {
        Ok(snapshot_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": snapshot_id.to_string(),
                "date": date,
                "item_id": item_id,
            })),
        )
            .into_response(),
        Err(e @ ServiceError::Domain(_)) | Err(e @ ServiceError::Authz(_)) => {
            errors::service_error_to_response(e)
        }
        Err(e) => {
            tracing::warn!(%item_id, %date, error = %e, "daily stock not recorded");
            errors::service_error_to_response(e)
        }
    }
}
