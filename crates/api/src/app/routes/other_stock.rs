use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stocktally_auth::{Capabilities, Permission};
use stocktally_core::ItemId;
use stocktally_inventory::{NewOtherStockItem, OtherStockItemPatch};

use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_other).post(add_other))
        .route("/:id", get(get_other).put(update_other).delete(delete_other))
}

pub async fn list_other(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::ViewInventory) {
        return errors::forbidden(e);
    }

    match services.catalog.list_other().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_other(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Json(body): Json<NewOtherStockItem>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::AddInventory) {
        return errors::forbidden(e);
    }

    match services.catalog.add_other(body).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_other(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::ViewInventory) {
        return errors::forbidden(e);
    }
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.get_other(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_other(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Path(id): Path<String>,
    Json(body): Json<OtherStockItemPatch>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::EditInventory) {
        return errors::forbidden(e);
    }
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.update_other(id, body).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_other(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::DeleteInventory) {
        return errors::forbidden(e);
    }
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.delete_other(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
