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
use stocktally_inventory::{LiquorItemPatch, NewLiquorItem};

use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_liquor).post(add_liquor))
        .route("/:id", get(get_liquor).put(update_liquor).delete(delete_liquor))
}

pub async fn list_liquor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::ViewInventory) {
        return errors::forbidden(e);
    }

    match services.catalog.list_liquor().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_liquor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Json(body): Json<NewLiquorItem>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::AddInventory) {
        return errors::forbidden(e);
    }

    match services.catalog.add_liquor(body).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_liquor(
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

    match services.catalog.get_liquor(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_liquor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Path(id): Path<String>,
    Json(body): Json<LiquorItemPatch>,
) -> axum::response::Response {
    if let Err(e) = caps.require(Permission::EditInventory) {
        return errors::forbidden(e);
    }
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.update_liquor(id, body).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_liquor(
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

    match services.catalog.delete_liquor(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
