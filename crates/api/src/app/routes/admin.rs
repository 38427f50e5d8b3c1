//! User administration. Every route needs `manage_users`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use stocktally_auth::{Capabilities, NewAccount};
use stocktally_core::AccountId;

use crate::app::dto::ChangeRoleRequest;
use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", put(change_role))
}

/// GET /admin/users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
) -> axum::response::Response {
    match services.accounts.list(&caps).await {
        Ok(accounts) => Json(accounts).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /admin/users
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Json(body): Json<NewAccount>,
) -> axum::response::Response {
    match services.accounts.register(&caps, body).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /admin/users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AccountId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.accounts.get(&caps, id).await {
        Ok(account) => Json(account).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// PUT /admin/users/:id/role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caps): Extension<Capabilities>,
    Path(id): Path<String>,
    Json(body): Json<ChangeRoleRequest>,
) -> axum::response::Response {
    let id: AccountId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.accounts.change_role(&caps, id, body.role).await {
        Ok(account) => Json(account).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
