//! First-run setup: creates the initial admin account.

use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use stocktally_auth::NewAccount;

use crate::app::{errors, services::AppServices};

/// POST /setup - only succeeds while no account exists.
pub async fn setup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewAccount>,
) -> axum::response::Response {
    match services.accounts.bootstrap_admin(body).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
