use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use stocktally_auth::Capabilities;

use crate::app::dto::WhoAmIResponse;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caps): Extension<Capabilities>) -> impl IntoResponse {
    Json(WhoAmIResponse::from(&caps))
}
