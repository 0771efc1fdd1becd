//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

pub const WELCOME: &str = "Welcome to the Drug Recommendation API";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Handler for GET /
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse { message: WELCOME })
}
