use std::sync::Arc;

use axum::{Json, extract::State};
use medrec_core::{InteractionReport, InteractionRequest};

use crate::state::AppContext;

/// Handler for POST /api/interactions
///
/// Always 200: generator failures surface as the fallback report.
pub async fn interactions_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<InteractionRequest>,
) -> Json<InteractionReport> {
    Json(ctx.check_interactions(&request.drugs).await)
}
