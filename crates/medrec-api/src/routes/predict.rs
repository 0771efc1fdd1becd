use std::sync::Arc;

use axum::{Json, extract::State};
use medrec_core::{DiseaseInfo, SymptomsRequest};

use crate::ApiError;
use crate::state::AppContext;

/// Handler for POST /api/predict
pub async fn predict_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<SymptomsRequest>,
) -> Result<Json<DiseaseInfo>, ApiError> {
    let info = ctx.predict_disease(request.symptoms).await?;
    Ok(Json(info))
}
