use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.message.trim().is_empty() && request.city.is_none() {
        return Err(AppError::InvalidInput(
            "message must not be empty when no city is given".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        city = ?request.city,
        exclude_count = request.exclude.len(),
        "Processing recommendation request"
    );

    let response = state.recommender.handle_query(request).await;

    tracing::info!(
        request_id = %request_id,
        mode = ?response.mode,
        result_count = response.results.len(),
        "Recommendation completed"
    );

    Ok(Json(response))
}
