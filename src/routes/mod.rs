use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::Recommender,
    store::SignalStore,
};

pub mod recommendations;
pub mod restaurants;

/// Shared, read-only state handed to every handler
pub struct AppState {
    pub store: Arc<SignalStore>,
    pub recommender: Recommender,
}

/// Creates the application router with all routes and layers
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/restaurants", get(restaurants::list_restaurants))
        .route("/restaurants/:id", get(restaurants::get_restaurant))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "restaurants": state.store.len(),
            "loaded_at": state.store.loaded_at(),
        })),
    )
}
