use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{City, RestaurantId, RestaurantRecord, RestaurantSummary},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    city: Option<String>,
}

/// Lists restaurants, optionally for one city, ordered by id
pub async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<RestaurantSummary>>> {
    let city = match params.city.as_deref() {
        Some(raw) => Some(
            City::parse(raw)
                .ok_or_else(|| AppError::InvalidInput(format!("unknown city '{}'", raw)))?,
        ),
        None => None,
    };

    let summaries = state
        .store
        .ids_for_city(city)
        .iter()
        .filter_map(|id| state.store.resolve(id))
        .map(RestaurantSummary::from)
        .collect();

    Ok(Json(summaries))
}

/// Full joined record for one restaurant
pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<RestaurantRecord>> {
    state
        .store
        .resolve(&RestaurantId::new(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("restaurant '{}'", id)))
}
