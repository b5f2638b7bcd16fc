use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::models::place::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/places", get(search_places))
        .route("/distance", post(driving_distance))
}

#[derive(Deserialize)]
pub struct PlaceQuery {
    #[serde(default)]
    pub query: String,
}

async fn search_places(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlaceQuery>,
) -> Json<Vec<GeoPoint>> {
    Json(state.places.search(&params.query).await)
}

#[derive(Deserialize)]
pub struct DistanceRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

#[derive(Serialize)]
pub struct DistanceResponse {
    pub distance_km: f64,
}

async fn driving_distance(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DistanceRequest>,
) -> Json<DistanceResponse> {
    let distance_km = state.distances.resolve(&payload.start, &payload.end).await;
    Json(DistanceResponse { distance_km })
}
