use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::engine::fare::{estimate_confirmation_fare, ConfirmationFare, FARE_CAPTION};
use crate::error::AppError;
use crate::models::place::GeoPoint;
use crate::models::tariff::{FareQuote, TripModifiers, VehicleTariff};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fares/quote", post(quote_fare))
        .route("/fares/confirmation", post(confirmation_fare))
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub distance_km: f64,
    pub tariff: VehicleTariff,
    #[serde(default)]
    pub modifiers: TripModifiers,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: FareQuote,
    pub caption: &'static str,
}

async fn quote_fare(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    if !payload.distance_km.is_finite() || payload.distance_km < 0.0 {
        return Err(AppError::BadRequest(format!(
            "distance_km must be a non-negative number, got {}",
            payload.distance_km
        )));
    }
    if !payload.modifiers.is_complete() {
        return Err(AppError::BadRequest(
            "scheduled pickup needs both scheduled_date and scheduled_time".to_string(),
        ));
    }

    let quote = state
        .fares
        .quote_trip(payload.distance_km, &payload.tariff, &payload.modifiers);

    Ok(Json(QuoteResponse {
        quote,
        caption: FARE_CAPTION,
    }))
}

#[derive(Deserialize)]
pub struct ConfirmationRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub tariff: VehicleTariff,
}

async fn confirmation_fare(Json(payload): Json<ConfirmationRequest>) -> Json<ConfirmationFare> {
    Json(estimate_confirmation_fare(
        &payload.start,
        &payload.end,
        &payload.tariff,
    ))
}
