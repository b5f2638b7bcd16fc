use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::backend::{PackageRequest, RatingRequest, Session};
use crate::engine::bookings::BookingSnapshot;
use crate::engine::selector::{BookingView, LatestBooking};
use crate::error::AppError;
use crate::models::booking::{CanonicalBooking, DraftBooking};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/customers/:id/bookings",
            get(booking_snapshot).post(submit_booking),
        )
        .route("/customers/:id/bookings/latest", get(latest_booking))
        .route("/customers/:id/bookings/view", post(view_bookings))
        .route("/customers/:id/package-bookings", post(submit_package))
        .route(
            "/customers/:id/bookings/:booking_id/rating",
            post(rate_booking),
        )
}

/// The caller's bearer token is forwarded to the booking backend as is.
fn session(customer_id: String, headers: &HeaderMap) -> Session {
    let auth_token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    Session {
        customer_id,
        auth_token,
    }
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub submitted: bool,
}

async fn booking_snapshot(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    headers: HeaderMap,
) -> Json<BookingSnapshot> {
    let session = session(customer_id, &headers);
    Json(state.bookings.refresh(&session).await)
}

async fn latest_booking(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LatestBooking>, AppError> {
    let session = session(customer_id, &headers);
    let latest = state.bookings.latest(&session).await.ok_or_else(|| {
        AppError::NotFound(format!("no bookings for customer {}", session.customer_id))
    })?;

    Ok(Json(latest))
}

#[derive(Deserialize)]
pub struct ViewRequest {
    pub view: String,
    #[serde(default)]
    pub draft: Option<DraftBooking>,
}

async fn view_bookings(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ViewRequest>,
) -> Result<Json<Vec<CanonicalBooking>>, AppError> {
    let view: BookingView = payload.view.parse().map_err(AppError::BadRequest)?;
    let session = session(customer_id, &headers);

    Ok(Json(state.bookings.view(&session, view, payload.draft).await))
}

async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<DraftBooking>,
) -> Json<SubmissionResponse> {
    let session = session(customer_id, &headers);
    let submitted = state.bookings.submit_ride(&session, draft).await;
    Json(SubmissionResponse { submitted })
}

async fn submit_package(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<PackageRequest>,
) -> Json<SubmissionResponse> {
    let session = session(customer_id, &headers);
    let submitted = state.bookings.submit_package(&session, request).await;
    Json(SubmissionResponse { submitted })
}

async fn rate_booking(
    State(state): State<Arc<AppState>>,
    Path((customer_id, booking_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(rating): Json<RatingRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    if !(1..=5).contains(&rating.rating) {
        return Err(AppError::BadRequest(format!(
            "rating must be between 1 and 5, got {}",
            rating.rating
        )));
    }

    let session = session(customer_id, &headers);
    let submitted = state.bookings.rate(&session, &booking_id, rating).await;
    Ok(Json(SubmissionResponse { submitted }))
}
