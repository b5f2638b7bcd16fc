//! Client side of the booking REST service. The service itself is opaque:
//! each call either yields a payload or an error.

pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::booking::CanonicalBooking;

/// Who is calling. Passed into every backend call instead of being read
/// from ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub customer_id: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("booking service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("booking service answered HTTP {0}")]
    HttpStatus(u16),

    #[error("unexpected booking payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RideRequest {
    pub customer: String,
    pub start_point: String,
    pub end_point: String,
    pub vehicle_type: String,
    pub date_of_travel: NaiveDate,
    pub pickup_time: Option<String>,
    pub amount_total: String,
    pub ride_instructions: String,
}

impl RideRequest {
    pub fn new(session: &Session, booking: &CanonicalBooking) -> Self {
        Self {
            customer: session.customer_id.clone(),
            start_point: booking.start_point.clone(),
            end_point: booking.end_point.clone(),
            vehicle_type: booking.vehicle_type.clone(),
            date_of_travel: booking.date_of_travel,
            pickup_time: booking.pickup_time.clone(),
            amount_total: booking.amount_total.clone(),
            ride_instructions: booking.ride_instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageRequest {
    #[serde(default)]
    pub customer: String,
    pub pick_up_place: String,
    pub total_km_booked: f64,
    pub total_hours_booked: f64,
    pub vehicle_type: String,
    pub date_of_travel: NaiveDate,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub base_amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn list_rides(&self, session: &Session) -> Result<Vec<Value>, BackendError>;

    async fn list_package_rides(&self, session: &Session) -> Result<Vec<Value>, BackendError>;

    async fn book_ride(&self, session: &Session, request: &RideRequest) -> Result<(), BackendError>;

    async fn book_package(
        &self,
        session: &Session,
        request: &PackageRequest,
    ) -> Result<(), BackendError>;

    async fn rate_booking(
        &self,
        session: &Session,
        booking_id: &str,
        rating: &RatingRequest,
    ) -> Result<(), BackendError>;
}

/// List endpoints answer either a bare array or an envelope around one.
pub fn records_from(body: Value) -> Result<Vec<Value>, BackendError> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Object(mut envelope) => ["data", "rides", "results"]
            .iter()
            .find_map(|key| match envelope.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| BackendError::Decode("no record list in response".to_string())),
        other => Err(BackendError::Decode(format!("expected a list, got {other}"))),
    }
}
