use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::wire;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub enum BookingStatus {
    Pending,
    Started,
    Closed,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(raw)) => BookingStatus::from(raw.as_str()),
            _ => BookingStatus::Unknown,
        })
    }
}

impl From<&str> for BookingStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => BookingStatus::Pending,
            "started" => BookingStatus::Started,
            "closed" | "completed" => BookingStatus::Closed,
            _ => BookingStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BookingKind {
    SingleTrip,
    PackageTrip,
}

/// UI-ready point-to-point booking. Never mutated; rebuilt from the raw
/// record on every refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalBooking {
    pub id: String,
    pub start_point: String,
    pub end_point: String,
    pub vehicle_type: String,
    pub date_of_travel: NaiveDate,
    pub pickup_time: Option<String>,
    pub amount_due: String,
    pub amount_total: String,
    pub is_confirmed: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub ride_instructions: String,
    pub is_closed: bool,
    pub kind: BookingKind,
}

/// Hourly/km package booking. Keeps the backend vocabulary: its state lives
/// in `is_closed`/`is_confirmed`, there is no status string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageBooking {
    pub id: String,
    pub pick_up_place: String,
    pub total_km_booked: Option<f64>,
    pub total_hours_booked: Option<f64>,
    pub vehicle_type: Option<String>,
    pub base_amount: String,
    pub date_of_travel: Option<NaiveDate>,
    pub pickup_time: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_confirmed: bool,
    pub is_closed: bool,
    pub kind: BookingKind,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DraftVehicle {
    #[serde(default, rename = "type", alias = "vehicle_type")]
    pub vehicle_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DraftLocation {
    Place {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        address: Option<String>,
    },
    Text(String),
}

impl DraftLocation {
    pub fn label(&self) -> String {
        match self {
            DraftLocation::Place { name, address } => address
                .clone()
                .filter(|a| !a.is_empty())
                .or_else(|| name.clone())
                .unwrap_or_default(),
            DraftLocation::Text(text) => text.clone(),
        }
    }
}

/// Client-side booking assembled from user selections, not yet submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftBooking {
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub id: Option<String>,
    pub start_location: DraftLocation,
    pub end_location: DraftLocation,
    #[serde(default)]
    pub vehicle: Option<DraftVehicle>,
    #[serde(default)]
    pub fare: Option<Value>,
    #[serde(default, deserialize_with = "wire::opt_date")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::opt_time")]
    pub pickup_time: Option<NaiveTime>,
    #[serde(default)]
    pub pickup_instructions: Option<String>,
}

/// Single or round trip as returned by the rides endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleTripRecord {
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub id: Option<String>,
    /// Required key, nullable value: the key alone marks a single trip.
    #[serde(deserialize_with = "wire::opt_text")]
    pub start_point: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub end_point: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_date")]
    pub date_of_travel: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub pickup_time: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_amount")]
    pub amount_due: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_amount")]
    pub amount_total: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_amount")]
    pub pending_payment: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_confirmed: bool,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "wire::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ride_instructions: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageTripRecord {
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "wire::opt_text")]
    pub pick_up_place: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_number")]
    pub total_km_booked: Option<f64>,
    #[serde(default, deserialize_with = "wire::opt_number")]
    pub total_hours_booked: Option<f64>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_amount")]
    pub base_amount: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_date")]
    pub date_of_travel: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub pickup_time: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_confirmed: bool,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_closed: bool,
}

/// Any booking payload the client may hold. Variant order matters for
/// untagged matching: drafts are recognised by `startLocation`, package
/// trips by `pick_up_place`, everything else with a `start_point` is a
/// single trip.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawBookingRecord {
    Draft(DraftBooking),
    PackageTrip(PackageTripRecord),
    SingleTrip(SingleTripRecord),
}
