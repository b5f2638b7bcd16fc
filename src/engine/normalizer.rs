use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::models::booking::{
    BookingKind, BookingStatus, CanonicalBooking, DraftBooking, PackageBooking, PackageTripRecord,
    RawBookingRecord, SingleTripRecord,
};
use crate::models::wire::{amount_string, midnight_utc};

pub const DEFAULT_VEHICLE_TYPE: &str = "MINI";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum NormalizedBooking {
    SingleTrip(CanonicalBooking),
    PackageTrip(PackageBooking),
}

impl NormalizedBooking {
    pub fn kind(&self) -> BookingKind {
        match self {
            NormalizedBooking::SingleTrip(_) => BookingKind::SingleTrip,
            NormalizedBooking::PackageTrip(_) => BookingKind::PackageTrip,
        }
    }
}

pub fn normalize(raw: RawBookingRecord) -> NormalizedBooking {
    normalize_at(raw, Utc::now())
}

pub fn normalize_at(raw: RawBookingRecord, now: DateTime<Utc>) -> NormalizedBooking {
    match raw {
        RawBookingRecord::Draft(draft) => {
            NormalizedBooking::SingleTrip(normalize_draft(draft, now))
        }
        RawBookingRecord::SingleTrip(record) => {
            NormalizedBooking::SingleTrip(normalize_single_trip(record))
        }
        RawBookingRecord::PackageTrip(record) => {
            NormalizedBooking::PackageTrip(normalize_package(record))
        }
    }
}

/// A draft has never reached the backend, so it is always unconfirmed,
/// pending and created "now".
pub fn normalize_draft(draft: DraftBooking, now: DateTime<Utc>) -> CanonicalBooking {
    let amount = draft
        .fare
        .as_ref()
        .and_then(amount_string)
        .unwrap_or_else(|| "0".to_string());

    CanonicalBooking {
        id: draft
            .id
            .unwrap_or_else(|| format!("draft-{}", Uuid::new_v4())),
        start_point: draft.start_location.label(),
        end_point: draft.end_location.label(),
        vehicle_type: draft
            .vehicle
            .and_then(|vehicle| vehicle.vehicle_type)
            .unwrap_or_else(|| DEFAULT_VEHICLE_TYPE.to_string()),
        date_of_travel: draft.pickup_date.unwrap_or_else(|| now.date_naive()),
        pickup_time: draft
            .pickup_time
            .map(|time| time.format("%H:%M").to_string()),
        amount_due: amount.clone(),
        amount_total: amount,
        is_confirmed: false,
        status: BookingStatus::Pending,
        created_at: now,
        ride_instructions: draft.pickup_instructions.unwrap_or_default(),
        is_closed: false,
        kind: BookingKind::SingleTrip,
    }
}

/// Backend rides are already in canonical shape; only names are projected
/// and missing timestamps filled so recency comparisons always have a key.
pub fn normalize_single_trip(record: SingleTripRecord) -> CanonicalBooking {
    let created_at = record
        .created_at
        .or_else(|| record.date_of_travel.map(midnight_utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let amount_due = record
        .amount_due
        .or(record.pending_payment)
        .unwrap_or_else(|| "0".to_string());

    CanonicalBooking {
        id: record.id.unwrap_or_default(),
        start_point: record.start_point.unwrap_or_default(),
        end_point: record.end_point.unwrap_or_default(),
        vehicle_type: record.vehicle_type.unwrap_or_default(),
        date_of_travel: record
            .date_of_travel
            .unwrap_or_else(|| created_at.date_naive()),
        pickup_time: record.pickup_time,
        amount_total: record.amount_total.unwrap_or_else(|| amount_due.clone()),
        amount_due,
        is_confirmed: record.is_confirmed,
        status: record.status,
        created_at,
        ride_instructions: record.ride_instructions.unwrap_or_default(),
        is_closed: record.is_closed,
        kind: BookingKind::SingleTrip,
    }
}

pub fn normalize_package(record: PackageTripRecord) -> PackageBooking {
    PackageBooking {
        id: record.id.unwrap_or_default(),
        pick_up_place: record.pick_up_place.unwrap_or_default(),
        total_km_booked: record.total_km_booked,
        total_hours_booked: record.total_hours_booked,
        vehicle_type: record.vehicle_type,
        base_amount: record.base_amount.unwrap_or_else(|| "0".to_string()),
        date_of_travel: record.date_of_travel,
        pickup_time: record.pickup_time,
        created_at: record.created_at,
        is_confirmed: record.is_confirmed,
        is_closed: record.is_closed,
        kind: BookingKind::PackageTrip,
    }
}

/// Normalizes the rides list. Entries that match no known shape are logged
/// and skipped.
pub fn normalize_rides(values: Vec<Value>) -> Vec<CanonicalBooking> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawBookingRecord>(value) {
            Ok(raw) => match normalize(raw) {
                NormalizedBooking::SingleTrip(booking) => Some(booking),
                NormalizedBooking::PackageTrip(package) => {
                    warn!(id = %package.id, "package trip in rides list ignored");
                    None
                }
            },
            Err(err) => {
                warn!(error = %err, "unrecognised ride record skipped");
                None
            }
        })
        .collect()
}

pub fn normalize_packages(values: Vec<Value>) -> Vec<PackageBooking> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<PackageTripRecord>(value) {
            Ok(record) => Some(normalize_package(record)),
            Err(err) => {
                warn!(error = %err, "unrecognised package record skipped");
                None
            }
        })
        .collect()
}

/// Calendar date used when a record carries no date at all.
pub fn epoch_date() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}
