//! Fare formulas.
//!
//! Two independent formulas live here. [`quote`] prices a trip from the
//! routed driving distance while the rider is choosing a vehicle.
//! [`confirmation_fare`] prices an already confirmed booking from the
//! straight-line distance when no routed distance is available. They are
//! kept separate on purpose and give different numbers for the same trip.

use serde::Serialize;

use crate::geo::haversine_km;
use crate::models::place::GeoPoint;
use crate::models::tariff::{FareQuote, TripModifiers, VehicleTariff};

pub const LONG_HAUL_THRESHOLD_KM: f64 = 200.0;
pub const LONG_HAUL_FEE: f64 = 300.0;

/// Shown next to every quote. Neither tax nor toll is computed by the
/// formula; this is a display policy.
pub const FARE_CAPTION: &str = "Inclusive of GST, exclusive of toll";

pub const CONFIRMATION_BASE_FARE: f64 = 50.0;
pub const CONFIRMATION_DRIVER_FEE: f64 = 20.0;
pub const CONFIRMATION_TOLL: f64 = 40.0;
pub const CONFIRMATION_TOLL_THRESHOLD_KM: f64 = 10.0;

/// `round(distance * price_per_km + long-haul fee when distance > threshold)`.
pub fn quote(distance_km: f64, tariff: &VehicleTariff, threshold_km: f64, fee: f64) -> i64 {
    let surcharge = long_haul_surcharge(distance_km, threshold_km, fee);
    (distance_km * tariff.price_per_km + surcharge).round() as i64
}

fn long_haul_surcharge(distance_km: f64, threshold_km: f64, fee: f64) -> f64 {
    if distance_km > threshold_km { fee } else { 0.0 }
}

/// Base fare, per-km charge, driver fee, and a flat toll past 10 km.
pub fn confirmation_fare(distance_km: f64, tariff: &VehicleTariff) -> i64 {
    let toll = if distance_km > CONFIRMATION_TOLL_THRESHOLD_KM {
        CONFIRMATION_TOLL
    } else {
        0.0
    };

    (CONFIRMATION_BASE_FARE + distance_km * tariff.price_per_km + CONFIRMATION_DRIVER_FEE + toll)
        .round() as i64
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfirmationFare {
    pub distance_km: f64,
    pub total: i64,
}

pub fn estimate_confirmation_fare(
    start: &GeoPoint,
    end: &GeoPoint,
    tariff: &VehicleTariff,
) -> ConfirmationFare {
    let distance_km = haversine_km(start, end);
    ConfirmationFare {
        distance_km,
        total: confirmation_fare(distance_km, tariff),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FareEngine {
    pub long_haul_threshold_km: f64,
    pub long_haul_fee: f64,
}

impl Default for FareEngine {
    fn default() -> Self {
        Self {
            long_haul_threshold_km: LONG_HAUL_THRESHOLD_KM,
            long_haul_fee: LONG_HAUL_FEE,
        }
    }
}

impl FareEngine {
    pub fn new(long_haul_threshold_km: f64, long_haul_fee: f64) -> Self {
        Self {
            long_haul_threshold_km,
            long_haul_fee,
        }
    }

    pub fn total(&self, distance_km: f64, tariff: &VehicleTariff) -> i64 {
        quote(
            distance_km,
            tariff,
            self.long_haul_threshold_km,
            self.long_haul_fee,
        )
    }

    /// Full quote record. A new quote is built for every distance or vehicle
    /// change; quotes are never patched.
    pub fn quote_trip(
        &self,
        distance_km: f64,
        tariff: &VehicleTariff,
        modifiers: &TripModifiers,
    ) -> FareQuote {
        FareQuote {
            vehicle_id: tariff.id.clone(),
            distance_km,
            base_fare: distance_km * tariff.price_per_km,
            surcharge: long_haul_surcharge(
                distance_km,
                self.long_haul_threshold_km,
                self.long_haul_fee,
            ),
            total: self.total(distance_km, tariff),
            modifiers: modifiers.clone(),
        }
    }
}
