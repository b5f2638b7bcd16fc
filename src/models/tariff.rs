use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTariff {
    pub id: String,
    #[serde(rename = "type", alias = "vehicle_type")]
    pub vehicle_type: String,
    #[serde(default)]
    pub capacity: u8,
    #[serde(alias = "pricePerKm")]
    pub price_per_km: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PickupMode {
    #[default]
    Now,
    Scheduled,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TripModifiers {
    #[serde(default)]
    pub pickup_mode: PickupMode,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default)]
    pub round_trip: bool,
}

impl TripModifiers {
    /// A scheduled pickup needs both halves of its timestamp.
    pub fn is_complete(&self) -> bool {
        match self.pickup_mode {
            PickupMode::Now => true,
            PickupMode::Scheduled => {
                self.scheduled_date.is_some() && self.scheduled_time.is_some()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareQuote {
    pub vehicle_id: String,
    pub distance_km: f64,
    pub base_fare: f64,
    pub surcharge: f64,
    pub total: i64,
    pub modifiers: TripModifiers,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{PickupMode, TripModifiers, VehicleTariff};

    #[test]
    fn tariff_accepts_camel_case_price() {
        let tariff: VehicleTariff = serde_json::from_str(
            r#"{"id":"v1","type":"SEDAN","capacity":4,"pricePerKm":14.5}"#,
        )
        .unwrap();
        assert_eq!(tariff.vehicle_type, "SEDAN");
        assert_eq!(tariff.price_per_km, 14.5);
    }

    #[test]
    fn scheduled_pickup_without_time_is_incomplete() {
        let modifiers = TripModifiers {
            pickup_mode: PickupMode::Scheduled,
            scheduled_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            scheduled_time: None,
            round_trip: false,
        };
        assert!(!modifiers.is_complete());
        assert!(TripModifiers::default().is_complete());
    }
}
