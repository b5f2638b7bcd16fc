use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Coordinates rounded to five decimals, used to collapse duplicate
    /// candidates coming from different predictions.
    pub fn dedup_key(&self) -> (i64, i64) {
        (round5(self.latitude), round5(self.longitude))
    }

    pub fn lat_lng(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

fn round5(value: f64) -> i64 {
    (value * 100_000.0).round() as i64
}
