//! Adapters for the commercial map APIs.
//!
//! Each adapter implements one stage of a provider chain. Stages report
//! every kind of failure, including "no results", as an error so the
//! resolver can move on to the next stage.

pub mod google;
pub mod olamaps;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::place::GeoPoint;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider answered HTTP {0}")]
    HttpStatus(u16),

    #[error("provider status {status}: {message}")]
    ApiStatus { status: String, message: String },

    #[error("no results")]
    Empty,

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// One stage of the place-search chain.
#[async_trait]
pub trait GeocodeSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, query: &str) -> Result<Vec<GeoPoint>, ProviderError>;
}

/// One stage of the driving-distance chain. Returns kilometres.
#[async_trait]
pub trait DistanceSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, start: &GeoPoint, end: &GeoPoint) -> Result<f64, ProviderError>;
}

pub fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

pub(crate) async fn get_json<T>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
{
    let response = client.get(url).query(query).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::HttpStatus(status.as_u16()));
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|err| ProviderError::Decode(err.to_string()))
}

/// Metres to kilometres, rejecting values that are not usable distances.
pub(crate) fn metres_to_km(metres: Option<f64>) -> Result<f64, ProviderError> {
    match metres {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(value / 1000.0),
        Some(value) => Err(ProviderError::Decode(format!("invalid distance {value}"))),
        None => Err(ProviderError::Empty),
    }
}
