use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::place::GeoPoint;
use crate::providers::{get_json, metres_to_km, DistanceSource, GeocodeSource, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.olamaps.io";

/// Ola Maps: single-call forward geocode and a basic distance matrix. The
/// fallback stage of both chains; results need no second lookup.
#[derive(Clone)]
pub struct OlaMaps {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeResponse {
    #[serde(default)]
    geocoding_results: Vec<GeocodeResult>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    rows: Vec<MatrixRow>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    distance: Option<Distance>,
}

/// The basic matrix reports bare metres; the advanced one nests them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Distance {
    Metres(f64),
    Nested { value: Option<f64> },
}

impl Distance {
    fn metres(&self) -> Option<f64> {
        match self {
            Distance::Metres(value) => Some(*value),
            Distance::Nested { value } => *value,
        }
    }
}

fn check_status(status: Option<&str>) -> Result<(), ProviderError> {
    match status.map(str::to_ascii_lowercase).as_deref() {
        None | Some("ok") | Some("success") => Ok(()),
        Some("zero_results") | Some("not_found") => Err(ProviderError::Empty),
        Some(other) => Err(ProviderError::ApiStatus {
            status: other.to_string(),
            message: String::new(),
        }),
    }
}

impl OlaMaps {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            page_size,
        }
    }
}

fn geocode_candidates(
    response: GeocodeResponse,
    page_size: usize,
) -> Result<Vec<GeoPoint>, ProviderError> {
    check_status(response.status.as_deref())?;

    let candidates: Vec<GeoPoint> = response
        .geocoding_results
        .into_iter()
        .take(page_size)
        .map(|result| {
            let address = result.formatted_address.unwrap_or_default();
            let name = result
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| {
                    address
                        .split(',')
                        .next()
                        .unwrap_or_default()
                        .trim()
                        .to_string()
                });
            GeoPoint {
                id: result.place_id.unwrap_or_else(|| {
                    format!("{},{}", result.geometry.location.lat, result.geometry.location.lng)
                }),
                name,
                address,
                latitude: result.geometry.location.lat,
                longitude: result.geometry.location.lng,
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(candidates)
}

fn matrix_distance_km(response: MatrixResponse) -> Result<f64, ProviderError> {
    check_status(response.status.as_deref())?;

    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or(ProviderError::Empty)?;
    check_status(element.status.as_deref())?;

    metres_to_km(element.distance.as_ref().and_then(Distance::metres))
}

#[async_trait]
impl GeocodeSource for OlaMaps {
    fn name(&self) -> &'static str {
        "olamaps"
    }

    async fn attempt(&self, query: &str) -> Result<Vec<GeoPoint>, ProviderError> {
        let url = format!("{}/places/v1/geocode", self.base_url);
        let response: GeocodeResponse = get_json(
            &self.client,
            &url,
            &[("address", query), ("api_key", self.api_key.as_str())],
        )
        .await?;

        geocode_candidates(response, self.page_size)
    }
}

#[async_trait]
impl DistanceSource for OlaMaps {
    fn name(&self) -> &'static str {
        "olamaps"
    }

    async fn attempt(&self, start: &GeoPoint, end: &GeoPoint) -> Result<f64, ProviderError> {
        let url = format!("{}/routing/v1/distanceMatrix/basic", self.base_url);
        let origins = start.lat_lng();
        let destinations = end.lat_lng();
        let response: MatrixResponse = get_json(
            &self.client,
            &url,
            &[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("api_key", self.api_key.as_str()),
            ],
        )
        .await?;

        matrix_distance_km(response)
    }
}
