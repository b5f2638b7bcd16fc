use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::place::GeoPoint;
use crate::providers::{get_json, metres_to_km, DistanceSource, GeocodeSource, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Google Maps Platform web services: place autocomplete, place details and
/// the distance matrix. The primary stage of both chains.
#[derive(Clone)]
pub struct GoogleMaps {
    client: Client,
    base_url: String,
    api_key: String,
    country: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
struct StructuredFormatting {
    #[serde(default)]
    main_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    result: Option<PlaceDetails>,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
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
    status: String,
    #[serde(default)]
    error_message: Option<String>,
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
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: Option<f64>,
}

fn check_status(status: &str, error_message: Option<String>) -> Result<(), ProviderError> {
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(ProviderError::Empty),
        other => Err(ProviderError::ApiStatus {
            status: other.to_string(),
            message: error_message.unwrap_or_default(),
        }),
    }
}

impl GoogleMaps {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        country: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            country: country.into(),
            page_size,
        }
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<Prediction>, ProviderError> {
        let url = format!("{}/place/autocomplete/json", self.base_url);
        let components = format!("country:{}", self.country);
        let response: AutocompleteResponse = get_json(
            &self.client,
            &url,
            &[
                ("input", query),
                ("components", components.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .await?;

        check_status(&response.status, response.error_message)?;
        let mut predictions = response.predictions;
        predictions.truncate(self.page_size);
        Ok(predictions)
    }

    async fn details(&self, prediction: &Prediction) -> Result<GeoPoint, ProviderError> {
        let url = format!("{}/place/details/json", self.base_url);
        let response: DetailsResponse = get_json(
            &self.client,
            &url,
            &[
                ("place_id", prediction.place_id.as_str()),
                ("fields", "name,formatted_address,geometry"),
                ("key", self.api_key.as_str()),
            ],
        )
        .await?;

        check_status(&response.status, response.error_message)?;
        let details = response.result.ok_or(ProviderError::Empty)?;
        Ok(candidate(prediction, details))
    }
}

fn candidate(prediction: &Prediction, details: PlaceDetails) -> GeoPoint {
    let name = prediction
        .structured_formatting
        .as_ref()
        .and_then(|formatting| formatting.main_text.clone())
        .or(details.name)
        .unwrap_or_else(|| prediction.description.clone());

    GeoPoint {
        id: prediction.place_id.clone(),
        name,
        address: details
            .formatted_address
            .unwrap_or_else(|| prediction.description.clone()),
        latitude: details.geometry.location.lat,
        longitude: details.geometry.location.lng,
    }
}

fn matrix_distance_km(response: MatrixResponse) -> Result<f64, ProviderError> {
    check_status(&response.status, response.error_message)?;

    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or(ProviderError::Empty)?;

    if let Some(status) = element.status.as_deref() {
        check_status(status, None)?;
    }

    metres_to_km(element.distance.and_then(|distance| distance.value))
}

#[async_trait]
impl GeocodeSource for GoogleMaps {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn attempt(&self, query: &str) -> Result<Vec<GeoPoint>, ProviderError> {
        let predictions = self.autocomplete(query).await?;
        if predictions.is_empty() {
            return Err(ProviderError::Empty);
        }

        let lookups = predictions.iter().map(|prediction| self.details(prediction));
        let results = join_all(lookups).await;

        let candidates: Vec<GeoPoint> = results
            .into_iter()
            .zip(predictions.iter())
            .filter_map(|(result, prediction)| match result {
                Ok(point) => Some(point),
                Err(err) => {
                    warn!(place_id = %prediction.place_id, error = %err, "place details lookup failed");
                    None
                }
            })
            .collect();

        debug!(
            predictions = predictions.len(),
            candidates = candidates.len(),
            "google place search finished"
        );

        if candidates.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(candidates)
    }
}

#[async_trait]
impl DistanceSource for GoogleMaps {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn attempt(&self, start: &GeoPoint, end: &GeoPoint) -> Result<f64, ProviderError> {
        let url = format!("{}/distancematrix/json", self.base_url);
        let origins = start.lat_lng();
        let destinations = end.lat_lng();
        let response: MatrixResponse = get_json(
            &self.client,
            &url,
            &[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("mode", "driving"),
                ("key", self.api_key.as_str()),
            ],
        )
        .await?;

        matrix_distance_km(response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::providers::ProviderError;

    #[test]
    fn candidate_prefers_main_text_and_formatted_address() {
        let prediction: Prediction = serde_json::from_value(json!({
            "place_id": "ChIJ1",
            "description": "Kempegowda International Airport, Bengaluru, Karnataka, India",
            "structured_formatting": { "main_text": "Kempegowda International Airport" }
        }))
        .unwrap();
        let details: DetailsResponse = serde_json::from_value(json!({
            "status": "OK",
            "result": {
                "name": "BLR Airport",
                "formatted_address": "KIAL Rd, Devanahalli, Bengaluru, Karnataka 560300, India",
                "geometry": { "location": { "lat": 13.1986, "lng": 77.7066 } }
            }
        }))
        .unwrap();

        let point = candidate(&prediction, details.result.unwrap());
        assert_eq!(point.id, "ChIJ1");
        assert_eq!(point.name, "Kempegowda International Airport");
        assert!(point.address.starts_with("KIAL Rd"));
        assert_eq!(point.latitude, 13.1986);
        assert_eq!(point.longitude, 77.7066);
    }

    #[test]
    fn matrix_distance_is_converted_to_km() {
        let response: MatrixResponse = serde_json::from_value(json!({
            "status": "OK",
            "rows": [{ "elements": [{
                "status": "OK",
                "distance": { "text": "34.6 km", "value": 34_612 },
                "duration": { "text": "52 mins", "value": 3120 }
            }]}]
        }))
        .unwrap();

        let km = matrix_distance_km(response).unwrap();
        assert!((km - 34.612).abs() < 1e-9);
    }

    #[test]
    fn matrix_element_without_route_is_empty() {
        let response: MatrixResponse = serde_json::from_value(json!({
            "status": "OK",
            "rows": [{ "elements": [{ "status": "ZERO_RESULTS" }] }]
        }))
        .unwrap();

        assert!(matches!(matrix_distance_km(response), Err(ProviderError::Empty)));
    }

    #[test]
    fn denied_request_surfaces_provider_status() {
        let response: MatrixResponse = serde_json::from_value(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "rows": []
        }))
        .unwrap();

        match matrix_distance_km(response) {
            Err(ProviderError::ApiStatus { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    mod details_batch {
        use std::collections::HashMap;
        use std::time::Duration;

        use axum::extract::Query;
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Response};
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::{json, Value};

        use crate::providers::google::GoogleMaps;
        use crate::providers::{http_client, GeocodeSource, ProviderError};

        /// `input=broken` yields only place ids whose details lookups fail.
        async fn autocomplete(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
            let ids = if params.get("input").map(String::as_str) == Some("broken") {
                vec!["bad-1", "bad-2", "bad-3"]
            } else {
                vec!["hebbal", "bad-1", "yelahanka"]
            };
            let predictions: Vec<Value> = ids
                .into_iter()
                .map(|id| json!({ "place_id": id, "description": format!("{id}, Bengaluru") }))
                .collect();
            Json(json!({ "status": "OK", "predictions": predictions }))
        }

        async fn details(Query(params): Query<HashMap<String, String>>) -> Response {
            let place_id = params.get("place_id").cloned().unwrap_or_default();
            if place_id.starts_with("bad") {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            let lat = if place_id == "hebbal" { 13.0358 } else { 13.1007 };
            Json(json!({
                "status": "OK",
                "result": {
                    "name": place_id,
                    "geometry": { "location": { "lat": lat, "lng": 77.5963 } }
                }
            }))
            .into_response()
        }

        async fn maps_stub() -> String {
            let app = Router::new()
                .route("/place/autocomplete/json", get(autocomplete))
                .route("/place/details/json", get(details));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{addr}")
        }

        fn google(base_url: &str) -> GoogleMaps {
            let client = http_client(Duration::from_secs(5)).unwrap();
            GoogleMaps::new(client, base_url, "test-key", "in", 5)
        }

        #[tokio::test]
        async fn failed_details_drop_only_their_candidate() {
            let base_url = maps_stub().await;
            let points = GeocodeSource::attempt(&google(&base_url), "hebbal").await.unwrap();

            let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids, vec!["hebbal", "yelahanka"]);
            assert_eq!(points[0].latitude, 13.0358);
        }

        #[tokio::test]
        async fn every_details_failure_reports_empty() {
            let base_url = maps_stub().await;
            let result = GeocodeSource::attempt(&google(&base_url), "broken").await;

            assert!(matches!(result, Err(ProviderError::Empty)));
        }
    }
}
