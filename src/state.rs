use std::sync::Arc;
use std::time::Duration;

use crate::backend::http::HttpBookingBackend;
use crate::backend::BookingBackend;
use crate::config::Config;
use crate::engine::bookings::BookingService;
use crate::engine::distance::DistanceResolver;
use crate::engine::fare::FareEngine;
use crate::engine::geo_resolver::GeoResolver;
use crate::error::AppError;
use crate::observability::metrics::Metrics;
use crate::providers::google::GoogleMaps;
use crate::providers::olamaps::OlaMaps;
use crate::providers::{http_client, DistanceSource, GeocodeSource};

pub struct AppState {
    pub places: GeoResolver,
    pub distances: DistanceResolver,
    pub fares: FareEngine,
    pub bookings: BookingService,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        geocoders: Vec<Box<dyn GeocodeSource>>,
        matrices: Vec<Box<dyn DistanceSource>>,
        fares: FareEngine,
        backend: Arc<dyn BookingBackend>,
    ) -> Self {
        let metrics = Metrics::new();

        Self {
            places: GeoResolver::new(geocoders, metrics.clone()),
            distances: DistanceResolver::new(matrices, metrics.clone()),
            fares,
            bookings: BookingService::new(backend, metrics.clone()),
            metrics,
        }
    }

    /// Wires the real providers: Google first, Ola Maps as fallback, for
    /// both place search and driving distance.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = http_client(Duration::from_secs(config.provider_timeout_secs))?;

        let google = GoogleMaps::new(
            client.clone(),
            &config.primary_maps_base_url,
            &config.primary_maps_api_key,
            &config.place_country,
            config.place_page_size,
        );
        let ola = OlaMaps::new(
            client.clone(),
            &config.secondary_maps_base_url,
            &config.secondary_maps_api_key,
            config.place_page_size,
        );
        let backend = HttpBookingBackend::new(client, &config.booking_api_base_url);

        let geocoders: Vec<Box<dyn GeocodeSource>> =
            vec![Box::new(google.clone()), Box::new(ola.clone())];
        let matrices: Vec<Box<dyn DistanceSource>> = vec![Box::new(google), Box::new(ola)];

        let state = Self::new(
            geocoders,
            matrices,
            FareEngine::new(config.long_haul_threshold_km, config.long_haul_fee),
            Arc::new(backend),
        )
        .with_place_search(
            config.place_search_min_length,
            config.place_page_size,
            config.place_cache_enabled.then_some(config.place_cache_max_entries),
        );

        Ok(state)
    }

    /// `memo_capacity` of `None` leaves the place memo off.
    pub fn with_place_search(
        mut self,
        min_length: usize,
        page_size: usize,
        memo_capacity: Option<usize>,
    ) -> Self {
        let mut places = self
            .places
            .with_min_length(min_length)
            .with_page_size(page_size);
        if let Some(capacity) = memo_capacity {
            places = places.with_memo(capacity);
        }
        self.places = places;
        self
    }
}
