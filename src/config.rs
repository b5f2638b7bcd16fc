use std::env;

use crate::engine::geo_resolver;
use crate::error::AppError;
use crate::providers::{google, olamaps};

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub primary_maps_base_url: String,
    pub primary_maps_api_key: String,
    pub secondary_maps_base_url: String,
    pub secondary_maps_api_key: String,
    pub booking_api_base_url: String,
    pub place_country: String,
    pub place_search_min_length: usize,
    pub place_page_size: usize,
    pub place_cache_enabled: bool,
    pub place_cache_max_entries: usize,
    pub long_haul_threshold_km: f64,
    pub long_haul_fee: f64,
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            primary_maps_base_url: string_or_default(
                "PRIMARY_MAPS_BASE_URL",
                google::DEFAULT_BASE_URL,
            ),
            primary_maps_api_key: required("PRIMARY_MAPS_API_KEY")?,
            secondary_maps_base_url: string_or_default(
                "SECONDARY_MAPS_BASE_URL",
                olamaps::DEFAULT_BASE_URL,
            ),
            secondary_maps_api_key: required("SECONDARY_MAPS_API_KEY")?,
            booking_api_base_url: required("BOOKING_API_BASE_URL")?,
            place_country: string_or_default("PLACE_COUNTRY", "in"),
            place_search_min_length: parse_or_default("PLACE_SEARCH_MIN_LENGTH", 3)?,
            place_page_size: parse_or_default("PLACE_PAGE_SIZE", 5)?,
            place_cache_enabled: parse_or_default("PLACE_CACHE_ENABLED", false)?,
            place_cache_max_entries: parse_or_default(
                "PLACE_CACHE_MAX_ENTRIES",
                geo_resolver::DEFAULT_MEMO_CAPACITY,
            )?,
            long_haul_threshold_km: parse_or_default("LONG_HAUL_THRESHOLD_KM", 200.0)?,
            long_haul_fee: parse_or_default("LONG_HAUL_FEE", 300.0)?,
            provider_timeout_secs: parse_or_default("PROVIDER_TIMEOUT_SECS", 10)?,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Internal(format!("missing {key}")))
}

fn string_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset falls back to `default`; a set but unparsable value is a startup error.
fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    raw.trim()
        .parse()
        .map_err(|err| AppError::Internal(format!("{key}={raw:?} is not valid: {err}")))
}
