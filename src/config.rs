//! Configuration management

use std::time::Duration;

use crate::services::schedule_resolver::ResolverPolicy;
use crate::services::segmentation::SegmentationConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Nominatim API URL (for geocoding)
    pub nominatim_url: String,

    /// ISO country-code filter for geocoding queries
    pub nominatim_country_codes: String,

    /// Valhalla routing engine URL (optional, falls back to offline estimates)
    pub valhalla_url: Option<String>,

    /// API key for hosted Valhalla instances
    pub valhalla_api_key: Option<String>,

    /// Whether festivos workers also cover Saturdays
    pub festivos_include_saturday: bool,

    /// Debounce delay for reactive recomputation, in milliseconds
    pub segment_debounce_ms: u64,

    /// Upper bound on the provider availability probe, in seconds
    pub provider_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nominatim_url = std::env::var("NOMINATIM_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let nominatim_country_codes =
            std::env::var("NOMINATIM_COUNTRY_CODES").unwrap_or_else(|_| "es".to_string());

        let valhalla_url = std::env::var("VALHALLA_URL").ok();
        let valhalla_api_key = std::env::var("VALHALLA_API_KEY").ok();

        let festivos_include_saturday = parse_bool_var("FESTIVOS_INCLUDE_SATURDAY", true);
        let segment_debounce_ms = parse_var("SEGMENT_DEBOUNCE_MS", 300);
        let provider_timeout_secs = parse_var("PROVIDER_TIMEOUT_SECS", 8);

        Self {
            nominatim_url,
            nominatim_country_codes,
            valhalla_url,
            valhalla_api_key,
            festivos_include_saturday,
            segment_debounce_ms,
            provider_timeout_secs,
        }
    }

    /// Calendar policy for the schedule resolver.
    pub fn resolver_policy(&self) -> ResolverPolicy {
        ResolverPolicy {
            festivos_include_saturday: self.festivos_include_saturday,
        }
    }

    /// Tuning for the travel segmentation engine. The origin point, when
    /// used, is per worker and set by the caller.
    pub fn segmentation(&self) -> SegmentationConfig {
        SegmentationConfig {
            debounce: Duration::from_millis(self.segment_debounce_ms),
            availability_timeout: Duration::from_secs(self.provider_timeout_secs),
            origin: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_bool_var(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
