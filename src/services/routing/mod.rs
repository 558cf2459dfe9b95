//! Routing provider abstraction.
//!
//! Production routes through OSM services (Nominatim geocoding + Valhalla
//! travel times); tests and unconfigured deployments fall back to a
//! deterministic offline estimate.

pub mod nominatim;
mod valhalla;

pub use nominatim::{NominatimClient, NominatimConfig};
pub use valhalla::{ValhallaClient, ValhallaConfig};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::types::{Coordinates, RouteStop, TravelMode};

use super::geo;

/// Why the routing provider cannot be used at all. These need operator
/// action, unlike transient per-call failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableKind {
    /// Health probe did not answer within the availability bound.
    Timeout,
    /// Endpoint rejected or refused the connection.
    Unreachable,
    /// Hosted endpoint requires an API key that is missing or rejected.
    MissingApiKey,
}

impl std::fmt::Display for UnavailableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Timeout => "health probe timed out",
            Self::Unreachable => "endpoint unreachable",
            Self::MissingApiKey => "API key missing or rejected",
        };
        f.write_str(text)
    }
}

/// Errors from the routing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The address exists in our records but the geocoder cannot place it.
    #[error("address could not be resolved: {0}")]
    AddressNotFound(String),
    /// Transient per-call failure; callers degrade confidence instead of
    /// aborting.
    #[error("routing provider error: {0}")]
    Provider(String),
    /// The provider as a whole is unusable.
    #[error("routing provider unavailable: {0}")]
    Unavailable(UnavailableKind),
}

/// Address fields used for geocoding queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressQuery {
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

impl AddressQuery {
    /// Build from a stop. `None` when the stop carries no usable street.
    pub fn from_stop(stop: &RouteStop) -> Option<Self> {
        let street = stop.address.as_deref()?.trim();
        if street.is_empty() {
            return None;
        }
        Some(Self {
            street: street.to_string(),
            postal_code: stop.postal_code.clone().unwrap_or_default(),
            city: stop.city.clone().unwrap_or_default(),
        })
    }

    /// One-line form for queries, logs, and cache keys.
    pub fn display(&self) -> String {
        let mut parts = vec![self.street.as_str()];
        if !self.postal_code.is_empty() {
            parts.push(self.postal_code.as_str());
        }
        if !self.city.is_empty() {
            parts.push(self.city.as_str());
        }
        parts.join(", ")
    }
}

/// Travel estimate for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelEstimate {
    pub duration_seconds: u64,
    pub distance_meters: u64,
}

/// Routing provider trait (OSM stack, offline mock, etc.)
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Cheap health probe; called once per computation cycle under the
    /// engine's availability bound.
    async fn ensure_ready(&self) -> Result<(), RoutingError>;

    /// Geocode an address. `AddressNotFound` when there is no match.
    async fn geocode(&self, query: &AddressQuery) -> Result<Coordinates, RoutingError>;

    /// Travel estimate between two points.
    async fn compute_travel(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<TravelEstimate, RoutingError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Deterministic offline provider: address-hash geocoding and
/// haversine-based travel estimates. Used in tests and as the fallback
/// when no live routing endpoint is configured.
pub struct MockRoutingProvider;

impl MockRoutingProvider {
    pub fn new() -> Self {
        Self
    }

    /// Hash an address into stable coordinates inside the service region
    /// (Iberian interior, away from coastlines).
    fn hash_to_coordinates(query: &AddressQuery) -> Coordinates {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        let hash = hasher.finish();

        const LAT_MIN: f64 = 37.5;
        const LAT_MAX: f64 = 42.5;
        const LNG_MIN: f64 = -6.5;
        const LNG_MAX: f64 = -1.0;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lng_normalized = ((hash & 0xFFFF_FFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + lat_normalized * (LAT_MAX - LAT_MIN),
            lng: LNG_MIN + lng_normalized * (LNG_MAX - LNG_MIN),
        }
    }
}

impl Default for MockRoutingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoutingProvider for MockRoutingProvider {
    async fn ensure_ready(&self) -> Result<(), RoutingError> {
        Ok(())
    }

    async fn geocode(&self, query: &AddressQuery) -> Result<Coordinates, RoutingError> {
        Ok(Self::hash_to_coordinates(query))
    }

    async fn compute_travel(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<TravelEstimate, RoutingError> {
        Ok(TravelEstimate {
            duration_seconds: geo::travel_seconds(from, to, mode),
            distance_meters: (geo::road_distance_km(from, to) * 1000.0) as u64,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Production provider: Nominatim geocoding + Valhalla travel times, with
/// an in-memory geocode cache so repeated cycles over the same clients
/// do not re-query the geocoder.
pub struct OsmRoutingProvider {
    nominatim: NominatimClient,
    valhalla: ValhallaClient,
    geocode_cache: Mutex<HashMap<AddressQuery, Coordinates>>,
}

impl OsmRoutingProvider {
    pub fn new(nominatim: NominatimClient, valhalla: ValhallaClient) -> Self {
        Self {
            nominatim,
            valhalla,
            geocode_cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoutingProvider for OsmRoutingProvider {
    async fn ensure_ready(&self) -> Result<(), RoutingError> {
        self.valhalla.status().await
    }

    async fn geocode(&self, query: &AddressQuery) -> Result<Coordinates, RoutingError> {
        if let Some(coordinates) = self.geocode_cache.lock().get(query).copied() {
            return Ok(coordinates);
        }
        let coordinates = self.nominatim.geocode(query).await?;
        self.geocode_cache.lock().insert(query.clone(), coordinates);
        Ok(coordinates)
    }

    async fn compute_travel(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<TravelEstimate, RoutingError> {
        self.valhalla.route_summary(from, to, mode).await
    }

    fn name(&self) -> &str {
        "osm"
    }
}

/// Create the routing provider, probing Valhalla and falling back to
/// offline estimates when it is not configured or unreachable.
pub async fn create_provider_with_fallback(config: &Config) -> Arc<dyn RoutingProvider> {
    if let Some(valhalla_url) = &config.valhalla_url {
        let valhalla = ValhallaClient::new(ValhallaConfig {
            base_url: valhalla_url.clone(),
            api_key: config.valhalla_api_key.clone(),
            ..Default::default()
        });
        match valhalla.status().await {
            Ok(()) => {
                info!("Valhalla routing available at {}", valhalla_url);
                let nominatim = NominatimClient::new(NominatimConfig {
                    base_url: config.nominatim_url.clone(),
                    country_codes: config.nominatim_country_codes.clone(),
                    ..Default::default()
                });
                return Arc::new(OsmRoutingProvider::new(nominatim, valhalla));
            }
            Err(e) => {
                warn!(
                    "Valhalla not available at {}: {}. Falling back to offline estimates.",
                    valhalla_url, e
                );
            }
        }
    }

    info!("Using offline routing estimates (Valhalla not configured or unavailable)");
    Arc::new(MockRoutingProvider::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeSlot;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn query(street: &str) -> AddressQuery {
        AddressQuery {
            street: street.to_string(),
            postal_code: "28013".to_string(),
            city: "Madrid".to_string(),
        }
    }

    fn stop(address: Option<&str>) -> RouteStop {
        RouteStop {
            assignment_id: Uuid::nil(),
            client_label: "Rosa Gil".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            slot: TimeSlot::parse("9:00", "10:00").unwrap(),
            start_minutes: 540,
            address: address.map(str::to_string),
            postal_code: Some("28013".to_string()),
            city: Some("Madrid".to_string()),
            order: 1,
        }
    }

    #[test]
    fn test_address_query_from_stop() {
        let q = AddressQuery::from_stop(&stop(Some("  Calle Mayor 12 "))).unwrap();
        assert_eq!(q.street, "Calle Mayor 12");
        assert_eq!(q.display(), "Calle Mayor 12, 28013, Madrid");

        assert!(AddressQuery::from_stop(&stop(None)).is_none());
        assert!(AddressQuery::from_stop(&stop(Some("   "))).is_none());
    }

    #[test]
    fn test_address_query_display_skips_empty_parts() {
        let q = AddressQuery {
            street: "Calle Sol 4".to_string(),
            postal_code: String::new(),
            city: "Toledo".to_string(),
        };
        assert_eq!(q.display(), "Calle Sol 4, Toledo");
    }

    #[tokio::test]
    async fn test_mock_geocode_is_deterministic() {
        let provider = MockRoutingProvider::new();
        let a = provider.geocode(&query("Calle Mayor 12")).await.unwrap();
        let b = provider.geocode(&query("Calle Mayor 12")).await.unwrap();
        assert_eq!(a.lat, b.lat);
        assert_eq!(a.lng, b.lng);
    }

    #[tokio::test]
    async fn test_mock_geocode_differs_per_address() {
        let provider = MockRoutingProvider::new();
        let a = provider.geocode(&query("Calle Mayor 12")).await.unwrap();
        let b = provider.geocode(&query("Gran Via 44")).await.unwrap();
        assert!(a.lat != b.lat || a.lng != b.lng);
    }

    #[tokio::test]
    async fn test_mock_geocode_stays_in_region() {
        let provider = MockRoutingProvider::new();
        for street in ["Calle Uno 1", "Calle Dos 2", "Calle Tres 3", "Calle Cuatro 4"] {
            let coords = provider.geocode(&query(street)).await.unwrap();
            assert!(coords.lat >= 37.5 && coords.lat <= 42.5, "lat {}", coords.lat);
            assert!(coords.lng >= -6.5 && coords.lng <= -1.0, "lng {}", coords.lng);
        }
    }

    #[tokio::test]
    async fn test_mock_travel_modes_diverge() {
        let provider = MockRoutingProvider::new();
        let from = Coordinates { lat: 40.4168, lng: -3.7038 };
        let to = Coordinates { lat: 40.45, lng: -3.69 };

        let auto = provider.compute_travel(&from, &to, TravelMode::Auto).await.unwrap();
        let walk = provider.compute_travel(&from, &to, TravelMode::Pedestrian).await.unwrap();

        assert_eq!(auto.distance_meters, walk.distance_meters);
        assert!(auto.duration_seconds < walk.duration_seconds);
    }

    #[tokio::test]
    async fn test_mock_is_always_ready() {
        let provider = MockRoutingProvider::new();
        assert!(provider.ensure_ready().await.is_ok());
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn test_fallback_without_valhalla_url() {
        let config = Config {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            nominatim_country_codes: "es".to_string(),
            valhalla_url: None,
            valhalla_api_key: None,
            festivos_include_saturday: true,
            segment_debounce_ms: 300,
            provider_timeout_secs: 8,
        };
        let provider = create_provider_with_fallback(&config).await;
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn test_fallback_with_unreachable_valhalla() {
        let config = Config {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            nominatim_country_codes: "es".to_string(),
            valhalla_url: Some("http://127.0.0.1:1".to_string()),
            valhalla_api_key: None,
            festivos_include_saturday: true,
            segment_debounce_ms: 300,
            provider_timeout_secs: 8,
        };
        let provider = create_provider_with_fallback(&config).await;
        assert_eq!(provider.name(), "mock");
    }
}
