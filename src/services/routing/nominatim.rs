//! Nominatim geocoding client.
//!
//! Wraps the HTTP call with the protections a shared Nominatim instance
//! demands: a minimum interval between requests and a circuit breaker
//! that stops hammering a failing endpoint.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::warn;

use crate::types::Coordinates;

use super::{AddressQuery, RoutingError};

/// Nominatim client configuration.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// ISO country-code filter (e.g. "es"); empty disables the filter.
    pub country_codes: String,
    /// Minimum interval between requests — the public instance allows one
    /// request per second.
    pub min_interval: Duration,
    /// Consecutive failures before the breaker opens.
    pub breaker_threshold: u32,
    /// How long the breaker stays open before allowing a retry.
    pub breaker_recovery: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "es".to_string(),
            min_interval: Duration::from_millis(1500),
            breaker_threshold: 3,
            breaker_recovery: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Enforces a minimum gap between calls.
struct IntervalLimiter {
    last_call: tokio::sync::Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl IntervalLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_call: tokio::sync::Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until it is safe to make another call.
    async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                drop(last);
                tokio::time::sleep(wait_time).await;
                last = self.last_call.lock().await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Opens after a run of consecutive failures; closes again once the
/// recovery window has passed (half-open retry).
struct FailureBreaker {
    failures: AtomicU32,
    threshold: u32,
    last_failure: parking_lot::Mutex<Option<Instant>>,
    recovery: Duration,
}

impl FailureBreaker {
    fn new(threshold: u32, recovery: Duration) -> Self {
        Self {
            failures: AtomicU32::new(0),
            threshold,
            last_failure: parking_lot::Mutex::new(None),
            recovery,
        }
    }

    fn is_open(&self) -> bool {
        if self.failures.load(Ordering::Relaxed) < self.threshold {
            return false;
        }
        match *self.last_failure.lock() {
            Some(last) => last.elapsed() < self.recovery,
            None => false,
        }
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        *self.last_failure.lock() = Some(Instant::now());
    }

    fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }
}

/// Rate-limited Nominatim geocoder.
pub struct NominatimClient {
    client: reqwest::Client,
    config: NominatimConfig,
    limiter: IntervalLimiter,
    breaker: FailureBreaker,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("aliada-engine/0.3 (https://aliada.example)")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let limiter = IntervalLimiter::new(config.min_interval);
        let breaker = FailureBreaker::new(config.breaker_threshold, config.breaker_recovery);
        Self {
            client,
            config,
            limiter,
            breaker,
        }
    }

    fn search_url(&self, query: &AddressQuery) -> String {
        let mut url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.config.base_url,
            urlencoding::encode(&query.display())
        );
        if !self.config.country_codes.is_empty() {
            url.push_str("&countrycodes=");
            url.push_str(&self.config.country_codes);
        }
        url
    }

    /// Geocode an address query.
    ///
    /// `AddressNotFound` when Nominatim has no match; transport and server
    /// problems come back as `Provider` errors and count against the
    /// circuit breaker.
    pub async fn geocode(&self, query: &AddressQuery) -> Result<Coordinates, RoutingError> {
        if self.breaker.is_open() {
            warn!("Geocoding circuit breaker open, rejecting request");
            return Err(RoutingError::Provider(
                "geocoding circuit breaker open".to_string(),
            ));
        }

        self.limiter.wait().await;

        let response = match self.client.get(self.search_url(query)).send().await {
            Ok(response) => response,
            Err(e) => {
                self.breaker.record_failure();
                return Err(RoutingError::Provider(format!(
                    "geocoding request failed: {}",
                    e
                )));
            }
        };

        if !response.status().is_success() {
            self.breaker.record_failure();
            return Err(RoutingError::Provider(format!(
                "geocoder returned {}",
                response.status()
            )));
        }

        let results: Vec<SearchResult> = match response.json().await {
            Ok(results) => results,
            Err(e) => {
                self.breaker.record_failure();
                return Err(RoutingError::Provider(format!(
                    "invalid geocoder response: {}",
                    e
                )));
            }
        };

        // An empty result set is an answer, not a service failure.
        self.breaker.record_success();

        let Some(hit) = results.first() else {
            return Err(RoutingError::AddressNotFound(query.display()));
        };
        let lat: f64 = hit
            .lat
            .parse()
            .map_err(|_| RoutingError::Provider("invalid latitude in geocoder response".to_string()))?;
        let lng: f64 = hit
            .lon
            .parse()
            .map_err(|_| RoutingError::Provider("invalid longitude in geocoder response".to_string()))?;

        Ok(Coordinates { lat, lng })
    }
}
