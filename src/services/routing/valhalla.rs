//! Valhalla routing engine client.
//!
//! Valhalla API documentation:
//! https://valhalla.github.io/valhalla/api/turn-by-turn/api-reference/

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Coordinates, TravelMode};

use super::{RoutingError, TravelEstimate, UnavailableKind};

/// Valhalla client configuration.
#[derive(Debug, Clone)]
pub struct ValhallaConfig {
    /// Base URL of the Valhalla server (e.g. "http://localhost:8002").
    pub base_url: String,
    /// API key for hosted instances; self-hosted servers need none.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl ValhallaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Valhalla routing client.
pub struct ValhallaClient {
    client: reqwest::Client,
    config: ValhallaConfig,
}

impl ValhallaClient {
    pub fn new(config: ValhallaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        match &self.config.api_key {
            Some(key) => format!("{}{}?api_key={}", self.config.base_url, path, key),
            None => format!("{}{}", self.config.base_url, path),
        }
    }

    /// Health probe, distinguishing the operator-actionable failure modes.
    pub async fn status(&self) -> Result<(), RoutingError> {
        let response = self
            .client
            .get(self.url("/status"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RoutingError::Unavailable(UnavailableKind::Timeout)
                } else {
                    RoutingError::Unavailable(UnavailableKind::Unreachable)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(RoutingError::Unavailable(UnavailableKind::MissingApiKey))
        } else {
            Err(RoutingError::Unavailable(UnavailableKind::Unreachable))
        }
    }

    fn build_route_request(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> RouteRequest {
        RouteRequest {
            locations: vec![
                Location {
                    lat: from.lat,
                    lon: from.lng,
                    // 500m snap radius – geocoded coordinates may sit on a
                    // building centroid rather than the road edge.
                    radius: Some(500),
                },
                Location {
                    lat: to.lat,
                    lon: to.lng,
                    radius: Some(500),
                },
            ],
            costing: mode.costing().to_string(),
            // We only need the summary, not turn-by-turn directions.
            directions_type: "none".to_string(),
            units: "kilometers".to_string(),
        }
    }

    /// Travel summary for a single leg.
    pub async fn route_summary(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<TravelEstimate, RoutingError> {
        let request = self.build_route_request(from, to, mode);

        debug!(
            "Requesting {} route from ({}, {}) to ({}, {})",
            mode.costing(),
            from.lat,
            from.lng,
            to.lat,
            to.lng
        );

        let response = self
            .client
            .post(self.url("/route"))
            .json(&request)
            .send()
            .await
            .map_err(|e| RoutingError::Provider(format!("route request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::Provider(format!(
                "Valhalla returned {}: {}",
                status, body
            )));
        }

        let parsed: RouteResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::Provider(format!("invalid route response: {}", e)))?;

        let summary = parsed.trip.summary;
        Ok(TravelEstimate {
            duration_seconds: summary.time.round() as u64,
            distance_meters: (summary.length * 1000.0).round() as u64,
        })
    }
}

// Valhalla API types

#[derive(Debug, Serialize)]
struct RouteRequest {
    locations: Vec<Location>,
    costing: String,
    directions_type: String,
    units: String,
}

#[derive(Debug, Serialize, Clone)]
struct Location {
    lat: f64,
    lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct Trip {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct Summary {
    /// Travel time in seconds.
    time: f64,
    /// Travel distance in kilometers (units = "kilometers").
    length: f64,
}
