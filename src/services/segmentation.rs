//! Travel segmentation engine.
//!
//! Stitches a day's ordered stops into travel legs and estimates each leg
//! through the routing provider, with memoization, debounced
//! recomputation, and tolerance for partial provider failures. Legs run
//! strictly between consecutive addressed stops — never a full pairwise
//! matrix, and never reordered.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::types::{
    billable_minutes, Confidence, Coordinates, RouteSegment, RouteSegmentation, RouteStop,
    SegmentationStatus, TravelMode,
};

use super::debounce::Debouncer;
use super::routing::{AddressQuery, RoutingError, RoutingProvider, UnavailableKind};

/// Fixed worker base prepended as a synthetic first leg when configured.
#[derive(Debug, Clone)]
pub struct OriginPoint {
    pub label: String,
    pub address: String,
    pub coordinates: Coordinates,
}

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Quiet period before a requested recomputation actually runs.
    pub debounce: Duration,
    /// Upper bound on the provider availability probe.
    pub availability_timeout: Duration,
    /// Optional worker base; adds a synthetic leg to the first stop.
    pub origin: Option<OriginPoint>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            availability_timeout: Duration::from_secs(8),
            origin: None,
        }
    }
}

/// Lifecycle of a computation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing computed since construction or the last `refresh()`.
    Idle,
    Loading,
    Success,
    PartialSuccess,
    Failed,
}

/// Hard failures of a segmentation cycle. Partial provider failures are
/// not errors — they lower the confidence score instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// Every attempted leg failed — distinct from "nothing scheduled".
    #[error("all {attempted} travel segments failed")]
    AllSegmentsFailed { attempted: usize },
    /// The provider is unusable as a whole; operator action required.
    #[error("routing provider unavailable: {0}")]
    ProviderUnavailable(UnavailableKind),
}

/// Snapshot published to reactive consumers after every state change.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub state: EngineState,
    pub result: Option<RouteSegmentation>,
    pub error: Option<SegmentationError>,
}

impl EngineSnapshot {
    fn idle() -> Self {
        Self {
            state: EngineState::Idle,
            result: None,
            error: None,
        }
    }
}

#[derive(Default)]
struct MemoState {
    last_hash: Option<u64>,
    cached: Option<RouteSegmentation>,
}

/// One leg endpoint: display data plus the geocoded position (when the
/// geocoder could place it).
struct Endpoint {
    label: String,
    address: String,
    coordinates: Option<Coordinates>,
}

/// Travel segmentation engine — one instance per consumer.
pub struct TravelSegmentEngine {
    provider: Arc<dyn RoutingProvider>,
    config: SegmentationConfig,
    /// Single in-flight guard: at most one active cycle per engine.
    run_lock: tokio::sync::Mutex<()>,
    memo: parking_lot::Mutex<MemoState>,
    state: parking_lot::Mutex<EngineState>,
    debouncer: Debouncer,
    snapshot_tx: watch::Sender<EngineSnapshot>,
}

impl TravelSegmentEngine {
    pub fn new(provider: Arc<dyn RoutingProvider>, config: SegmentationConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(EngineSnapshot::idle());
        let debouncer = Debouncer::new(config.debounce);
        Self {
            provider,
            config,
            run_lock: tokio::sync::Mutex::new(()),
            memo: parking_lot::Mutex::new(MemoState::default()),
            state: parking_lot::Mutex::new(EngineState::Idle),
            debouncer,
            snapshot_tx,
        }
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Observe state transitions and results without polling.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Drop the memoized cycle so the next computation runs in full.
    pub fn refresh(&self) {
        {
            let mut memo = self.memo.lock();
            memo.last_hash = None;
            memo.cached = None;
        }
        self.publish(EngineState::Idle, None, None);
    }

    /// Debounced recomputation for reactive consumers: rapid successive
    /// requests collapse into one cycle whose outcome lands in the
    /// snapshot channel. A request arriving while a cycle is in flight is
    /// queued behind it by the in-flight guard.
    pub fn request_recompute(self: Arc<Self>, stops: Vec<RouteStop>, mode: TravelMode) {
        let engine = Arc::clone(&self);
        self.debouncer.schedule(move || async move {
            if let Err(error) = engine.compute_segments(&stops, mode).await {
                warn!("Debounced segmentation cycle failed: {}", error);
            }
        });
    }

    /// Compute travel legs between consecutive addressed stops.
    pub async fn compute_segments(
        &self,
        stops: &[RouteStop],
        mode: TravelMode,
    ) -> Result<RouteSegmentation, SegmentationError> {
        let _in_flight = self.run_lock.lock().await;

        let addressed: Vec<&RouteStop> = stops.iter().filter(|stop| stop.has_address()).collect();
        let skipped = stops.len() - addressed.len();
        if skipped > 0 {
            debug!("Excluding {} stops without an address from segmentation", skipped);
        }

        if addressed.is_empty() {
            let result = RouteSegmentation {
                segments: Vec::new(),
                confidence: Confidence::Low,
                status: SegmentationStatus::NoAddressedStops,
                total_billable_minutes: 0,
                total_distance_meters: 0,
                skipped_without_address: skipped,
            };
            self.publish(EngineState::Failed, Some(result.clone()), None);
            return Ok(result);
        }

        let input_hash = self.hash_inputs(&addressed, mode);
        {
            let memo = self.memo.lock();
            if memo.last_hash == Some(input_hash) {
                if let Some(cached) = &memo.cached {
                    debug!("Segmentation inputs unchanged, serving memoized cycle");
                    return Ok(cached.clone());
                }
            }
        }

        self.publish(EngineState::Loading, None, None);

        if let Err(error) = self.probe_provider().await {
            self.publish(EngineState::Failed, None, Some(error.clone()));
            return Err(error);
        }

        // Geocode each addressed stop once, in sequence — the provider
        // applies its own rate limiting. A miss leaves the stop
        // coordinate-less and fails its adjacent legs softly.
        let mut endpoints = Vec::with_capacity(addressed.len() + 1);
        if let Some(origin) = &self.config.origin {
            endpoints.push(Endpoint {
                label: origin.label.clone(),
                address: origin.address.clone(),
                coordinates: Some(origin.coordinates),
            });
        }
        for stop in &addressed {
            let coordinates = match AddressQuery::from_stop(stop) {
                Some(query) => match self.provider.geocode(&query).await {
                    Ok(coordinates) => Some(coordinates),
                    Err(RoutingError::Unavailable(kind)) => {
                        let error = SegmentationError::ProviderUnavailable(kind);
                        self.publish(EngineState::Failed, None, Some(error.clone()));
                        return Err(error);
                    }
                    Err(error) => {
                        warn!("Geocoding failed for '{}': {}", stop.client_label, error);
                        None
                    }
                },
                None => None,
            };
            endpoints.push(Endpoint {
                label: stop.client_label.clone(),
                address: stop.address.clone().unwrap_or_default(),
                coordinates,
            });
        }

        let mut segments: Vec<RouteSegment> = Vec::new();
        let mut succeeded = 0usize;
        for pair in endpoints.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);

            let estimate = match (&from.coordinates, &to.coordinates) {
                (Some(origin), Some(destination)) => {
                    match self.provider.compute_travel(origin, destination, mode).await {
                        Ok(estimate) => Some(estimate),
                        Err(RoutingError::Unavailable(kind)) => {
                            let error = SegmentationError::ProviderUnavailable(kind);
                            self.publish(EngineState::Failed, None, Some(error.clone()));
                            return Err(error);
                        }
                        Err(error) => {
                            warn!(
                                "Travel estimate failed for '{}' -> '{}': {}",
                                from.label, to.label, error
                            );
                            None
                        }
                    }
                }
                _ => None,
            };

            let segment = match estimate {
                Some(estimate) => {
                    succeeded += 1;
                    RouteSegment {
                        from_label: from.label.clone(),
                        from_address: from.address.clone(),
                        to_label: to.label.clone(),
                        to_address: to.address.clone(),
                        mode,
                        duration_seconds: estimate.duration_seconds,
                        distance_meters: estimate.distance_meters,
                        billable_minutes: billable_minutes(estimate.duration_seconds),
                        success: true,
                    }
                }
                None => RouteSegment {
                    from_label: from.label.clone(),
                    from_address: from.address.clone(),
                    to_label: to.label.clone(),
                    to_address: to.address.clone(),
                    mode,
                    duration_seconds: 0,
                    distance_meters: 0,
                    billable_minutes: 0,
                    success: false,
                },
            };
            segments.push(segment);
        }

        let attempted = segments.len();
        if attempted > 0 && succeeded == 0 {
            let error = SegmentationError::AllSegmentsFailed { attempted };
            self.publish(EngineState::Failed, None, Some(error.clone()));
            return Err(error);
        }

        // Per-segment score: success = 3, failure = 1; the mean picks the
        // confidence bucket. A single-stop route has nothing to estimate
        // and nothing failed.
        let confidence = if attempted == 0 {
            Confidence::High
        } else {
            let score_sum = (3 * succeeded + (attempted - succeeded)) as f64;
            Confidence::from_mean_score(score_sum / attempted as f64)
        };
        let status = if succeeded == attempted {
            SegmentationStatus::Complete
        } else {
            SegmentationStatus::Partial
        };

        let total_billable_minutes = segments
            .iter()
            .filter(|segment| segment.success)
            .map(|segment| segment.billable_minutes)
            .sum();
        let total_distance_meters = segments
            .iter()
            .filter(|segment| segment.success)
            .map(|segment| segment.distance_meters)
            .sum();

        let result = RouteSegmentation {
            segments,
            confidence,
            status,
            total_billable_minutes,
            total_distance_meters,
            skipped_without_address: skipped,
        };

        // Only a successful cycle records the memo — a failure must not
        // suppress the retry that follows it.
        {
            let mut memo = self.memo.lock();
            memo.last_hash = Some(input_hash);
            memo.cached = Some(result.clone());
        }

        let state = match status {
            SegmentationStatus::Complete => EngineState::Success,
            _ => EngineState::PartialSuccess,
        };
        self.publish(state, Some(result.clone()), None);
        Ok(result)
    }

    fn publish(
        &self,
        state: EngineState,
        result: Option<RouteSegmentation>,
        error: Option<SegmentationError>,
    ) {
        *self.state.lock() = state;
        self.snapshot_tx.send_replace(EngineSnapshot { state, result, error });
    }

    async fn probe_provider(&self) -> Result<(), SegmentationError> {
        let probe = tokio::time::timeout(
            self.config.availability_timeout,
            self.provider.ensure_ready(),
        );
        match probe.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(RoutingError::Unavailable(kind))) => {
                Err(SegmentationError::ProviderUnavailable(kind))
            }
            Ok(Err(error)) => {
                warn!("Provider readiness probe failed: {}", error);
                Err(SegmentationError::ProviderUnavailable(UnavailableKind::Unreachable))
            }
            Err(_) => Err(SegmentationError::ProviderUnavailable(UnavailableKind::Timeout)),
        }
    }

    /// Hash the fields that determine a cycle's output: stop identity and
    /// address data, travel mode, and the configured origin.
    fn hash_inputs(&self, stops: &[&RouteStop], mode: TravelMode) -> u64 {
        let mut hasher = DefaultHasher::new();
        for stop in stops {
            stop.assignment_id.hash(&mut hasher);
            stop.date.hash(&mut hasher);
            stop.slot.hash(&mut hasher);
            stop.address.hash(&mut hasher);
            stop.postal_code.hash(&mut hasher);
            stop.city.hash(&mut hasher);
        }
        mode.hash(&mut hasher);
        if let Some(origin) = &self.config.origin {
            origin.label.hash(&mut hasher);
            origin.coordinates.lat.to_bits().hash(&mut hasher);
            origin.coordinates.lng.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}
