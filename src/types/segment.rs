//! Travel segments and segmentation results.

use serde::{Deserialize, Serialize};

/// Travel mode passed through to the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Auto,
    Pedestrian,
    Bicycle,
}

impl TravelMode {
    /// Costing model name understood by the routing engine.
    pub const fn costing(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Pedestrian => "pedestrian",
            Self::Bicycle => "bicycle",
        }
    }
}

/// Travel time rounded up to whole minutes for billing.
pub fn billable_minutes(duration_seconds: u64) -> u32 {
    (duration_seconds as f64 / 60.0).ceil() as u32
}

/// Directed travel leg between two consecutive addressed stops.
///
/// A leg the provider could not estimate stays in the list with zeroed
/// measurements and `success = false`; the failure is reflected in the
/// cycle's confidence score, not raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub from_label: String,
    pub from_address: String,
    pub to_label: String,
    pub to_address: String,
    pub mode: TravelMode,
    pub duration_seconds: u64,
    pub distance_meters: u64,
    pub billable_minutes: u32,
    pub success: bool,
}

/// Aggregate reliability of a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Bucket the mean per-segment score (success = 3, failure = 1).
    pub fn from_mean_score(mean: f64) -> Self {
        if mean >= 2.5 {
            Self::High
        } else if mean >= 1.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// How a segmentation cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStatus {
    /// Every attempted leg produced an estimate.
    Complete,
    /// Some legs failed; reflected in the confidence score.
    Partial,
    /// No stop in the input carried a usable address.
    NoAddressedStops,
}

/// Result of one segmentation cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegmentation {
    pub segments: Vec<RouteSegment>,
    pub confidence: Confidence,
    pub status: SegmentationStatus,
    /// Sum of billable minutes over successful segments.
    pub total_billable_minutes: u32,
    /// Sum of distances over successful segments, in meters.
    pub total_distance_meters: u64,
    /// Stops excluded from segmentation for lack of an address.
    pub skipped_without_address: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billable_minutes_rounds_up() {
        assert_eq!(billable_minutes(125), 3);
        assert_eq!(billable_minutes(120), 2);
        assert_eq!(billable_minutes(1), 1);
        assert_eq!(billable_minutes(0), 0);
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(Confidence::from_mean_score(3.0), Confidence::High);
        assert_eq!(Confidence::from_mean_score(2.5), Confidence::High);
        assert_eq!(Confidence::from_mean_score(2.33), Confidence::Medium);
        assert_eq!(Confidence::from_mean_score(1.5), Confidence::Medium);
        assert_eq!(Confidence::from_mean_score(1.0), Confidence::Low);
    }

    #[test]
    fn test_travel_mode_costing() {
        assert_eq!(TravelMode::Auto.costing(), "auto");
        assert_eq!(TravelMode::Pedestrian.costing(), "pedestrian");
        assert_eq!(TravelMode::Bicycle.costing(), "bicycle");
    }

    #[test]
    fn test_segmentation_serializes_camel_case() {
        let result = RouteSegmentation {
            segments: vec![],
            confidence: Confidence::Low,
            status: SegmentationStatus::NoAddressedStops,
            total_billable_minutes: 0,
            total_distance_meters: 0,
            skipped_without_address: 2,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"confidence\":\"low\""));
        assert!(json.contains("\"status\":\"no_addressed_stops\""));
        assert!(json.contains("\"skippedWithoutAddress\":2"));
    }
}
