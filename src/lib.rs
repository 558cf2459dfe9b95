//! Aliada engine — schedule resolution and route segmentation for
//! home-care rounds.
//!
//! Given a worker's recurring assignments and the holiday calendar, the
//! engine resolves which time slots are active on any concrete date,
//! stitches the resolved slots into chronologically ordered stops, and
//! estimates the travel legs between consecutive addressed stops through
//! an external routing provider — with memoization, debounced
//! recomputation, and tolerance for partial provider failures.
//!
//! Persistence and UI stay outside: the portal's data layer implements
//! [`ScheduleStore`], and views consume the resolved stops and
//! [`services::segmentation::TravelSegmentEngine`] snapshots.

pub mod config;
pub mod services;
pub mod store;
pub mod types;

pub use config::Config;
pub use services::route_sequencer::{
    build_stops, group_by_day, group_by_week, is_active_in_range, DateRange,
};
pub use services::routing::{
    create_provider_with_fallback, MockRoutingProvider, RoutingError, RoutingProvider,
    UnavailableKind,
};
pub use services::schedule_resolver::{resolve_slots_for_date, ResolverPolicy};
pub use services::schedule_service::ScheduleService;
pub use services::segmentation::{
    EngineSnapshot, EngineState, OriginPoint, SegmentationConfig, SegmentationError,
    TravelSegmentEngine,
};
pub use services::slot_parser::parse_slots;
pub use store::{InMemoryScheduleStore, ScheduleStore};
