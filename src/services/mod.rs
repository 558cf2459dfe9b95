//! Engine services

pub mod debounce;
pub mod geo;
pub mod route_sequencer;
pub mod routing;
pub mod schedule_resolver;
pub mod schedule_service;
pub mod segmentation;
pub mod slot_parser;
