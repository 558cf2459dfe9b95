//! Geographic calculations backing the offline travel estimates.

use crate::types::{Coordinates, TravelMode};

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance coefficient (straight line to road)
const ROAD_COEFFICIENT: f64 = 1.3;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimate road distance from straight-line distance
pub fn road_distance_km(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from, to) * ROAD_COEFFICIENT
}

/// Typical speed for a travel mode, in km/h
pub fn mode_speed_kmh(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Auto => 40.0,
        TravelMode::Bicycle => 15.0,
        TravelMode::Pedestrian => 5.0,
    }
}

/// Estimate travel duration in seconds for a mode
pub fn travel_seconds(from: &Coordinates, to: &Coordinates, mode: TravelMode) -> u64 {
    let km = road_distance_km(from, to);
    (km / mode_speed_kmh(mode) * 3600.0).round() as u64
}
