//! Type definitions

pub mod assignment;
pub mod holiday;
pub mod segment;
pub mod slot;
pub mod stop;

pub use assignment::*;
pub use holiday::*;
pub use segment::*;
pub use slot::*;
pub use stop::*;

use serde::{Deserialize, Serialize};

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}
