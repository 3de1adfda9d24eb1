//! Route lookups between saved markers.
//!
//! - **geo**: haversine distance, polyline decoding
//! - **planner**: per-mode route planning over a directions provider
//! - **google**: directions response parsing and HTTP client

mod geo;
mod google;
mod planner;

pub use geo::{decode_polyline, haversine_km, LatLon, EARTH_RADIUS_KM};
#[cfg(feature = "http")]
pub use google::GoogleDirectionsClient;
pub use google::parse_directions_response;
pub use planner::{ModeResult, RoutePlan, RoutePlanner, DEFAULT_WALKING_LIMIT_KM};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the route is travelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which travel modes to look up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeSelection {
    #[default]
    Driving,
    Walking,
    Both,
}

impl ModeSelection {
    /// Modes in lookup order (walking before driving).
    pub fn modes(&self) -> &'static [TravelMode] {
        match self {
            ModeSelection::Driving => &[TravelMode::Driving],
            ModeSelection::Walking => &[TravelMode::Walking],
            ModeSelection::Both => &[TravelMode::Walking, TravelMode::Driving],
        }
    }
}

impl FromStr for ModeSelection {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(ModeSelection::Driving),
            "walking" | "walk" => Ok(ModeSelection::Walking),
            "both" | "all" => Ok(ModeSelection::Both),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown travel mode: {}",
                other
            ))),
        }
    }
}

/// A route returned by a directions provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    /// Provider-formatted duration, e.g. "4 hours 12 mins"
    pub duration_text: String,
    /// Provider-formatted distance, e.g. "325 km"
    pub distance_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u64>,
    /// Decoded overview path
    pub path: Vec<LatLon>,
}

/// Answer from a directions provider for one mode.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteLookup {
    Found(Route),
    NoRoute,
}

/// Per-mode result surfaced to the caller. None of these is an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteOutcome {
    Found(Route),
    /// The provider has no route for this mode
    NoRoute { message: String },
    /// Walking was not requested because the points are too far apart
    LimitExceeded { straight_line_km: f64, limit_km: f64 },
    /// The provider failed or is not configured
    Unavailable { message: String },
}

/// Source of directions between two points.
pub trait DirectionsProvider {
    fn directions(
        &self,
        origin: LatLon,
        destination: LatLon,
        mode: TravelMode,
    ) -> Result<RouteLookup>;
}
