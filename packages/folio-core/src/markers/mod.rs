//! Labelled map markers with stable identifiers.

mod store;

pub use store::{JsonMarkerStore, MemoryMarkerStore};

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved map location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    /// Stable identifier used for deletion
    pub id: Uuid,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl Marker {
    /// Create a marker with a fresh identifier.
    ///
    /// A blank label is replaced with `Marker {ordinal}`.
    pub fn new(label: &str, latitude: f64, longitude: f64, ordinal: usize) -> Result<Self> {
        validate_coordinates(latitude, longitude)?;

        let label = label.trim();
        let label = if label.is_empty() {
            format!("Marker {}", ordinal)
        } else {
            label.to_string()
        };

        Ok(Self {
            id: Uuid::new_v4(),
            label,
            latitude,
            longitude,
            created_at: Utc::now(),
        })
    }
}

/// Check that a coordinate pair is on the globe.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::InvalidInput(format!("latitude out of range: {}", latitude)));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::InvalidInput(format!(
            "longitude out of range: {}",
            longitude
        )));
    }
    Ok(())
}

/// Ordinal for the next default `Marker N` label.
///
/// Never reuses a number already taken by an existing default label, so
/// labels stay unique after deletions.
pub fn next_ordinal(markers: &[Marker]) -> usize {
    let highest = markers
        .iter()
        .filter_map(|m| m.label.strip_prefix("Marker "))
        .filter_map(|n| n.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    markers.len().max(highest) + 1
}

/// Persistence for markers.
pub trait MarkerStore {
    /// All markers in insertion order.
    fn list(&self) -> Result<Vec<Marker>>;

    /// Append a new marker and return it.
    fn append(&mut self, label: &str, latitude: f64, longitude: f64) -> Result<Marker>;

    /// Delete a marker by identifier.
    fn delete(&mut self, id: Uuid) -> Result<Marker>;

    fn get(&self, id: Uuid) -> Result<Option<Marker>> {
        Ok(self.list()?.into_iter().find(|m| m.id == id))
    }

    /// First marker whose label matches exactly.
    fn find_by_label(&self, label: &str) -> Result<Option<Marker>> {
        Ok(self.list()?.into_iter().find(|m| m.label == label))
    }
}
