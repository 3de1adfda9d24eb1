//! Marker persistence backends.

use super::{next_ordinal, Marker, MarkerStore};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// On-disk layout of the markers file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MarkerFile {
    markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// A spreadsheet-style row without an identifier.
#[derive(Debug, Deserialize)]
struct LegacyRow {
    #[serde(alias = "Label")]
    label: Option<String>,
    #[serde(alias = "Latitude", alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "Longitude", alias = "lon")]
    longitude: Option<f64>,
}

/// Markers persisted to a JSON file, written through on every change.
#[derive(Debug)]
pub struct JsonMarkerStore {
    path: PathBuf,
    markers: Vec<Marker>,
}

impl JsonMarkerStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// A legacy row export is rewritten in the current format right away so
    /// the identifiers assigned on import survive the next open.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (markers, imported) = Self::load_from_path(&path)?;
        let store = Self { path, markers };
        if imported {
            store.save()?;
            tracing::info!(count = store.markers.len(), "Migrated legacy marker rows");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the markers and whether they came from legacy rows.
    fn load_from_path(path: &Path) -> Result<(Vec<Marker>, bool)> {
        if !path.exists() {
            return Ok((Vec::new(), false));
        }

        let content = fs::read_to_string(path)?;
        let data: serde_json::Value = serde_json::from_str(&content)?;

        // Bare list of label/lat/lon rows exported from a spreadsheet
        if data.is_array() {
            let rows: Vec<LegacyRow> = serde_json::from_value(data)?;
            return Ok((Self::import_rows(rows), true));
        }

        let file: MarkerFile = serde_json::from_value(data)?;
        Ok((file.markers, false))
    }

    /// Assign identifiers to legacy rows, skipping rows without usable coordinates.
    fn import_rows(rows: Vec<LegacyRow>) -> Vec<Marker> {
        let mut markers = Vec::with_capacity(rows.len());

        for (idx, row) in rows.into_iter().enumerate() {
            let (Some(lat), Some(lon)) = (row.latitude, row.longitude) else {
                tracing::warn!(row = idx + 1, "Skipping marker row without coordinates");
                continue;
            };
            let label = row.label.unwrap_or_default();
            match Marker::new(&label, lat, lon, next_ordinal(&markers)) {
                Ok(marker) => markers.push(marker),
                Err(e) => tracing::warn!(row = idx + 1, "Skipping marker row: {}", e),
            }
        }

        markers
    }

    /// Write the current markers to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = MarkerFile {
            markers: self.markers.clone(),
            updated_at: Some(Utc::now()),
        };
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, content)?;

        tracing::debug!(path = %self.path.display(), count = self.markers.len(), "Saved markers");
        Ok(())
    }

    /// Reload the markers from disk.
    pub fn reload(&mut self) -> Result<()> {
        let (markers, imported) = Self::load_from_path(&self.path)?;
        self.markers = markers;
        if imported {
            self.save()?;
        }
        Ok(())
    }
}

impl MarkerStore for JsonMarkerStore {
    fn list(&self) -> Result<Vec<Marker>> {
        Ok(self.markers.clone())
    }

    fn append(&mut self, label: &str, latitude: f64, longitude: f64) -> Result<Marker> {
        let marker = Marker::new(label, latitude, longitude, next_ordinal(&self.markers))?;
        self.markers.push(marker.clone());

        if let Err(e) = self.save() {
            self.markers.pop();
            return Err(e);
        }

        tracing::info!(id = %marker.id, label = %marker.label, "Marker added");
        Ok(marker)
    }

    fn delete(&mut self, id: Uuid) -> Result<Marker> {
        let idx = self
            .markers
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MarkerNotFound(id.to_string()))?;

        let removed = self.markers.remove(idx);
        if let Err(e) = self.save() {
            self.markers.insert(idx, removed);
            return Err(e);
        }

        tracing::info!(id = %removed.id, label = %removed.label, "Marker removed");
        Ok(removed)
    }
}

/// Markers held in memory only.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    markers: Vec<Marker>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn list(&self) -> Result<Vec<Marker>> {
        Ok(self.markers.clone())
    }

    fn append(&mut self, label: &str, latitude: f64, longitude: f64) -> Result<Marker> {
        let marker = Marker::new(label, latitude, longitude, next_ordinal(&self.markers))?;
        self.markers.push(marker.clone());
        Ok(marker)
    }

    fn delete(&mut self, id: Uuid) -> Result<Marker> {
        let idx = self
            .markers
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MarkerNotFound(id.to_string()))?;
        Ok(self.markers.remove(idx))
    }
}
