use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::constants::{REGION_LAT_RANGE, REGION_LNG_RANGE};

// Bundled datasets (monasteries.json, places.json)
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct DataAsset;

pub const EMBEDDED_DATASET: &str = "monasteries.json";

pub type LocationId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn in_region(&self) -> bool {
        (REGION_LAT_RANGE.0..=REGION_LAT_RANGE.1).contains(&self.lat)
            && (REGION_LNG_RANGE.0..=REGION_LNG_RANGE.1).contains(&self.lng)
    }
}

// One monastery entry as stored in the bundled dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub district: String,
    pub sect: String,
    pub lat: f64,
    pub lng: f64,
    pub notes: String,
    pub photo: String,
    pub detail_page: String,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedded dataset '{0}' is missing")]
    MissingAsset(&'static str),

    #[error("dataset contains no locations")]
    Empty,

    #[error("duplicate location id {0}")]
    DuplicateId(LocationId),

    #[error("location {id} ({name}) at {lat},{lng} is outside the mapped region")]
    OutOfRegion {
        id: LocationId,
        name: String,
        lat: f64,
        lng: f64,
    },
}

/// Immutable collection of locations, loaded once at startup.
///
/// Cloning is cheap: all clones share the same validated slice, and there is
/// no way to add, change or remove a record after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    locations: Arc<[Location]>,
}

impl Catalog {
    /// Loads the dataset compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        let file = DataAsset::get(EMBEDDED_DATASET)
            .ok_or(CatalogError::MissingAsset(EMBEDDED_DATASET))?;
        Self::from_json(&file.data)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let locations: Vec<Location> = serde_json::from_slice(bytes)?;
        Self::from_locations(locations)
    }

    /// Validates ids and coordinates, keeping dataset order.
    pub fn from_locations(locations: Vec<Location>) -> Result<Self, CatalogError> {
        if locations.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(locations.len());
        for location in &locations {
            if !seen.insert(location.id) {
                return Err(CatalogError::DuplicateId(location.id));
            }
            let coordinate = location.coordinate();
            if !coordinate.is_valid() || !coordinate.in_region() {
                return Err(CatalogError::OutOfRegion {
                    id: location.id,
                    name: location.name.clone(),
                    lat: location.lat,
                    lng: location.lng,
                });
            }
        }

        Ok(Self {
            locations: locations.into(),
        })
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.locations.iter()
    }

    pub fn as_slice(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
