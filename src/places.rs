use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::catalog::{Catalog, Coordinate, DataAsset};
use crate::constants::MAX_SEARCH_RESULTS;
use crate::map_view::{Place, PlaceSearch};

const PLACES_FILE: &str = "places.json";

#[derive(Debug, Clone, Deserialize)]
struct PlaceRecord {
    name: String,
    lat: f64,
    lng: f64,
}

/// Forward geocoder over the bundled list of Sikkim places.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: Vec<Place>,
}

impl Gazetteer {
    pub fn embedded() -> Result<Self> {
        let file = DataAsset::get(PLACES_FILE)
            .with_context(|| format!("Embedded gazetteer '{}' is missing", PLACES_FILE))?;
        let records: Vec<PlaceRecord> =
            serde_json::from_slice(&file.data).context("Failed to parse gazetteer")?;

        let places = records
            .into_iter()
            .map(|r| Place {
                name: r.name,
                coordinate: Coordinate::new(r.lat, r.lng),
            })
            .collect::<Vec<_>>();

        info!(places = places.len(), "gazetteer loaded");
        Ok(Self { places })
    }

    #[cfg(test)]
    pub fn from_places(places: Vec<Place>) -> Self {
        Self { places }
    }

    // Monasteries are searchable by name after the regular places
    pub fn with_catalog(mut self, catalog: &Catalog) -> Self {
        self.places.extend(catalog.iter().map(|location| Place {
            name: location.name.clone(),
            coordinate: location.coordinate(),
        }));
        self
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Exact,
    Prefix,
    Substring,
}

fn rank(name: &str, needle: &str) -> Option<MatchRank> {
    let name = name.to_lowercase();
    if name == needle {
        Some(MatchRank::Exact)
    } else if name.starts_with(needle) {
        Some(MatchRank::Prefix)
    } else if name.contains(needle) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

impl PlaceSearch for Gazetteer {
    fn search(&self, query: &str) -> Vec<Place> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(MatchRank, usize)> = self
            .places
            .iter()
            .enumerate()
            .filter_map(|(i, place)| rank(&place.name, &needle).map(|r| (r, i)))
            .collect();
        // Stable on index, so dataset order breaks ties
        hits.sort();

        hits.into_iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|(_, i)| self.places[i].clone())
            .collect()
    }
}
