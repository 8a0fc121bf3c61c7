use serde::{Deserialize, Serialize};

use crate::catalog::Coordinate;

/// Live map surface. Commands are applied in call order; the last one wins.
pub trait Viewport {
    fn pan_to(&mut self, coordinate: Coordinate);
    fn set_zoom(&mut self, level: u8);
}

/// A named place returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coordinate: Coordinate,
}

/// Place lookup behind the search box.
pub trait PlaceSearch {
    fn search(&self, query: &str) -> Vec<Place>;
}

/// Results the SDK search box already resolved in the browser, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPlaces(pub Vec<Place>);

impl PlaceSearch for ResolvedPlaces {
    // The query was answered by the SDK; only its results matter here
    fn search(&self, _query: &str) -> Vec<Place> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewportCommand {
    PanTo { lat: f64, lng: f64 },
    SetZoom { level: u8 },
}

// Records commands so they can be shipped to the browser and replayed there
#[derive(Debug, Default, Clone)]
pub struct CommandLog {
    commands: Vec<ViewportCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn commands(&self) -> &[ViewportCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<ViewportCommand> {
        self.commands
    }
}

impl Viewport for CommandLog {
    fn pan_to(&mut self, coordinate: Coordinate) {
        self.commands.push(ViewportCommand::PanTo {
            lat: coordinate.lat,
            lng: coordinate.lng,
        });
    }

    fn set_zoom(&mut self, level: u8) {
        self.commands.push(ViewportCommand::SetZoom { level });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_log_keeps_issue_order() {
        let mut log = CommandLog::new();
        log.set_zoom(10);
        log.pan_to(Coordinate::new(27.3, 88.6));
        log.set_zoom(13);
        assert_eq!(
            log.into_commands(),
            vec![
                ViewportCommand::SetZoom { level: 10 },
                ViewportCommand::PanTo { lat: 27.3, lng: 88.6 },
                ViewportCommand::SetZoom { level: 13 },
            ]
        );
    }

    #[test]
    fn resolved_places_ignore_the_query() {
        let resolved = ResolvedPlaces(vec![Place {
            name: "Yuksom".to_string(),
            coordinate: Coordinate::new(27.3717, 88.2236),
        }]);
        assert_eq!(resolved.search("anything")[0].name, "Yuksom");
        assert!(ResolvedPlaces::default().search("Yuksom").is_empty());
    }

    #[test]
    fn commands_serialize_with_type_tag() {
        let json = serde_json::to_value(ViewportCommand::SetZoom { level: 12 }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "set_zoom", "level": 12 }));
    }
}
