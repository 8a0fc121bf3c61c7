use serde::{Deserialize, Serialize};

use crate::catalog::LocationId;
use crate::map_view::frame::{Frame, Navigation};
use crate::map_view::{
    CommandLog, MapView, Place, PlaceSearch, ResolvedPlaces, ViewResult, ViewportCommand,
};

// Browser -> server: one discrete UI event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    SdkLoaded,
    SdkFailed,
    PointerEnter { id: LocationId },
    PointerLeave { id: LocationId },
    MarkerClick { id: LocationId },
    CloseHover,
    CloseSelection,
    HoverPopupClick,
    Directions,
    ListSelect { id: LocationId },
    /// `places` carries the search box results when the SDK resolved the
    /// query itself; without them the server-side gazetteer is asked.
    PlacesChanged {
        #[serde(default)]
        query: String,
        #[serde(default)]
        places: Option<Vec<Place>>,
    },
}

// Request body for a session event; `seq` grows with every event the tab sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub event: ViewEvent,
}

// Server -> browser: what to draw, how to move the map, where to go
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewUpdate {
    pub frame: Frame,
    pub commands: Vec<ViewportCommand>,
    pub navigation: Option<Navigation>,
}

/// Runs one event through the view and collects everything the browser must apply.
pub fn apply_event(
    view: &mut MapView,
    event: ViewEvent,
    places: &impl PlaceSearch,
) -> ViewResult<ViewUpdate> {
    let mut log = CommandLog::new();
    let mut navigation = None;

    match event {
        ViewEvent::SdkLoaded => view.sdk_loaded(),
        ViewEvent::SdkFailed => view.sdk_failed(),
        ViewEvent::PointerEnter { id } => view.pointer_enter(id)?,
        ViewEvent::PointerLeave { id } => view.pointer_leave(id)?,
        ViewEvent::MarkerClick { id } => view.marker_click(id)?,
        ViewEvent::CloseHover => view.close_hover()?,
        ViewEvent::CloseSelection => view.close_selection()?,
        ViewEvent::HoverPopupClick => navigation = view.hover_popup_click()?,
        ViewEvent::Directions => navigation = view.directions()?,
        ViewEvent::ListSelect { id } => view.select_from_list(id, &mut log)?,
        ViewEvent::PlacesChanged {
            query,
            places: Some(resolved),
        } => {
            view.places_changed(&query, &ResolvedPlaces(resolved), &mut log)?;
        }
        ViewEvent::PlacesChanged { query, places: None } => {
            view.places_changed(&query, places, &mut log)?;
        }
    }

    Ok(ViewUpdate {
        frame: view.frame(),
        commands: log.into_commands(),
        navigation,
    })
}
