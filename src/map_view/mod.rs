//! Interaction model for the monastery map.
//!
//! `MapView` owns the transient state of one rendered map: whether the
//! mapping SDK has loaded, which marker is hovered and which one is selected.
//! Hover and selection are independent; each is cleared only by its own
//! event. Anything that moves the map goes through a [`Viewport`], and place
//! lookups go through a [`PlaceSearch`], so the concrete SDK stays outside.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Coordinate, Location, LocationId};
use crate::constants::*;

pub mod frame;
pub mod viewport;

use frame::*;
pub use viewport::{CommandLog, Place, PlaceSearch, ResolvedPlaces, Viewport, ViewportCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SdkStatus {
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("map is not interactive while the SDK is {0:?}")]
    Unavailable(SdkStatus),

    #[error("unknown location id {0}")]
    UnknownLocation(LocationId),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// Builds the Google Maps routing link for a destination.
pub fn directions_url(destination: Coordinate) -> String {
    format!(
        "{}&destination={},{}",
        DIRECTIONS_BASE_URL, destination.lat, destination.lng
    )
}

#[derive(Debug, Clone)]
pub struct MapView {
    catalog: Catalog,
    status: SdkStatus,
    hovered: Option<LocationId>,
    selected: Option<LocationId>,
}

impl MapView {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            status: SdkStatus::Loading,
            hovered: None,
            selected: None,
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> SdkStatus {
        self.status
    }

    pub fn hovered(&self) -> Option<&Location> {
        self.hovered.and_then(|id| self.catalog.get(id))
    }

    pub fn selected(&self) -> Option<&Location> {
        self.selected.and_then(|id| self.catalog.get(id))
    }

    pub fn sdk_loaded(&mut self) {
        match self.status {
            SdkStatus::Loading => {
                info!(locations = self.catalog.len(), "map SDK loaded");
                self.status = SdkStatus::Loaded;
            }
            // A failed load is final for the session
            SdkStatus::Failed => warn!("ignoring SDK load report after failure"),
            SdkStatus::Loaded => {}
        }
    }

    pub fn sdk_failed(&mut self) {
        if self.status != SdkStatus::Failed {
            warn!("map SDK failed to load");
        }
        self.status = SdkStatus::Failed;
        self.hovered = None;
        self.selected = None;
    }

    fn ensure_ready(&self) -> ViewResult<()> {
        match self.status {
            SdkStatus::Loaded => Ok(()),
            other => Err(ViewError::Unavailable(other)),
        }
    }

    fn location(&self, id: LocationId) -> ViewResult<&Location> {
        self.catalog.get(id).ok_or(ViewError::UnknownLocation(id))
    }

    pub fn pointer_enter(&mut self, id: LocationId) -> ViewResult<()> {
        self.ensure_ready()?;
        self.location(id)?;
        self.hovered = Some(id);
        Ok(())
    }

    /// Clears hover only when `id` is still the hovered marker, so a late
    /// leave from a neighbouring marker cannot wipe a newer hover.
    pub fn pointer_leave(&mut self, id: LocationId) -> ViewResult<()> {
        self.ensure_ready()?;
        self.location(id)?;
        if self.hovered == Some(id) {
            self.hovered = None;
        } else {
            debug!(id, hovered = ?self.hovered, "stale pointer leave ignored");
        }
        Ok(())
    }

    pub fn marker_click(&mut self, id: LocationId) -> ViewResult<()> {
        self.ensure_ready()?;
        self.location(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn close_hover(&mut self) -> ViewResult<()> {
        self.ensure_ready()?;
        self.hovered = None;
        Ok(())
    }

    pub fn close_selection(&mut self) -> ViewResult<()> {
        self.ensure_ready()?;
        self.selected = None;
        Ok(())
    }

    /// Clicking the photo card opens the detail page in place.
    pub fn hover_popup_click(&self) -> ViewResult<Option<Navigation>> {
        self.ensure_ready()?;
        Ok(self.hovered().map(|location| Navigation {
            url: location.detail_page.clone(),
            target: NavigationTarget::Current,
        }))
    }

    pub fn directions(&self) -> ViewResult<Option<Navigation>> {
        self.ensure_ready()?;
        Ok(self.selected().map(|location| Navigation {
            url: directions_url(location.coordinate()),
            target: NavigationTarget::NewContext,
        }))
    }

    pub fn select_from_list(
        &mut self,
        id: LocationId,
        viewport: &mut impl Viewport,
    ) -> ViewResult<()> {
        self.ensure_ready()?;
        let coordinate = self.location(id)?.coordinate();
        self.selected = Some(id);
        viewport.pan_to(coordinate);
        viewport.set_zoom(DETAIL_ZOOM);
        Ok(())
    }

    /// Moves the map to the first search hit. Zero hits leave the map alone.
    pub fn places_changed(
        &mut self,
        query: &str,
        search: &impl PlaceSearch,
        viewport: &mut impl Viewport,
    ) -> ViewResult<Option<Place>> {
        self.ensure_ready()?;
        let first = search.search(query).into_iter().next();
        match &first {
            Some(place) => {
                debug!(query, place = %place.name, "search hit");
                viewport.pan_to(place.coordinate);
                viewport.set_zoom(SEARCH_ZOOM);
            }
            None => debug!(query, "search returned no places"),
        }
        Ok(first)
    }

    pub fn frame(&self) -> Frame {
        match self.status {
            SdkStatus::Loading => Frame::Loading {
                message: LOADING_MESSAGE.to_string(),
            },
            SdkStatus::Failed => Frame::Failed {
                message: LOAD_ERROR_MESSAGE.to_string(),
            },
            SdkStatus::Loaded => Frame::Ready(self.ready_frame()),
        }
    }

    fn ready_frame(&self) -> ReadyFrame {
        let markers = self
            .catalog
            .iter()
            .map(|location| MarkerView {
                id: location.id,
                position: location.coordinate(),
            })
            .collect();

        let list = self
            .catalog
            .iter()
            .map(|location| ListEntry {
                id: location.id,
                name: location.name.clone(),
                subtitle: format!("{} • {}", location.district, location.sect),
                selected: self.selected == Some(location.id),
            })
            .collect();

        let hover_popup = self.hovered().map(|location| HoverPopup {
            id: location.id,
            position: location.coordinate(),
            pixel_offset: PixelOffset {
                x: HOVER_POPUP_OFFSET.0,
                y: HOVER_POPUP_OFFSET.1,
            },
            name: location.name.clone(),
            photo: location.photo.clone(),
            href: location.detail_page.clone(),
        });

        let selection_popup = self.selected().map(|location| SelectionPopup {
            id: location.id,
            position: location.coordinate(),
            name: location.name.clone(),
            district: location.district.clone(),
            sect: location.sect.clone(),
            notes: location.notes.clone(),
            directions_url: directions_url(location.coordinate()),
        });

        ReadyFrame {
            title: PANEL_TITLE.to_string(),
            center: Coordinate::new(MAP_CENTER_LAT, MAP_CENTER_LNG),
            zoom: OVERVIEW_ZOOM,
            markers,
            list,
            search: SearchControl {
                placeholder: SEARCH_PLACEHOLDER.to_string(),
            },
            hover_popup,
            selection_popup,
            tip: PANEL_TIP.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;

    struct StubSearch(Vec<Place>);

    impl PlaceSearch for StubSearch {
        fn search(&self, _query: &str) -> Vec<Place> {
            self.0.clone()
        }
    }

    fn loaded_view() -> MapView {
        let mut view = MapView::new(sample_catalog());
        view.sdk_loaded();
        view
    }

    #[test]
    fn starts_with_loading_placeholder() {
        let view = MapView::new(sample_catalog());
        assert_eq!(
            view.frame(),
            Frame::Loading {
                message: LOADING_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn renders_one_marker_per_location_at_its_coordinate() {
        let catalog = sample_catalog();
        let view = loaded_view();
        let frame = view.frame();
        let ready = frame.ready().unwrap();
        assert_eq!(ready.markers.len(), catalog.len());
        for (marker, location) in ready.markers.iter().zip(catalog.iter()) {
            assert_eq!(marker.id, location.id);
            assert_eq!(marker.position, location.coordinate());
        }
        assert_eq!(ready.zoom, OVERVIEW_ZOOM);
    }

    #[test]
    fn stale_leave_does_not_clear_newer_hover() {
        let mut view = loaded_view();
        view.pointer_enter(1).unwrap();
        view.pointer_enter(2).unwrap();
        view.pointer_leave(1).unwrap();
        assert_eq!(view.hovered().map(|l| l.id), Some(2));

        view.pointer_leave(2).unwrap();
        assert!(view.hovered().is_none());
    }

    #[test]
    fn marker_click_keeps_hover() {
        let mut view = loaded_view();
        view.pointer_enter(1).unwrap();
        view.marker_click(3).unwrap();
        assert_eq!(view.hovered().map(|l| l.id), Some(1));
        assert_eq!(view.selected().map(|l| l.id), Some(3));
    }

    #[test]
    fn list_selection_pans_and_zooms_once() {
        let mut view = loaded_view();
        let mut log = CommandLog::new();
        view.select_from_list(2, &mut log).unwrap();

        assert_eq!(view.selected().map(|l| l.id), Some(2));
        assert_eq!(
            log.commands(),
            &[
                ViewportCommand::PanTo { lat: 27.3047, lng: 88.2522 },
                ViewportCommand::SetZoom { level: DETAIL_ZOOM },
            ]
        );
    }

    #[test]
    fn empty_search_leaves_viewport_alone() {
        let mut view = loaded_view();
        let mut log = CommandLog::new();
        let hit = view.places_changed("nowhere", &StubSearch(vec![]), &mut log).unwrap();
        assert!(hit.is_none());
        assert!(log.commands().is_empty());
    }

    #[test]
    fn search_pans_to_first_result_at_search_zoom() {
        let mut view = loaded_view();
        let mut log = CommandLog::new();
        let search = StubSearch(vec![
            Place {
                name: "Gangtok".to_string(),
                coordinate: Coordinate::new(27.3314, 88.6138),
            },
            Place {
                name: "Pelling".to_string(),
                coordinate: Coordinate::new(27.2996, 88.2337),
            },
        ]);
        view.places_changed("g", &search, &mut log).unwrap();

        assert_eq!(
            log.commands(),
            &[
                ViewportCommand::PanTo { lat: 27.3314, lng: 88.6138 },
                ViewportCommand::SetZoom { level: SEARCH_ZOOM },
            ]
        );
        assert!(SEARCH_ZOOM < DETAIL_ZOOM);
    }

    #[test]
    fn closing_one_popup_leaves_the_other() {
        let mut view = loaded_view();
        view.pointer_enter(1).unwrap();
        view.marker_click(2).unwrap();

        view.close_hover().unwrap();
        assert!(view.hovered().is_none());
        assert_eq!(view.selected().map(|l| l.id), Some(2));

        view.pointer_enter(3).unwrap();
        view.close_selection().unwrap();
        assert!(view.selected().is_none());
        assert_eq!(view.hovered().map(|l| l.id), Some(3));
    }

    #[test]
    fn popups_follow_state() {
        let mut view = loaded_view();
        view.pointer_enter(1).unwrap();
        view.marker_click(3).unwrap();

        let frame = view.frame();
        let ready = frame.ready().unwrap();
        let hover = ready.hover_popup.as_ref().unwrap();
        assert_eq!(hover.id, 1);
        assert_eq!(hover.pixel_offset, PixelOffset { x: 0, y: -30 });
        let selection = ready.selection_popup.as_ref().unwrap();
        assert_eq!(selection.id, 3);
        assert_eq!(
            selection.directions_url,
            "https://www.google.com/maps/dir/?api=1&destination=27.3363,88.6189"
        );
        assert!(ready.list.iter().any(|e| e.id == 3 && e.selected));
        assert_eq!(ready.list[0].subtitle, "Gangtok • Nyingma");
    }

    #[test]
    fn navigations_target_the_right_context() {
        let mut view = loaded_view();
        assert_eq!(view.hover_popup_click().unwrap(), None);
        assert_eq!(view.directions().unwrap(), None);

        view.pointer_enter(1).unwrap();
        view.marker_click(2).unwrap();
        assert_eq!(
            view.hover_popup_click().unwrap(),
            Some(Navigation {
                url: "/destinations#1".to_string(),
                target: NavigationTarget::Current,
            })
        );
        let directions = view.directions().unwrap().unwrap();
        assert_eq!(directions.target, NavigationTarget::NewContext);
        assert!(directions.url.ends_with("destination=27.3047,88.2522"));
    }

    #[test]
    fn load_failure_is_terminal() {
        let mut view = MapView::new(sample_catalog());
        view.sdk_failed();
        view.sdk_loaded();

        assert_eq!(view.status(), SdkStatus::Failed);
        assert_eq!(
            view.frame(),
            Frame::Failed {
                message: LOAD_ERROR_MESSAGE.to_string()
            }
        );
        assert_eq!(
            view.pointer_enter(1),
            Err(ViewError::Unavailable(SdkStatus::Failed))
        );
        let mut log = CommandLog::new();
        assert!(view.select_from_list(1, &mut log).is_err());
        assert!(log.commands().is_empty());
    }

    #[test]
    fn failure_after_load_clears_state_and_sticks() {
        let mut view = loaded_view();
        view.pointer_enter(1).unwrap();
        view.marker_click(2).unwrap();

        view.sdk_failed();
        assert_eq!(view.status(), SdkStatus::Failed);
        assert!(view.hovered().is_none());
        assert!(view.selected().is_none());
        assert_eq!(
            view.frame(),
            Frame::Failed {
                message: LOAD_ERROR_MESSAGE.to_string()
            }
        );

        // A late load callback does not bring the map back
        view.sdk_loaded();
        assert_eq!(view.status(), SdkStatus::Failed);
        assert!(view.frame().ready().is_none());
        assert_eq!(
            view.pointer_enter(1),
            Err(ViewError::Unavailable(SdkStatus::Failed))
        );
    }

    #[test]
    fn events_before_load_are_rejected() {
        let mut view = MapView::new(sample_catalog());
        assert_eq!(
            view.marker_click(1),
            Err(ViewError::Unavailable(SdkStatus::Loading))
        );
    }

    #[test]
    fn unknown_ids_are_rejected_without_state_change() {
        let mut view = loaded_view();
        view.pointer_enter(1).unwrap();
        assert_eq!(view.pointer_enter(99), Err(ViewError::UnknownLocation(99)));
        assert_eq!(view.hovered().map(|l| l.id), Some(1));
    }
}
