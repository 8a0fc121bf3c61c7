use serde::Serialize;

use crate::catalog::{Coordinate, LocationId};

/// What the browser should show for a map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Frame {
    Loading { message: String },
    Failed { message: String },
    Ready(ReadyFrame),
}

impl Frame {
    #[cfg(test)]
    pub fn ready(&self) -> Option<&ReadyFrame> {
        match self {
            Frame::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyFrame {
    pub title: String,
    pub center: Coordinate,
    pub zoom: u8,
    pub markers: Vec<MarkerView>,
    pub list: Vec<ListEntry>,
    pub search: SearchControl,
    pub hover_popup: Option<HoverPopup>,
    pub selection_popup: Option<SelectionPopup>,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: LocationId,
    pub position: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub id: LocationId,
    pub name: String,
    pub subtitle: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchControl {
    pub placeholder: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelOffset {
    pub x: i32,
    pub y: i32,
}

/// Lightweight photo card shown while a marker is hovered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverPopup {
    pub id: LocationId,
    pub position: Coordinate,
    pub pixel_offset: PixelOffset,
    pub name: String,
    pub photo: String,
    pub href: String,
}

/// Detail card for the clicked marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionPopup {
    pub id: LocationId,
    pub position: Coordinate,
    pub name: String,
    pub district: String,
    pub sect: String,
    pub notes: String,
    pub directions_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    /// Replace the current page
    Current,
    /// Open a new tab or window
    NewContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub url: String,
    pub target: NavigationTarget,
}
