use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use tracing::{debug, error, info, warn};

use super::events::{apply_event, EventEnvelope, ViewUpdate};
use super::session::{SessionError, SessionId, SessionRegistry};
use super::state::AppState;
use crate::catalog::{Coordinate, Location, LocationId};
use crate::constants::*;
use crate::html_template::{get_map_html, sdk_script_url, FrontendAsset};
use crate::map_view::frame::Frame;
use crate::map_view::{Place, PlaceSearch, ViewError};

#[derive(Debug, Serialize)]
pub struct MapConfig {
    pub script_url: String,
    pub libraries: Vec<String>,
    pub has_api_key: bool,
    pub center: Coordinate,
    pub overview_zoom: u8,
    pub detail_zoom: u8,
    pub search_zoom: u8,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: SessionId,
    pub frame: Frame,
}

fn view_error_status(err: &ViewError) -> StatusCode {
    match err {
        ViewError::Unavailable(_) => StatusCode::CONFLICT,
        ViewError::UnknownLocation(_) => StatusCode::NOT_FOUND,
    }
}

fn session_error_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Unknown(_) => StatusCode::NOT_FOUND,
        SessionError::Stale { .. } => StatusCode::CONFLICT,
    }
}

fn lock_sessions(state: &AppState) -> Result<MutexGuard<'_, SessionRegistry>, StatusCode> {
    state.sessions.lock().map_err(|_| {
        error!("session registry lock poisoned");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

fn embedded_asset(name: &str, content_type: &'static str) -> Result<Response, StatusCode> {
    let file = FrontendAsset::get(name).ok_or_else(|| {
        error!(asset = name, "embedded asset missing");
        StatusCode::NOT_FOUND
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        file.data.into_owned(),
    )
        .into_response())
}

// Page shell for every route in the site's route table
pub async fn index_html(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    get_map_html(&state.settings).ok_or_else(|| {
        error!("index.html missing from embedded frontend");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn style_css() -> Result<Response, StatusCode> {
    embedded_asset("style.css", "text/css")
}

pub async fn script_js() -> Result<Response, StatusCode> {
    embedded_asset("script.js", "application/javascript")
}

pub async fn get_locations(State(state): State<AppState>) -> Json<Vec<Location>> {
    Json(state.catalog.as_slice().to_vec())
}

pub async fn get_location(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<LocationId>,
) -> Result<Json<Location>, StatusCode> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_map_config(State(state): State<AppState>) -> Json<MapConfig> {
    Json(MapConfig {
        script_url: sdk_script_url(&state.settings),
        libraries: state.settings.maps.libraries.clone(),
        has_api_key: state.settings.maps.api_key.is_some(),
        center: Coordinate::new(MAP_CENTER_LAT, MAP_CENTER_LNG),
        overview_zoom: OVERVIEW_ZOOM,
        detail_zoom: DETAIL_ZOOM,
        search_zoom: SEARCH_ZOOM,
    })
}

pub async fn search_places(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Place>> {
    let places = state.places.search(&query.q);
    debug!(query = %query.q, hits = places.len(), "place search");
    Json(places)
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionCreated>, StatusCode> {
    let mut sessions = lock_sessions(&state)?;
    let (id, view) = sessions.create(state.catalog.clone(), Utc::now());
    let frame = view.frame();
    info!(session = id, open = sessions.len(), "map view session created");
    Ok(Json(SessionCreated { id, frame }))
}

pub async fn get_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<Json<Frame>, StatusCode> {
    let mut sessions = lock_sessions(&state)?;
    let view = sessions.get_mut(id, Utc::now()).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(view.frame()))
}

pub async fn post_event(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
    Json(EventEnvelope { seq, event }): Json<EventEnvelope>,
) -> Result<Json<ViewUpdate>, StatusCode> {
    let mut sessions = lock_sessions(&state)?;
    let view = sessions
        .ordered(id, seq, Utc::now())
        .map_err(|e| {
            debug!("dropping view event: {}", e);
            session_error_status(&e)
        })?;

    debug!(session = id, ?seq, ?event, "view event");
    apply_event(view, event, state.places.as_ref())
        .map(Json)
        .map_err(|e| {
            warn!(session = id, "rejected view event: {}", e);
            view_error_status(&e)
        })
}

pub async fn delete_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<StatusCode, StatusCode> {
    let mut sessions = lock_sessions(&state)?;
    if sessions.remove(id) {
        debug!(session = id, "map view session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
