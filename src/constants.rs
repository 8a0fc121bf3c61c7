// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Viewport
pub const MAP_CENTER_LAT: f64 = 27.33;
pub const MAP_CENTER_LNG: f64 = 88.5;
pub const OVERVIEW_ZOOM: u8 = 10;
pub const DETAIL_ZOOM: u8 = 13;
pub const SEARCH_ZOOM: u8 = 12;

// Hover popup sits above the marker pin
pub const HOVER_POPUP_OFFSET: (i32, i32) = (0, -30);

// Region the dataset is allowed to cover (Sikkim with a small margin)
pub const REGION_LAT_RANGE: (f64, f64) = (27.0, 28.2);
pub const REGION_LNG_RANGE: (f64, f64) = (88.0, 89.0);

// Outbound navigation
pub const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";
pub const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";
pub const MAPS_API_KEY_ENV: &str = "MAPS_API_KEY";

// Search
pub const MAX_SEARCH_RESULTS: usize = 5;

// View sessions
pub const MAX_SESSIONS: usize = 256;
pub const SESSION_IDLE_TTL_MINUTES: i64 = 30;

// User-facing text
pub const LOADING_MESSAGE: &str = "Loading Google Maps...";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading maps";
pub const SEARCH_PLACEHOLDER: &str = "Search places (Gangtok, Pelling...)";
pub const PANEL_TITLE: &str = "Monasteries — Sikkim";
pub const PANEL_TIP: &str = "Tip: Hover a marker for photo card, click for details & directions.";
