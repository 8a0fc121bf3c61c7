use std::sync::{Arc, Mutex};

use super::session::SessionRegistry;
use crate::catalog::Catalog;
use crate::places::Gazetteer;
use crate::settings::Settings;

// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub places: Arc<Gazetteer>,
    pub settings: Arc<Settings>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
}

impl AppState {
    pub fn new(catalog: Catalog, places: Gazetteer, settings: Settings) -> Self {
        Self {
            catalog,
            places: Arc::new(places),
            settings: Arc::new(settings),
            sessions: Arc::new(Mutex::new(SessionRegistry::default())),
        }
    }
}
