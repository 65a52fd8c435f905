use std::sync::Arc;

use crate::map::SharedMapContext;
use crate::settings::Settings;

// Application state for sharing the map scene and settings
#[derive(Clone)]
pub struct AppState {
    pub map: SharedMapContext,
    pub settings: Arc<Settings>,
}
