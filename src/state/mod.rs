//! Application state shared with request handlers

pub mod config;

use crate::service::SpeechService;
use std::sync::Arc;

/// Handle given to every HTTP handler
///
/// Cloning is cheap; all clones point at the same service.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SpeechService>,
}

impl AppState {
    pub fn new(service: SpeechService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
