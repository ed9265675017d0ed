//! Application state for the ingest server

use crate::Config;
use crate::extraction::Extractor;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clones) and provides
/// access to the configuration and the extractor.
#[derive(Clone)]
pub struct AppState {
    /// Configuration, fixed for the lifetime of the server
    pub config: Arc<Config>,

    /// Extractor writing under the configured save directory
    pub extractor: Extractor,
}

impl AppState {
    /// Create a new AppState with a gzip extractor built from the config
    pub fn new(config: Arc<Config>) -> Self {
        let extractor = Extractor::from_config(&config.ingest);
        Self { config, extractor }
    }

    /// Create an AppState around an existing extractor
    pub fn with_extractor(config: Arc<Config>, extractor: Extractor) -> Self {
        Self { config, extractor }
    }
}
