//! Shared handler state.

use filebox_core::Config;
use filebox_services::FileService;
use std::sync::Arc;

pub struct AppState {
    pub service: Arc<FileService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: FileService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }
}
