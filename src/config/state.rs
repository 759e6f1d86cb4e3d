// Application state module
// Holds the loaded configuration and the injected store handle

use std::sync::Arc;

use super::types::Config;
use crate::store::UserRepository;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(config: Config, users: Arc<dyn UserRepository>) -> Self {
        Self { config, users }
    }
}
