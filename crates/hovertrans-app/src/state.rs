use std::sync::Arc;

use hovertrans_config::Config;
use tokio::sync::RwLock;

/// Shared configuration store, read by the request worker on every call
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }
}
