//! Application state shared by every handler.

use std::sync::Arc;
use std::time::SystemTime;

use crate::config::Config;
use crate::data_loader::TableLoader;
use crate::error::Result;

/// The main application state shared across all handlers
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Produces a table per request
    pub loader: TableLoader,
    /// When the server was started
    pub started_at: SystemTime,
}

impl AppState {
    /// Create a new AppState, building the loader from the data configuration
    pub fn new(config: Config) -> Result<Self> {
        let loader = TableLoader::new(&config.data)?;
        Ok(Self {
            config,
            loader,
            started_at: SystemTime::now(),
        })
    }

    /// Create a new AppState wrapped in an Arc for shared ownership
    pub fn new_shared(config: Config) -> Result<Arc<Self>> {
        Self::new(config).map(Arc::new)
    }
}
