//! # Application State
//!
//! Shared by every handler through axum's `State` extractor. Cloning is
//! cheap: the pool and the config are reference counted.

use std::sync::Arc;

use medora_db::Database;

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
