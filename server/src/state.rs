//! Application state for the food classification server
//!
//! Holds the server configuration and the immutable service context.

use std::sync::Arc;
use std::time::Instant;

use food_vision::{AssetPaths, ServiceContext};
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Verbose logging
    pub debug: bool,
    /// Maximum request body size in bytes
    pub body_limit_bytes: usize,
    /// Startup assets
    pub assets: AssetPaths,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            debug: false,
            body_limit_bytes: 16 * 1024 * 1024,
            assets: AssetPaths::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Classifier and lookup tables, loaded once
    pub context: ServiceContext,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, context: ServiceContext) -> Self {
        Self {
            config,
            context,
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
