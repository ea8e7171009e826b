use std::env;
use std::path::PathBuf;

use alongtrack_core::config::{LayeredConfig, Settings, ENV_PREFIX};
use alongtrack_core::Result;

/// Default port of the HTTP service
pub const DEFAULT_PORT: u16 = 3001;

/// Server process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// Optional TOML file layered between defaults and environment
    pub config_file: Option<PathBuf>,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var(format!("{}PORT", ENV_PREFIX))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origin = env::var(format!("{}CORS_ORIGIN", ENV_PREFIX))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let config_file = env::var(format!("{}CONFIG", ENV_PREFIX)).ok().map(PathBuf::from);

        Self {
            port,
            cors_origin,
            config_file,
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Layer defaults, the optional config file and the environment
    pub fn load_settings(&self) -> Result<Settings> {
        let mut layered = LayeredConfig::with_defaults();
        if let Some(path) = &self.config_file {
            layered = layered.load_from_file(path)?;
        }
        layered.load_from_env().resolve()
    }
}
