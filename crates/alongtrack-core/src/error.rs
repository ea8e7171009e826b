//! Error types for AlongTrack

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlongTrackError {
    // Input validation errors
    #[error("Invalid track: {reason}")]
    InvalidTrack { reason: String },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("Invalid filter '{filter}': {reason}")]
    InvalidFilterSyntax { filter: String, reason: String },

    // Geodata source errors
    #[error("All Overpass endpoints failed after {attempts} attempts: {last_error}")]
    TransportFailure { attempts: u32, last_error: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    // Sink errors
    #[error("Export failed for {path}: {reason}")]
    ExportFailure { path: String, reason: String },

    #[error("Map rendering failed for {path}: {reason}")]
    RenderFailure { path: String, reason: String },

    // Format errors
    #[error("{format} format error: {message}")]
    FormatError { format: String, message: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AlongTrackError {
    pub fn invalid_track(reason: impl Into<String>) -> Self {
        Self::InvalidTrack { reason: reason.into() }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_filter(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterSyntax {
            filter: filter.into(),
            reason: reason.into(),
        }
    }

    /// Errors raised by input validation, before any network access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTrack { .. }
                | Self::InvalidParameters { .. }
                | Self::InvalidFilterSyntax { .. }
                | Self::FormatError { .. }
        )
    }
}

impl From<serde_json::Error> for AlongTrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AlongTrackError>;
