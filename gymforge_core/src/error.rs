//! Error types for the gymforge_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gymforge_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Member-state persistence error
    #[error("State error: {0}")]
    State(String),

    /// Referenced member, plan, exercise, session or achievement does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Operation is not valid for the entity's current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Internal invariant was violated; callers must reject bad input at the boundary
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Convenience constructor for NotFound conditions
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }
}
