//! Error types surfaced by the engine's collaborators

use thiserror::Error;

/// Asset lookups fail instead of handing back a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// Requested but still in flight
    #[error("asset `{0}` has not finished loading")]
    NotLoaded(String),
    /// Never requested
    #[error("could not find asset `{0}`")]
    NotFound(String),
    #[error("couldn't load asset `{key}` from `{source_url}`")]
    Failed { key: String, source_url: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid world config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid world config: {0}")]
    Invalid(String),
}
