//! Error types for reel_site

use reel_animation::AnimationError;
use reel_core::CoreError;
use thiserror::Error;

/// Failures reported by the external data collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The backing service could not be reached
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The service refused the request
    #[error("provider rejected the request: {0}")]
    Rejected(String),

    /// Data came back in a shape we cannot read
    #[error("malformed provider data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Malformed(err.to_string())
    }
}

/// Errors that can occur while mounting or configuring the page
#[derive(Error, Debug)]
pub enum SiteError {
    /// Registering animation work failed
    #[error("animation error: {0}")]
    Animation(#[from] AnimationError),

    /// Invalid core value (breakpoint, viewport)
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Configuration file could not be parsed
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration parsed but holds an unusable value
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A data collaborator failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type for reel_site operations
pub type Result<T> = std::result::Result<T, SiteError>;
