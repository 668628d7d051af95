//! Error types for reel_animation

use thiserror::Error;

/// Errors raised by the animation layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// An easing name did not match any known curve
    #[error("unknown easing curve: {0}")]
    UnknownEasing(String),

    /// The engine or controller behind a handle has been dropped
    #[error("animation engine is no longer alive")]
    EngineDropped,

    /// A registration was attempted on a disposed scope
    #[error("animation scope has been disposed")]
    ScopeDisposed,
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
