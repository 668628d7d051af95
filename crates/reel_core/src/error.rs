//! Core error types

use thiserror::Error;

/// Errors raised by core types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A viewport dimension was zero, negative, or not a number
    #[error("invalid viewport size {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    /// A breakpoint threshold was not a positive number
    #[error("invalid breakpoint: {0}")]
    InvalidBreakpoint(f32),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
