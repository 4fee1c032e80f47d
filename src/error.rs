//! Error type shared by every compositing operation.

use thiserror::Error;

use crate::buffer::PixelFormat;

/// Errors raised by buffer, kernel and compositing operations.
///
/// Regions that fall outside their target buffer are not errors; those
/// operations clip to nothing and return normally.
#[derive(Debug, Error)]
pub enum EffectsError {
    /// An operation received a buffer in a format it cannot process.
    #[error("{operation}: expected {expected}, got {found:?}")]
    InvalidFormat {
        operation: &'static str,
        expected: &'static str,
        found: PixelFormat,
    },

    /// A kernel, executor or option value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Raw pixel data does not match the declared dimensions.
    #[error("shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// An option snapshot could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// A dedicated worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, EffectsError>;
