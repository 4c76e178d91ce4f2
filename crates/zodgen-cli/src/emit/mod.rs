mod atomic;
mod files;

pub use files::{DriftKind, detect_drift, write_rendered};

use thiserror::Error;

/// Errors raised while writing generated files.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

pub type EmitResult<T> = std::result::Result<T, EmitError>;
