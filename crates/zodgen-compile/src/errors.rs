use thiserror::Error;

use crate::model::CompileReport;

/// Errors emitted by the compilation pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid model: {0}")]
    InvalidModel(#[from] zodgen_core::Error),
    #[error("compilation failed with {} issue(s)", .0.issues.len())]
    Failed(CompileReport),
}
