//! Rendering of emission plans into source files.

pub mod zod;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::planner::EmissionPlan;

pub use zod::{render_plan, render_unit};

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    /// Path relative to the output directory.
    pub path: String,
    pub contents: String,
}

/// SHA-256 over every rendered path and contents of `plan`, hex encoded.
pub fn fingerprint(plan: &EmissionPlan) -> String {
    let mut hasher = Sha256::new();
    for file in render_plan(plan) {
        hasher.update(file.path.as_bytes());
        hasher.update(b"\0");
        hasher.update(file.contents.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
