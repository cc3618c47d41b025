//! Manifest error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a mod's `hotreload.json`.
///
/// Never fatal: the registry logs these and leaves the mod unmanaged.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid JSON in `{}`: {}", .0.display(), .1)]
    Json(PathBuf, #[source] serde_json::Error),
}

impl ManifestError {
    /// Path of the manifest that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io(path, _) | Self::Json(path, _) => path,
        }
    }
}
