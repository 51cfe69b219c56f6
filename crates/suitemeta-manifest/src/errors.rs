use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Manifest file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{}:{line}: {reason}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid value '{value}' for '{key}' in {}", .path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        value: String,
    },

    #[error("Localizing bundle '{bundle}' declared in {} can't be found", .manifest.display())]
    BundleNotFound { manifest: PathBuf, bundle: String },

    #[error("Failed to (de)serialize plugins metadata: {0}")]
    Json(#[from] serde_json::Error),
}
