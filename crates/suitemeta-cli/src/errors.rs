//! Errors raised by the command line layer itself
//!
//! Library errors (`SuiteError`, `ConfigError`, `ManifestError`) flow through
//! the handlers unchanged, wrapped in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Reactor description not found: {}. Pass --reactor or run from the reactor directory", .0.display())]
    ReactorNotFound(PathBuf),

    #[error("Invalid value for {flag}: {reason}")]
    InvalidArgument { flag: String, reason: String },
}
