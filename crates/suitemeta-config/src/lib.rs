//! User configuration for the suitemeta CLI
//!
//! Settings are stored in TOML. Every value is optional in the file and
//! falls back to a built-in default, so a missing file is equivalent to an
//! empty one.

pub mod config;

pub use config::{Config, ConfigError};
