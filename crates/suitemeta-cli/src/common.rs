//! Common types and utilities shared across commands

use clap::Parser;
use std::path::{Path, PathBuf};
use suitemeta_config::Config;
use suitemeta_suite::reactor::DEFAULT_REACTOR_FILE;
use suitemeta_suite::Reactor;
use tracing::debug;

use crate::errors::CliError;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        help = "Suppress console feedback (always logged to file)"
    )]
    pub no_stdout: bool,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Reactor description path: the explicit one, or `reactor.toml` in the working directory
pub fn reactor_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REACTOR_FILE))
}

pub fn load_reactor(explicit: Option<&Path>) -> anyhow::Result<Reactor> {
    let path = reactor_path(explicit);
    if !path.is_file() {
        return Err(CliError::ReactorNotFound(path).into());
    }
    debug!("Using reactor description {:?}", path);
    Ok(Reactor::load(&path)?)
}

/// User configuration, or the defaults when it can't be read
pub fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            suitemeta_logger::warn(&format!("Failed to load config, using defaults: {}", e));
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
            no_stdout: false,
        };
        assert_eq!(opts.verbosity_level(), 0);

        let opts = GlobalOpts {
            verbose: 1,
            ..Default::default()
        };
        assert_eq!(opts.verbosity_level(), 1);
    }

    #[test]
    fn test_reactor_path_default() {
        assert_eq!(reactor_path(None), PathBuf::from("reactor.toml"));
        assert_eq!(
            reactor_path(Some(Path::new("build/reactor.toml"))),
            PathBuf::from("build/reactor.toml")
        );
    }

    #[test]
    fn test_missing_reactor() {
        let result = load_reactor(Some(Path::new("/nonexistent/reactor.toml")));
        assert!(result.is_err_and(|e| matches!(
            e.downcast_ref::<CliError>(),
            Some(CliError::ReactorNotFound(_))
        )));
    }
}
