use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use suitemeta_logger as logger;
use suitemeta_suite::Validator;

use crate::common::{load_config, load_reactor};
use crate::GlobalOpts;

/// Check that the reactor publishes exactly one well-formed suite
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateCommand {
    /// Reactor description (default: ./reactor.toml)
    #[arg(short, long)]
    pub reactor: Option<PathBuf>,
}

pub fn handle_validate(cmd: ValidateCommand, _opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config();
    let reactor = load_reactor(cmd.reactor.as_deref())?;
    let packaging = config.get_packaging();

    let candidates = reactor.plugin_modules(&packaging);
    logger::debug(&format!(
        "{} '{}' module(s) in the reactor",
        candidates.len(),
        packaging
    ));

    let validator = Validator::new(config.get_manifest_file(), packaging);
    let suite = validator
        .validate(candidates)
        .context("Suite validation failed")?;

    let children = suite.children().count();
    logger::success(&format!(
        "'{}' is ready to publish ({} bundled module(s))",
        suite.display_name(),
        children
    ));
    Ok(())
}
