use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use suitemeta_config::Config;
use suitemeta_logger as logger;
use suitemeta_suite::{BuildSettings, MetadataBuilder, MetadataExtractor, SystemClock};

use crate::common::{load_config, load_reactor};
use crate::errors::CliError;
use crate::GlobalOpts;

/// Regenerate `plugins.json` for one version label
#[derive(Args, Debug, Clone, Default)]
pub struct BuildMetadataCommand {
    /// Reactor description (default: ./reactor.toml)
    #[arg(short, long)]
    pub reactor: Option<PathBuf>,

    /// Version label (default: the reactor's version property)
    #[arg(long)]
    pub version_label: Option<String>,

    /// Output directory (default: config `output-directory`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip creating suite archives
    #[arg(long)]
    pub no_bundle: bool,
}

fn settings(cmd: &BuildMetadataCommand, config: &Config) -> BuildSettings {
    BuildSettings {
        output_directory: cmd
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(config.get_output_directory())),
        manifest_file: config.get_manifest_file(),
        packaging: config.get_packaging(),
        bundle_suites: config.get_bundle_suites() && !cmd.no_bundle,
    }
}

fn check_label(label: &str) -> Result<(), CliError> {
    if label.contains(['/', '\\']) || label == "." || label == ".." {
        return Err(CliError::InvalidArgument {
            flag: "--version-label".to_string(),
            reason: format!("'{}' can't be used as a directory name", label),
        });
    }
    Ok(())
}

pub fn handle_build_metadata(cmd: BuildMetadataCommand, _opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config();
    let reactor = load_reactor(cmd.reactor.as_deref())?;
    let version_property = config.get_version_property();

    let label = reactor.version_label(cmd.version_label.as_deref(), &version_property)?;
    check_label(&label)?;
    logger::debug(&format!("Version label: {}", label));

    let settings = settings(&cmd, &config);
    let candidates =
        reactor.plugin_modules_for_version(&settings.packaging, &version_property, &label);

    let extractor = MetadataExtractor::new(config.get_readme_file(), config.get_screenshots_dir());
    let clock = SystemClock;
    let builder = MetadataBuilder::new(settings, extractor, &clock);

    logger::step(&format!(
        "Building metadata for {} candidate module(s)",
        candidates.len()
    ));
    logger::spinner_start(&format!("Building metadata for {}", label));
    let written = builder
        .build(candidates, &label)
        .and_then(|metadata| builder.write(&metadata).map(|path| (metadata.len(), path)));

    match written {
        Ok((count, path)) => {
            logger::spinner_success(&format!(
                "{} plugin(s) written to {}",
                count,
                path.display()
            ));
            Ok(())
        }
        Err(e) => {
            logger::spinner_error(&format!("Metadata build for version {} failed", label));
            Err(e).with_context(|| format!("Failed to build metadata for version {}", label))
        }
    }
}
