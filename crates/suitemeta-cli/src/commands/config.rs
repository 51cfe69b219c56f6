use clap::Subcommand;
use colored::Colorize;
use suitemeta_config::Config;
use suitemeta_logger as logger;

use crate::GlobalOpts;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show every setting with its effective value
    Show,
    /// Print the stored value of one setting
    Get { key: String },
    /// Store a setting
    Set { key: String, value: String },
    /// Print the path of the configuration file
    Path,
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> anyhow::Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() && opts.verbosity_level() > 0 {
                println!("  {}", "(defaults)".yellow());
            }
            for (key, value) in config.values_iter() {
                println!("  {}: {}", key.cyan(), value);
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => {
                    let effective = config
                        .values_iter()
                        .into_iter()
                        .find(|(k, _)| *k == key)
                        .map(|(_, v)| v)
                        .unwrap_or_default();
                    println!("{} {}", effective, "(default)".dimmed());
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            let path = Config::path()?;
            logger::debug(&format!("Reading config from: {}", path.display()));
            println!("{}", path.display());
        }
    }
    Ok(())
}
