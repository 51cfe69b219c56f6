use clap::{Parser, Subcommand};
use suitemeta::commands::{
    build_metadata::{self, BuildMetadataCommand},
    config::{self, ConfigAction},
    tree::{self, TreeCommand},
    validate::{self, ValidateCommand},
};
use suitemeta::GlobalOpts;
use suitemeta_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "suitemeta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Plugin suite metadata",
    long_about = "suitemeta validates the plugin suite of a reactor build and generates the plugins.json describing it."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the suite before a release
    Validate(ValidateCommand),
    /// Generate plugins.json, screenshots and suite archives
    BuildMetadata(BuildMetadataCommand),
    /// Show the suites discovered in the reactor
    Tree(TreeCommand),
    /// Configure suitemeta
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.no_stdout)
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Validate(cmd) => validate::handle_validate(cmd, &cli.global),
        Commands::BuildMetadata(cmd) => build_metadata::handle_build_metadata(cmd, &cli.global),
        Commands::Tree(cmd) => tree::handle_tree(cmd, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
