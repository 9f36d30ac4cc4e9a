use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rinkscout::cli::rankings::OutputFormat;
use rinkscout::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for rinkscout::AppCommand {
    fn from(cmd: Commands) -> rinkscout::AppCommand {
        match cmd {
            Commands::Run { format } => rinkscout::AppCommand::Run { format },
            Commands::ClearCache => rinkscout::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Score every skater of the configured season and print the rankings
    Run {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Drop all cached career records
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => rinkscout::cli::setup::setup(),
        Some(cmd) => rinkscout::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
