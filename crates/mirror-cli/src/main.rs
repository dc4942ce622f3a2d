use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "mirror")]
#[command(about = "Quantum Mirror - reflect on a concern from the command line", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one calibration and print the result
    Calibrate {
        /// The concern to reflect on
        text: String,
        /// Print the result and recommendation as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the books and tracks recommendations are drawn from
    Catalog,
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    mirror_infrastructure::logging::init_stderr_logging("warn");
    let cli = Cli::parse();
    let config_service = commands::utils::config_service(cli.config)?;

    match cli.command {
        Commands::Calibrate { text, json } => {
            commands::calibrate::run(&config_service, &text, json).await?
        }
        Commands::Catalog => commands::catalog::list(&config_service)?,
        Commands::Config => commands::config::show(&config_service)?,
    }

    Ok(())
}
