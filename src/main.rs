use clap::Parser;
use tracing::{error, info};

use valuator::adapter::inbound::cli::command::{Cli, Commands};
use valuator::adapter::inbound::cli::{check, recompute, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("valuator starting");

    let result = match &cli.command {
        Commands::Recompute(args) => recompute::execute(&config, args),
        Commands::Run(args) => run::execute(&config, args).await,
        Commands::Check => check::execute(&config),
    };

    if let Err(e) = result {
        error!(error = %e, kind = %e.failure_kind(), "Fatal error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
