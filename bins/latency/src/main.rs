mod cmd;
mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands, Effective};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Publish(args) => match Effective::new(&args) {
            Ok(eff) => cmd::publish::run(&eff).await,
            Err(e) => Err(e),
        },
        Commands::Subscribe(args) => match Effective::new(&args) {
            Ok(eff) => cmd::subscribe::run(&eff).await,
            Err(e) => Err(e),
        },
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
