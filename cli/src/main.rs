//! `market-cli` entry point

use clap::Parser;
use prediction_market_cli::{commands, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match commands::run(cli).await {
        Ok(Some(outcome)) => outcome.print(),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
