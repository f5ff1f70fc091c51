mod commands;
mod startup;

use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = commands::Cli::parse();
    info!("Starting pagecal");

    // Load configuration
    let config = startup::load_config()?;

    commands::run(cli.command, config).await?;
    Ok(())
}
