use anyhow::Result;
use clap::Parser;

use pixup::{
    app::load_config,
    cli::{handle_command, Cli},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    // Per-item failures were already reported one by one
    if !handle_command(&cli, &config).await? {
        std::process::exit(1);
    }

    Ok(())
}
