//! cardvault: ingest a card directory into a dated archive, and query it.
//!
//! Configuration comes from the environment (or `.env`); see `Config`.

use anyhow::Context;
use cardvault_cli::cli::{Cli, Commands};
use cardvault_cli::{commands, setup};
use cardvault_core::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Invalid configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    setup::telemetry::init_telemetry(config.log_format);

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => {
            let services = setup::initialize(config).await?;
            commands::watch::run(services).await
        }
        Commands::Files(args) => {
            let index = setup::initialize_index(&config).await?;
            commands::files::run(index.as_ref(), &args).await
        }
        Commands::Show { id, format } => {
            let index = setup::initialize_index(&config).await?;
            let archive = setup::storage::setup_archive(&config).await?;
            commands::show::run(index.as_ref(), archive.as_ref(), id, format).await
        }
        Commands::Ingest { paths } => {
            let services = setup::initialize(config).await?;
            commands::ingest::run(&services.coordinator, &paths).await
        }
    }
}
