mod cli;
mod commands;
mod error;
mod logger;

use clap::Parser;
use graphql_mock_config::load_config;

use crate::{
    cli::{Cli, Command},
    logger::configure_logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.clone())?;
    configure_logging(&config.log).map_err(error::CliError::from)?;

    let output = match &cli.command {
        Command::Generate(args) => commands::generate(args, &config)?,
        Command::Validate(args) => commands::validate_payload(args)?,
        Command::Mock(args) => commands::mock(args, &config).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
