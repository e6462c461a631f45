mod cli;
mod config;
mod context;
mod domain;
mod handlers;
mod infrastructure;
mod logging;
mod manager;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::get_config_dir;
use context::TouchIdContext;
use handlers::{
    handle_completion, handle_config, handle_disable, handle_enable, handle_status, handle_token,
    handle_verify,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_dir = get_config_dir()?;

    match cli.command {
        Commands::Config { subcommand } => handle_config(subcommand, &config_dir),
        Commands::Completion { shell } => handle_completion(&shell),
        Commands::Status => handle_status(&TouchIdContext::load(&config_dir).await?),
        Commands::Enable { pin } => {
            handle_enable(&TouchIdContext::load(&config_dir).await?, pin).await
        }
        Commands::Disable => handle_disable(&TouchIdContext::load(&config_dir).await?).await,
        Commands::Token { kind } => {
            handle_token(&TouchIdContext::load(&config_dir).await?, kind.into()).await
        }
        Commands::Verify => handle_verify(&TouchIdContext::load(&config_dir).await?).await,
    }
}
