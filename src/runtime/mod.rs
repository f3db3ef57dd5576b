use clap::Parser;

use crate::cli::{Cli, Command};

mod auth;
mod logging;
mod scrobble;
mod settings;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    let settings = settings::load_settings()?;
    tracing::debug!(path = ?crate::config::resolve_config_path(), ?settings, "loaded settings");

    match cli.subcommand() {
        Command::Scrobble => scrobble::run(settings).await,
        Command::Auth => auth::run(settings).await,
    }
}
