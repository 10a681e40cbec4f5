//! `ddagent-installer config` — show the effective configuration.

use anyhow::Result;
use std::process::ExitCode;

use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (secrets redacted)
    Show,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or rendered.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = app.config_store.load()?;
    let path = app.config_store.path()?;
    app.renderer().render_config(&config, &path)?;
    Ok(ExitCode::SUCCESS)
}
