//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Install, upgrade and remove the Datadog Agent on Windows hosts
#[derive(Parser)]
#[command(
    name = "ddagent-installer",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Log at debug level (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ~/.ddagent-installer/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bring the agent package to the configured state
    Apply(commands::RequestOverrides),

    /// Show the artifact, marker and install options without touching the host
    Plan(commands::RequestOverrides),

    /// JMX metric mapping
    #[command(subcommand)]
    Metrics(commands::metrics::MetricsCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            config,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
        });

        match command {
            Command::Apply(overrides) => commands::apply::run(&app, &overrides).await,
            Command::Plan(overrides) => commands::plan::run(&app, &overrides),
            Command::Metrics(cmd) => commands::metrics::run(&app, cmd),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
