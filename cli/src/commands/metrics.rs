//! `ddagent-installer metrics` — JMX metric mapping file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::metrics_config::{
    WriteOutcome, render_jmx_config, write_jmx_config,
};
use crate::infra::fs::LocalFs;

/// Metrics subcommands.
#[derive(Subcommand)]
pub enum MetricsCommand {
    /// Render the JMX integration conf.yaml
    Render {
        /// Write to this path instead of stdout (`-` for the configured path)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Run the metrics command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the file cannot be written.
pub fn run(app: &AppContext, cmd: MetricsCommand) -> Result<ExitCode> {
    match cmd {
        MetricsCommand::Render { output } => render(app, output),
    }
}

fn render(app: &AppContext, output: Option<PathBuf>) -> Result<ExitCode> {
    let config = app.config_store.load()?;
    let content = render_jmx_config(&config.jmx)?;

    let Some(path) = output else {
        print!("{content}");
        return Ok(ExitCode::SUCCESS);
    };
    let path = if path.as_os_str() == "-" {
        config.jmx.conf_path.clone()
    } else {
        path
    };

    let outcome = write_jmx_config(&LocalFs, &path, &content)?;
    if app.is_json() {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "changed": outcome == WriteOutcome::Written,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match outcome {
            WriteOutcome::Written => app.output.success(&format!("Wrote {}", path.display())),
            WriteOutcome::Unchanged => app
                .output
                .info(&format!("{} already up to date", path.display())),
        }
    }
    Ok(ExitCode::SUCCESS)
}
