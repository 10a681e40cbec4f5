//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;

use crate::application::services::reconcile::{InstallPlan, ReconcileOutcome};
use crate::domain::InstallerConfig;
use crate::domain::secret::REDACTED;
use crate::infra::config::CONFIG_ENV;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("ddagent-installer {version}");
    }

    /// Render what `apply` would do.
    pub fn render_plan(&self, plan: &InstallPlan) {
        self.ctx.header("Install plan:");
        self.ctx.kv(
            "Artifact:",
            &plan.artifact.url.style(self.ctx.styles.url).to_string(),
        );
        self.ctx
            .kv("Staging:", &plan.staging_path.display().to_string());
        self.ctx.kv("Marker:", &plan.marker.to_string());
        for line in format_option_lines(plan) {
            if line.ends_with(REDACTED) {
                self.ctx
                    .kv("Option:", &line.style(self.ctx.styles.redacted).to_string());
            } else {
                self.ctx.kv("Option:", &line);
            }
        }
    }

    /// Render the result of a reconciliation run.
    pub fn render_outcome(&self, outcome: &ReconcileOutcome) {
        self.ctx.success(&format_outcome(outcome));
    }

    /// Render the effective configuration with secrets redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render_config(&self, config: &InstallerConfig, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(config).context("cannot serialize config")?;
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.heading)
        );
        println!();
        for line in yaml.lines() {
            println!("  {line}");
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.section));
        println!(
            "    {:<26} {}",
            format!("{CONFIG_ENV}:"),
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| "(not set)".to_string())
        );
        println!(
            "    {:<26} {}",
            "DD_API_KEY:",
            if std::env::var("DD_API_KEY").is_ok() {
                "(set)"
            } else {
                "(not set)"
            }
        );
        Ok(())
    }
}

/// `KEY=VALUE` lines for the plan's install options, secrets redacted.
#[must_use]
pub fn format_option_lines(plan: &InstallPlan) -> Vec<String> {
    plan.options
        .iter()
        .map(|o| format!("{}={}", o.key, o.value))
        .collect()
}

#[must_use]
pub fn format_outcome(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::Installed { marker } => format!("Agent installed ({marker})"),
        ReconcileOutcome::AlreadyInstalled { version } => {
            format!("Agent {version} already installed, nothing to do")
        }
        ReconcileOutcome::Removed { version } => format!("Agent {version} removed"),
        ReconcileOutcome::AlreadyAbsent => "Agent not installed, nothing to remove".to_string(),
    }
}
