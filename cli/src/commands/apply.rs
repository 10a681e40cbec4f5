//! `ddagent-installer apply` — reconcile the agent package.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::reconcile::Reconciler;
use crate::commands::{RequestOverrides, load_request};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fetch::HttpFetcher;
use crate::infra::fs::LocalFs;
use crate::infra::msi::MsiPackageManager;
use crate::infra::remediation::PowerShellRemediation;
use crate::output::TerminalReporter;

/// Run the apply command.
///
/// # Errors
///
/// Returns the first fatal [`InstallError`](crate::domain::InstallError) of
/// the run, or a config loading error.
pub async fn run(app: &AppContext, overrides: &RequestOverrides) -> Result<ExitCode> {
    let (config, request) = load_request(app, overrides)?;
    let defaults = config.defaults();

    let runner = TokioCommandRunner::default();
    let fetcher = HttpFetcher::default();
    let packages = MsiPackageManager::new(&runner, defaults.product_name.clone());
    let remediation = PowerShellRemediation::new(&fetcher, &runner);
    let reconciler = Reconciler::new(&defaults, &fetcher, &LocalFs, &packages, &remediation);

    let reporter = TerminalReporter::new(&app.output);
    let outcome = reconciler.reconcile(&request, &reporter).await?;
    app.renderer().render_outcome(&outcome)?;
    Ok(ExitCode::SUCCESS)
}
