//! `ddagent-installer plan` — show what `apply` would do.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::reconcile::plan;
use crate::commands::{RequestOverrides, load_request};
use crate::domain::DesiredState;

/// Run the plan command. Never touches the network or the package manager.
///
/// # Errors
///
/// Returns an error if the config is invalid or the version is blacklisted.
pub fn run(app: &AppContext, overrides: &RequestOverrides) -> Result<ExitCode> {
    let (config, request) = load_request(app, overrides)?;
    if request.desired_state == DesiredState::Absent {
        if app.is_json() {
            let out = serde_json::json!({
                "ensure": request.desired_state,
                "remediation_script_url": config.installer.remediation_script_url,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(ExitCode::SUCCESS);
        }
        app.output.info(&format!(
            "agent.ensure is absent: apply runs {} then uninstalls",
            config.installer.remediation_script_url
        ));
        return Ok(ExitCode::SUCCESS);
    }
    let install_plan = plan(&request, &config.defaults())?;
    app.renderer().render_plan(&install_plan)?;
    Ok(ExitCode::SUCCESS)
}
