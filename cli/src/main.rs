//! ddagent-installer - Datadog Agent package reconciliation for Windows hosts

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ddagent_installer::cli::Cli;
use ddagent_installer::domain::InstallError;
use ddagent_installer::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, json);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(e: &anyhow::Error, json: bool) {
    if json {
        let code = e
            .downcast_ref::<InstallError>()
            .map_or("ERROR", InstallError::code);
        match format_error(&format!("{e:#}"), code) {
            Ok(out) => println!("{out}"),
            Err(_) => eprintln!("Error: {e:#}"),
        }
    } else {
        eprintln!("Error: {e:#}");
    }
}
