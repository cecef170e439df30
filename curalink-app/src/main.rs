//! `curalink`: terminal front end for the CuraLink client.
mod app;
mod cli;
mod commands;
mod render;

use anyhow::Result;
use app::App;
use clap::Parser;
use cli::Cli;
use curalink_common::CuralinkError;
use curalink_common::observability::{LogConfig, LogFormat, init_logging};
use curalink_config::{CuralinkConfig, CuralinkConfigLoader};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 1) Config: file, then env overrides
    let cfg: CuralinkConfig = CuralinkConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    // 2) Logging from the config's logging section
    let format: LogFormat = cfg.logging.format.parse()?;
    init_logging(LogConfig {
        log_dir: cfg.logging.log_dir.clone(),
        emit_stderr: cfg.logging.stderr || cli.verbose,
        format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;

    let app = App::from_config(&cfg).await?;
    let mut stdout = std::io::stdout();
    commands::run(&app, cli.command, &mut stdout).await
}

/// User mistakes get a short notice and exit code 2; anything else is an
/// internal failure.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<CuralinkError>() {
        Some(e @ CuralinkError::Validation(_)) => {
            eprintln!("{e}. Please fill in all required fields.");
            ExitCode::from(2)
        }
        Some(e @ (CuralinkError::InvalidInput(_) | CuralinkError::NotFound(_))) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
        _ => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
