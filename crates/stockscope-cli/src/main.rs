mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use stockscope_core::CollectingNotifier;

use crate::cli::Cli;
use crate::error::CliError;
use crate::logging::LogConfig;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    logging::init_logging(&LogConfig::new(cli.log_level.clone(), cli.log_format))?;

    let notifier = Arc::new(CollectingNotifier::new());
    let result = commands::run(&cli, notifier.clone()).await;

    let notices = notifier.take();
    output::render_notices(&notices)?;
    output::render(&result?, cli.pretty)?;

    if !notices.is_empty() {
        return Err(CliError::Rejected {
            count: notices.len(),
        });
    }

    Ok(ExitCode::SUCCESS)
}
