mod quote;
mod statement;
mod types;

use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use stockscope_core::{
    AnalysisContext, AnalysisDefaults, CollectingNotifier, FetchOutcome, RangeViolation,
    SourceBuilder,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Report printed on stdout.
#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FetchOutcome>,
    pub data: Value,
}

impl CommandResult {
    pub fn fetched(command: &'static str, outcome: FetchOutcome, data: Value) -> Self {
        Self {
            command,
            result: Some(outcome),
            data,
        }
    }

    pub fn listing(command: &'static str, data: Value) -> Self {
        Self {
            command,
            result: None,
            data,
        }
    }
}

pub async fn run(cli: &Cli, notifier: Arc<CollectingNotifier>) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Quote(args) => quote::run(args, context(cli, notifier)).await,
        Command::Statement(args) => statement::run(args, context(cli, notifier)).await,
        Command::Types => types::run(),
    }
}

fn context(cli: &Cli, notifier: Arc<CollectingNotifier>) -> AnalysisContext {
    let mut builder = SourceBuilder::new().with_mock(cli.mock);
    if let Some(base_url) = &cli.base_url {
        builder = builder.with_base_url(base_url.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        builder = builder.with_timeout_ms(timeout_ms);
    }

    AnalysisContext::new(builder.from_env().build())
        .with_notifier(notifier)
        .with_defaults(AnalysisDefaults::from_env())
}

/// Runs a guarded setter when the flag was given. A refusal has already
/// been reported to the notifier, so the previous value is simply kept.
fn apply_guarded<T: Display + Copy>(
    flag: &str,
    value: Option<T>,
    setter: impl FnOnce(T) -> Result<(), RangeViolation>,
) {
    let Some(value) = value else {
        return;
    };
    if let Err(violation) = setter(value) {
        tracing::debug!(flag, %value, code = violation.code(), "keeping previous value");
    }
}
