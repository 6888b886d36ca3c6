use serde::Serialize;
use serde_json::Value;
use stockscope_core::{
    AnalysisContext, FiscalPeriod, SecurityId, StatementOrchestrator, StatementState,
};

use super::{apply_guarded, CommandResult};
use crate::cli::StatementArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatementReport<'a> {
    #[serde(flatten)]
    state: &'a StatementState,
    active_figures: Option<&'a Value>,
}

pub async fn run(
    args: &StatementArgs,
    context: AnalysisContext,
) -> Result<CommandResult, CliError> {
    let security = SecurityId::parse(&args.security)?;
    let statement = StatementOrchestrator::new(context);
    statement.select_security(Some(security));

    if let Some(tab) = args.tab {
        statement.select_tab(tab);
    }
    apply_guarded("begin", args.begin, |date| statement.set_begin_date(date));
    apply_guarded("end", args.end, |date| statement.set_end_date(date));
    match (args.year, args.quarter) {
        (Some(year), Some(quarter)) => {
            apply_guarded("period", Some(FiscalPeriod::new(year, quarter)), |period| {
                statement.set_fiscal_period(period)
            });
        }
        (year, quarter) => {
            apply_guarded("year", year, |year| statement.set_fiscal_year(year));
            apply_guarded("quarter", quarter, |quarter| {
                statement.set_fiscal_quarter(quarter)
            });
        }
    }

    let outcome = statement.fetch_data().await?;

    let state = statement.snapshot();
    let data = serde_json::to_value(StatementReport {
        state: &state,
        active_figures: state.active_figures(),
    })?;
    Ok(CommandResult::fetched("statement", outcome, data))
}
