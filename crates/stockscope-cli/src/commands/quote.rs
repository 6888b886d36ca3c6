use stockscope_core::{AnalysisContext, QuoteOrchestrator, SecurityId};

use super::{apply_guarded, CommandResult};
use crate::cli::QuoteArgs;
use crate::error::CliError;

/// Applies the range flags, then runs the full switch for the security.
pub async fn run(args: &QuoteArgs, context: AnalysisContext) -> Result<CommandResult, CliError> {
    let security = SecurityId::parse(&args.security)?;
    let quote = QuoteOrchestrator::new(context);

    apply_guarded("candle-begin", args.candle_begin, |date| {
        quote.set_candle_begin(date)
    });
    apply_guarded("candle-end", args.candle_end, |date| quote.set_candle_end(date));
    apply_guarded("week-begin", args.week_begin, |date| quote.set_week_begin(date));
    apply_guarded("week-end", args.week_end, |date| quote.set_week_end(date));

    // No security is selected yet, so this only stores the mode.
    quote.set_adjustment_mode(args.adjust).await?;
    let outcome = quote.select_security(Some(security)).await?;

    let data = serde_json::to_value(quote.snapshot())?;
    Ok(CommandResult::fetched("quote", outcome, data))
}
