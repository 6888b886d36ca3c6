use std::io::{self, Write};

use crate::commands::CommandResult;
use crate::error::CliError;

/// Writes the command report to stdout as one JSON document.
pub fn render(result: &CommandResult, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{payload}")?;
    stdout.flush()?;
    Ok(())
}

/// Writes validation messages to stderr, one per line.
pub fn render_notices(notices: &[String]) -> Result<(), CliError> {
    let mut stderr = io::stderr().lock();
    for notice in notices {
        writeln!(stderr, "notice: {notice}")?;
    }
    Ok(())
}
