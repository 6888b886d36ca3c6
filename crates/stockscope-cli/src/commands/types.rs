use serde::Serialize;
use stockscope_core::{InputShape, StatementType};

use super::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct TypeRow {
    name: StatementType,
    title: &'static str,
    input_shape: InputShape,
}

pub fn run() -> Result<CommandResult, CliError> {
    let rows: Vec<TypeRow> = StatementType::ALL
        .into_iter()
        .map(|kind| TypeRow {
            name: kind,
            title: kind.title(),
            input_shape: kind.input_shape(),
        })
        .collect();

    Ok(CommandResult::listing("types", serde_json::to_value(rows)?))
}
