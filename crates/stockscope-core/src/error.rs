use serde::Serialize;
use thiserror::Error;

use crate::data_source::SourceError;

/// Construction and contract errors for domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("security id cannot be empty")]
    EmptySecurityId,
    #[error("security id length {len} exceeds max {max}")]
    SecurityIdTooLong { len: usize, max: usize },
    #[error("security id contains invalid character '{ch}' at index {index}")]
    SecurityIdInvalidChar { ch: char, index: usize },

    #[error("invalid adjustment mode '{value}', expected one of none, pre, post")]
    InvalidAdjustmentMode { value: String },
    #[error("invalid quarter '{value}', expected 1, 2, 3 or 4")]
    InvalidQuarter { value: String },
    #[error("invalid statement type '{value}'")]
    InvalidStatementType { value: String },
    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,
    #[error("bars must be in chronological order (offending date {date})")]
    UnorderedBars { date: String },
}

/// User range rules checked before any fetch is issued.
///
/// The display text is the message handed to the notifier.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeViolation {
    #[error("start date must not be later than end date")]
    BeginAfterEnd,
    #[error("you may not select the current or a future quarter")]
    CurrentOrFutureQuarter,
    #[error("you may not select a future date")]
    FutureDate,
}

impl RangeViolation {
    pub const fn code(self) -> &'static str {
        match self {
            Self::BeginAfterEnd => "range.begin_after_end",
            Self::CurrentOrFutureQuarter => "range.current_or_future_quarter",
            Self::FutureDate => "range.future_date",
        }
    }
}

/// Failure of an orchestrator action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no security is selected")]
    NoSelection,

    #[error(transparent)]
    Source(#[from] SourceError),
}
