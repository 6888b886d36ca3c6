//! # Domain Models
//!
//! Canonical domain types for quote and statement analysis.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SecurityId`] | Opaque security identifier |
//! | [`SecurityInfo`] | Security metadata snapshot |
//! | [`AdjustmentMode`] | Price adjustment convention (none, pre, post) |
//! | [`Bar`] | OHLC bar with volume and turnover |
//! | [`BarSeries`] | Chronological bars for one security and period |
//! | [`DateRange`] | Inclusive calendar interval |
//! | [`FiscalPeriod`] | Reporting quarter (year, quarter) |
//! | [`StatementType`] | Financial statement category and its input shape |
//! | [`StatementBundles`] | Committed date-interval and quarter bundle pair |
//!
//! ## Validation
//!
//! Bars and series enforce their invariants at construction time:
//!
//! ```rust,ignore
//! use stockscope_core::{Bar, ValidationError};
//! use time::macros::date;
//!
//! // high < low is rejected
//! let invalid = Bar::new(date!(2024 - 01 - 02), 10.0, 9.0, 11.0, 10.0, 100, 1_000.0, None);
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```
//!
//! Date ranges and fiscal periods are plain values; the rules that govern
//! them live in [`crate::validator`].

pub mod calendar;
mod models;
mod security;
mod statement;

pub use calendar::{
    days_before, format_date, months_before, parse_date, DateRange, FiscalPeriod, Quarter,
};
pub use models::{
    AdjustmentMode, Bar, BarPeriod, BarSeries, DailyBar, SecurityInfo, SecurityKind, WeeklyBar,
};
pub use security::SecurityId;
pub use statement::{
    DateIntervalBundle, InputShape, QuarterBundle, StatementBundles, StatementType,
};
