//! Data-access contract and request/response types.
//!
//! This module defines the collaborator the orchestrators fetch through
//! (`AnalysisSource`), along with the request types for each endpoint.
//!
//! # Endpoints
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | Security info | [`SecurityId`] | [`SecurityInfo`] |
//! | Daily bars | [`BarsRequest`] | [`BarSeries`] of [`crate::DailyBar`] |
//! | Weekly bars | [`BarsRequest`] | [`BarSeries`] of [`crate::WeeklyBar`] |
//! | Date-interval statement | [`DateIntervalRequest`] | [`DateIntervalBundle`] |
//! | Quarter statement | [`QuarterRequest`] | [`QuarterBundle`] |
//!
//! Every call is single-shot: it resolves with the typed payload or fails
//! with a [`SourceError`]. Nothing at this layer retries.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{
    AdjustmentMode, BarPeriod, BarSeries, DateIntervalBundle, DateRange, FiscalPeriod,
    QuarterBundle, SecurityId, SecurityInfo,
};

/// Data endpoint, used in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SecurityInfo,
    DailyBars,
    WeeklyBars,
    DateIntervalStatement,
    QuarterStatement,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecurityInfo => "security_info",
            Self::DailyBars => "daily_bars",
            Self::WeeklyBars => "weekly_bars",
            Self::DateIntervalStatement => "date_interval_statement",
            Self::QuarterStatement => "quarter_statement",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    InvalidRequest,
    NotFound,
    Unavailable,
    Internal,
}

/// Structured transport/domain error raised by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for bar endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub security: SecurityId,
    pub range: DateRange,
    pub period: BarPeriod,
    pub adjustment: AdjustmentMode,
}

impl BarsRequest {
    pub fn daily(security: SecurityId, range: DateRange, adjustment: AdjustmentMode) -> Self {
        Self {
            security,
            range,
            period: BarPeriod::Day,
            adjustment,
        }
    }

    pub fn weekly(security: SecurityId, range: DateRange, adjustment: AdjustmentMode) -> Self {
        Self {
            security,
            range,
            period: BarPeriod::Week,
            adjustment,
        }
    }
}

/// Request payload for the date-interval statement endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateIntervalRequest {
    pub security: SecurityId,
    pub range: DateRange,
}

/// Request payload for the quarter statement endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterRequest {
    pub security: SecurityId,
    pub period: FiscalPeriod,
}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Data-access collaborator consumed by the orchestrators.
///
/// # Required Methods
///
/// | Method | Description |
/// |--------|-------------|
/// | [`name`](AnalysisSource::name) | Label used in logs |
/// | [`security_info`](AnalysisSource::security_info) | Security metadata |
/// | [`daily_bars`](AnalysisSource::daily_bars) | Daily candles for a range |
/// | [`weekly_bars`](AnalysisSource::weekly_bars) | Weekly aggregates for a range |
/// | [`date_interval_statement`](AnalysisSource::date_interval_statement) | Date-interval bundle |
/// | [`quarter_statement`](AnalysisSource::quarter_statement) | Quarter bundle |
///
/// Implementations must be `Send + Sync`; the orchestrators share them
/// behind an `Arc`.
pub trait AnalysisSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn security_info<'a>(&'a self, security: &'a SecurityId) -> SourceFuture<'a, SecurityInfo>;

    /// Daily bars for `req.range` under `req.adjustment`.
    fn daily_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries>;

    /// Weekly bars for `req.range` under `req.adjustment` (period kind `week`).
    fn weekly_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries>;

    fn date_interval_statement<'a>(
        &'a self,
        req: DateIntervalRequest,
    ) -> SourceFuture<'a, DateIntervalBundle>;

    fn quarter_statement<'a>(&'a self, req: QuarterRequest) -> SourceFuture<'a, QuarterBundle>;
}
