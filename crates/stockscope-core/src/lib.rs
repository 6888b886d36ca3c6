//! # Stockscope Core
//!
//! Fetch orchestration and range validation for security analysis views.
//!
//! ## Overview
//!
//! An analyst picks a listed security and inspects either its price history
//! (daily candles and weekly aggregates under an adjustment mode) or its
//! financial statements (over a date interval and a fiscal quarter). This
//! crate decides when that data is fetched, validates user-supplied ranges
//! before any call is issued, and commits concurrent results as one
//! consistent view.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | REST and fixture implementations of [`AnalysisSource`] |
//! | [`clock`] | Source of "today" |
//! | [`config`] | Source builder, default ranges, shared context |
//! | [`data_source`] | Data-access trait and request types |
//! | [`domain`] | Securities, bars, ranges, periods, statement bundles |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`notifier`] | Sink for user-facing validation messages |
//! | [`orchestrator`] | Quote and statement orchestrators |
//! | [`selection`] | Selected security and its generation |
//! | [`validator`] | Pure range rules |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockscope_core::{AnalysisContext, QuoteOrchestrator, SecurityId, SourceBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = AnalysisContext::new(SourceBuilder::new().with_mock_mode().build());
//!     let quote = QuoteOrchestrator::new(context);
//!
//!     quote.select_security(Some(SecurityId::parse("sh.600000")?)).await?;
//!     let state = quote.snapshot();
//!     println!("{} daily bars", state.daily.map_or(0, |series| series.len()));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / View     │
//! └────────┬────────┘
//!          │ actions / snapshot()
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Orchestrators  │────▶│ Range Validator  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ AnalysisSource  │────▶│ HTTP Client      │
//! │ (REST/fixture)  │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Range violations never reach the data source; they are reported to the
//! [`Notifier`] and surface as [`FetchOutcome::Rejected`]. Source failures
//! come back as [`AnalysisError::Source`]:
//!
//! ```rust
//! use stockscope_core::{AnalysisError, SourceErrorKind};
//!
//! fn describe(error: &AnalysisError) -> &'static str {
//!     match error {
//!         AnalysisError::NoSelection => "pick a security first",
//!         AnalysisError::Source(source) => match source.kind() {
//!             SourceErrorKind::NotFound => "unknown security",
//!             SourceErrorKind::Unavailable => "backend unreachable",
//!             _ => "request failed",
//!         },
//!     }
//! }
//! ```

pub mod adapters;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod notifier;
pub mod orchestrator;
pub mod selection;
pub mod validator;

pub use adapters::{FixtureSource, RestSource};

pub use clock::{Clock, FixedClock, SystemClock};

pub use config::{AnalysisContext, AnalysisDefaults, SourceBuilder};

pub use data_source::{
    AnalysisSource, BarsRequest, DateIntervalRequest, Endpoint, QuarterRequest, SourceError,
    SourceErrorKind, SourceFuture,
};

pub use domain::{
    days_before, format_date, months_before, parse_date, AdjustmentMode, Bar, BarPeriod,
    BarSeries, DailyBar, DateIntervalBundle, DateRange, FiscalPeriod, InputShape, Quarter,
    QuarterBundle, SecurityId, SecurityInfo, SecurityKind, StatementBundles, StatementType,
    WeeklyBar,
};

pub use error::{AnalysisError, RangeViolation, ValidationError};

pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use notifier::{CollectingNotifier, Notifier, TracingNotifier};

pub use orchestrator::{
    FetchOutcome, QuoteOrchestrator, QuoteState, StatementOrchestrator, StatementState,
};

pub use selection::{Generation, StockSelection};
