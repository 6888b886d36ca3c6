//! Source selection, default ranges and the shared orchestrator context.

use std::env;
use std::sync::Arc;

use time::Date;

use crate::adapters::{FixtureSource, RestSource};
use crate::clock::{Clock, SystemClock};
use crate::data_source::AnalysisSource;
use crate::http_client::{HttpAuth, HttpClient, ReqwestHttpClient};
use crate::notifier::{Notifier, TracingNotifier};
use crate::{months_before, DateRange, FiscalPeriod};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Builds the [`AnalysisSource`] the orchestrators fetch through.
///
/// # Example
///
/// ```rust,ignore
/// use stockscope_core::SourceBuilder;
///
/// // REST backend configured from STOCKSCOPE_API_BASE_URL / STOCKSCOPE_API_TOKEN
/// let source = SourceBuilder::new().from_env().build();
///
/// // Deterministic offline data
/// let fixture = SourceBuilder::new().with_mock_mode().build();
/// ```
#[derive(Default)]
pub struct SourceBuilder {
    use_mock: bool,
    base_url: Option<String>,
    token: Option<String>,
    timeout_ms: Option<u64>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mock_mode(mut self) -> Self {
        self.use_mock = true;
        self
    }

    pub fn with_mock(mut self, use_mock: bool) -> Self {
        self.use_mock = use_mock;
        self
    }

    /// Fills unset values from the environment.
    ///
    /// The base URL comes from `STOCKSCOPE_API_BASE_URL`, falling back to
    /// `WIND_API_BASE_URL`; the token from `STOCKSCOPE_API_TOKEN`.
    pub fn from_env(mut self) -> Self {
        if self.base_url.is_none() {
            self.base_url = env::var("STOCKSCOPE_API_BASE_URL")
                .or_else(|_| env::var("WIND_API_BASE_URL"))
                .ok()
                .filter(|value| !value.trim().is_empty());
        }
        if self.token.is_none() {
            self.token = env::var("STOCKSCOPE_API_TOKEN")
                .ok()
                .filter(|value| !value.trim().is_empty());
        }
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn build(self) -> Arc<dyn AnalysisSource> {
        if self.use_mock {
            tracing::debug!("using fixture source");
            return Arc::new(FixtureSource::new());
        }

        let base_url = self.base_url().to_owned();
        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestHttpClient::new()),
        };
        let auth = self.token.map_or(HttpAuth::None, HttpAuth::BearerToken);

        tracing::debug!(%base_url, "using rest source");
        Arc::new(
            RestSource::with_http_client(base_url, http_client)
                .with_auth(auth)
                .with_timeout_ms(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)),
        )
    }
}

/// Lookback lengths used to seed the initial ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisDefaults {
    pub candle_lookback_days: i64,
    pub week_lookback_months: u32,
    pub statement_lookback_days: i64,
    /// The default fiscal period is the quarter containing `today` minus this many months.
    pub statement_quarter_lag_months: u32,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            candle_lookback_days: 30,
            week_lookback_months: 6,
            statement_lookback_days: 30,
            statement_quarter_lag_months: 3,
        }
    }
}

impl AnalysisDefaults {
    /// Defaults overridden by `STOCKSCOPE_*_LOOKBACK_*` variables; unparsable or
    /// negative values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            candle_lookback_days: env_lookback_days("STOCKSCOPE_CANDLE_LOOKBACK_DAYS")
                .unwrap_or(defaults.candle_lookback_days),
            week_lookback_months: env_number("STOCKSCOPE_WEEK_LOOKBACK_MONTHS")
                .unwrap_or(defaults.week_lookback_months),
            statement_lookback_days: env_lookback_days("STOCKSCOPE_STATEMENT_LOOKBACK_DAYS")
                .unwrap_or(defaults.statement_lookback_days),
            ..defaults
        }
    }

    pub fn candle_range(&self, today: Date) -> DateRange {
        DateRange::trailing_days(today, self.candle_lookback_days)
    }

    pub fn week_range(&self, today: Date) -> DateRange {
        DateRange::trailing_months(today, self.week_lookback_months)
    }

    pub fn statement_range(&self, today: Date) -> DateRange {
        DateRange::trailing_days(today, self.statement_lookback_days)
    }

    pub fn statement_period(&self, today: Date) -> FiscalPeriod {
        FiscalPeriod::containing(months_before(today, self.statement_quarter_lag_months))
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    parse_setting(name, &env::var(name).ok()?)
}

fn env_lookback_days(name: &str) -> Option<i64> {
    parse_lookback_days(name, &env::var(name).ok()?)
}

fn parse_setting<T: std::str::FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

fn parse_lookback_days(name: &str, raw: &str) -> Option<i64> {
    let days: i64 = parse_setting(name, raw)?;
    if days < 0 {
        tracing::warn!(variable = name, value = days, "ignoring negative lookback");
        return None;
    }
    Some(days)
}

/// Collaborators shared by both orchestrators.
#[derive(Clone)]
pub struct AnalysisContext {
    source: Arc<dyn AnalysisSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    defaults: AnalysisDefaults,
}

impl AnalysisContext {
    /// Context with the tracing notifier, the system clock and default lookbacks.
    pub fn new(source: Arc<dyn AnalysisSource>) -> Self {
        Self {
            source,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(SystemClock),
            defaults: AnalysisDefaults::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_defaults(mut self, defaults: AnalysisDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn source(&self) -> &dyn AnalysisSource {
        self.source.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn defaults(&self) -> &AnalysisDefaults {
        &self.defaults
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }
}
