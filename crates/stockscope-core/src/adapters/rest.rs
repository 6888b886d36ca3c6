use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use time::Date;

use super::validation_to_error;
use crate::config::DEFAULT_TIMEOUT_MS;
use crate::data_source::{
    AnalysisSource, BarsRequest, DateIntervalRequest, Endpoint, QuarterRequest, SourceError,
    SourceFuture,
};
use crate::domain::calendar::iso_date;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{
    format_date, Bar, BarSeries, DateIntervalBundle, InputShape, QuarterBundle, SecurityId,
    SecurityInfo, StatementType,
};

/// Analysis backend reached over HTTP.
///
/// Every call is a single GET; non-2xx statuses, transport failures and
/// malformed bodies are mapped onto [`SourceError`] kinds.
#[derive(Clone)]
pub struct RestSource {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    timeout_ms: u64,
}

impl RestSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn with_http_client(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http_client,
            auth: HttpAuth::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn security_url(&self, security: &SecurityId) -> String {
        format!(
            "{}/stocks/{}",
            self.base_url,
            urlencoding::encode(security.as_str())
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: HttpRequest,
    ) -> Result<T, SourceError> {
        let request = request
            .with_auth(&self.auth)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);
        let url = request.full_url();
        tracing::debug!(%endpoint, %url, "issuing request");

        let response = self.http_client.execute(request).await.map_err(|error| {
            SourceError::unavailable(format!("{endpoint} transport error: {}", error.message()))
        })?;

        if !response.is_success() {
            return Err(status_to_error(endpoint, response.status));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            SourceError::internal(format!("{endpoint} returned malformed body: {error}"))
        })
    }

    async fn fetch_bars(&self, endpoint: Endpoint, req: BarsRequest) -> Result<BarSeries, SourceError> {
        let base = self.security_url(&req.security);
        let request = match endpoint {
            Endpoint::WeeklyBars => HttpRequest::get(format!("{base}/history/period"))
                .with_query("begin", format_date(req.range.begin))
                .with_query("end", format_date(req.range.end))
                .with_query("period", req.period.as_str()),
            _ => HttpRequest::get(format!("{base}/history/day"))
                .with_query("begin", format_date(req.range.begin))
                .with_query("end", format_date(req.range.end)),
        }
        .with_query("adjustment", req.adjustment.as_str());

        let rows: Vec<BarRow> = self.get_json(endpoint, request).await?;
        series_from_rows(req, rows)
    }
}

impl AnalysisSource for RestSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn security_info<'a>(&'a self, security: &'a SecurityId) -> SourceFuture<'a, SecurityInfo> {
        Box::pin(async move {
            let request = HttpRequest::get(self.security_url(security));
            self.get_json(Endpoint::SecurityInfo, request).await
        })
    }

    fn daily_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        Box::pin(self.fetch_bars(Endpoint::DailyBars, req))
    }

    fn weekly_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        Box::pin(self.fetch_bars(Endpoint::WeeklyBars, req))
    }

    fn date_interval_statement<'a>(
        &'a self,
        req: DateIntervalRequest,
    ) -> SourceFuture<'a, DateIntervalBundle> {
        Box::pin(async move {
            let request = HttpRequest::get(format!(
                "{}/statements/interval",
                self.security_url(&req.security)
            ))
            .with_query("begin", format_date(req.range.begin))
            .with_query("end", format_date(req.range.end));

            let raw: BTreeMap<String, Value> = self
                .get_json(Endpoint::DateIntervalStatement, request)
                .await?;
            Ok(bundle_entries(raw, InputShape::DateRange).collect())
        })
    }

    fn quarter_statement<'a>(&'a self, req: QuarterRequest) -> SourceFuture<'a, QuarterBundle> {
        Box::pin(async move {
            let request = HttpRequest::get(format!(
                "{}/statements/quarter",
                self.security_url(&req.security)
            ))
            .with_query("year", req.period.year.to_string())
            .with_query("quarter", req.period.quarter.number().to_string());

            let raw: BTreeMap<String, Value> =
                self.get_json(Endpoint::QuarterStatement, request).await?;
            Ok(bundle_entries(raw, InputShape::FiscalPeriod).collect())
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BarRow {
    #[serde(with = "iso_date")]
    date: Date,
    opening: f64,
    closing: f64,
    highest: f64,
    lowest: f64,
    volume: u64,
    turnover: f64,
    #[serde(default)]
    turnover_rate: Option<f64>,
}

fn series_from_rows(req: BarsRequest, mut rows: Vec<BarRow>) -> Result<BarSeries, SourceError> {
    rows.sort_by_key(|row| row.date);
    let bars = rows
        .into_iter()
        .map(|row| {
            Bar::new(
                row.date,
                row.opening,
                row.highest,
                row.lowest,
                row.closing,
                row.volume,
                row.turnover,
                row.turnover_rate,
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(validation_to_error)?;

    BarSeries::new(req.security, req.period, req.adjustment, bars).map_err(validation_to_error)
}

/// Entries keyed by a known wire name and served by `shape`; anything else is dropped.
fn bundle_entries(
    raw: BTreeMap<String, Value>,
    shape: InputShape,
) -> impl Iterator<Item = (StatementType, Value)> {
    raw.into_iter().filter_map(move |(key, value)| match key.parse::<StatementType>() {
        Ok(kind) if kind.input_shape() == shape => Some((kind, value)),
        _ => {
            tracing::debug!(key = %key, "ignoring unexpected statement entry");
            None
        }
    })
}

fn status_to_error(endpoint: Endpoint, status: u16) -> SourceError {
    let message = format!("{endpoint} upstream returned status {status}");
    match status {
        404 => SourceError::not_found(message),
        400..=499 => SourceError::invalid_request(message),
        _ => SourceError::unavailable(message),
    }
}
