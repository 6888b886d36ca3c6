//! Contract every [`AnalysisSource`] implementation must honour.
//!
//! The REST source is driven by an in-process HTTP stub that routes on the
//! request path, so both implementations run the same checks offline.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use stockscope_core::{
    AdjustmentMode, AnalysisSource, BarPeriod, BarsRequest, DateIntervalRequest, DateRange,
    FiscalPeriod, FixtureSource, HttpClient, HttpError, HttpRequest, HttpResponse, InputShape,
    Quarter, QuarterRequest, RestSource, SecurityId, SecurityKind, SourceErrorKind,
    StatementType,
};
use time::macros::date;

const DAILY_ROWS: &str = r#"[
    {"date":"2024-02-05","opening":10.2,"closing":10.4,"highest":10.6,"lowest":10.1,"volume":900,"turnover":9300.0},
    {"date":"2024-02-01","opening":10.0,"closing":10.1,"highest":10.2,"lowest":9.9,"volume":1000,"turnover":10100.0,"turnoverRate":0.3},
    {"date":"2024-02-02","opening":10.1,"closing":10.2,"highest":10.3,"lowest":10.0,"volume":1100,"turnover":11200.0}
]"#;

const WEEKLY_ROWS: &str = r#"[
    {"date":"2024-02-09","opening":10.1,"closing":10.5,"highest":10.8,"lowest":9.9,"volume":5000,"turnover":51000.0},
    {"date":"2024-02-02","opening":9.8,"closing":10.1,"highest":10.3,"lowest":9.7,"volume":4800,"turnover":48000.0}
]"#;

const INFO: &str = r#"{
    "id":"sh.600000","name":"Pudong Development Bank","type":"stock",
    "industry":"banking","classification":"J66",
    "listedDate":"1999-11-10","delistedDate":null
}"#;

const INTERVAL: &str = r#"{
    "performance_express":[{"reportDate":"2024-04-20","netProfit":1.2}],
    "performance_forecast":[],
    "profitability":{"roe":0.1}
}"#;

const QUARTER: &str = r#"{
    "profitability":{"roe":0.11},"operation":{"turnover":0.4},"growth":{"yoy":0.05},
    "solvency":{"debtRatio":0.9},"cash_flow":{"ratio":0.2},"dupont":{"roe":0.11}
}"#;

/// HTTP stub answering by path; any id starting with `missing` is a 404.
struct RoutedHttpClient;

impl RoutedHttpClient {
    fn route(url: &str) -> HttpResponse {
        let body = if url.contains("/stocks/missing") {
            return HttpResponse {
                status: 404,
                body: String::from("{}"),
            };
        } else if url.ends_with("/history/day") {
            DAILY_ROWS
        } else if url.ends_with("/history/period") {
            WEEKLY_ROWS
        } else if url.ends_with("/statements/interval") {
            INTERVAL
        } else if url.ends_with("/statements/quarter") {
            QUARTER
        } else {
            INFO
        };
        HttpResponse::ok_json(body)
    }
}

impl HttpClient for RoutedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = Self::route(&request.url);
        Box::pin(async move { Ok(response) })
    }
}

struct SourceCase {
    source: Arc<dyn AnalysisSource>,
}

fn source_cases() -> Vec<SourceCase> {
    vec![
        SourceCase {
            source: Arc::new(FixtureSource::new()),
        },
        SourceCase {
            source: Arc::new(RestSource::with_http_client(
                "https://analysis.test/api",
                Arc::new(RoutedHttpClient),
            )),
        },
    ]
}

fn security(id: &str) -> SecurityId {
    SecurityId::parse(id).expect("valid security id")
}

fn february() -> DateRange {
    DateRange::new(date!(2024 - 02 - 01), date!(2024 - 02 - 29))
}

#[tokio::test]
async fn security_info_describes_the_requested_security() {
    for case in source_cases() {
        let name = case.source.name();
        let info = case
            .source
            .security_info(&security("sh.600000"))
            .await
            .unwrap_or_else(|error| panic!("source '{name}' info failed: {error}"));

        assert_eq!(info.id.as_str(), "sh.600000", "source '{name}': id");
        assert!(!info.name.is_empty(), "source '{name}': name present");
        assert_eq!(info.kind, SecurityKind::Stock, "source '{name}': kind");
        assert!(info.delisted_date.is_none(), "source '{name}': still listed");
    }
}

#[tokio::test]
async fn bar_series_are_chronological_and_echo_the_request() {
    for case in source_cases() {
        let name = case.source.name();
        for mode in AdjustmentMode::ALL {
            let daily = case
                .source
                .daily_bars(BarsRequest::daily(security("sh.600000"), february(), mode))
                .await
                .unwrap_or_else(|error| panic!("source '{name}' daily failed: {error}"));
            let weekly = case
                .source
                .weekly_bars(BarsRequest::weekly(security("sh.600000"), february(), mode))
                .await
                .unwrap_or_else(|error| panic!("source '{name}' weekly failed: {error}"));

            for (series, period) in [(&daily, BarPeriod::Day), (&weekly, BarPeriod::Week)] {
                assert_eq!(series.period, period, "source '{name}': period");
                assert_eq!(series.adjustment, mode, "source '{name}': adjustment");
                assert_eq!(series.security.as_str(), "sh.600000");
                assert!(!series.is_empty(), "source '{name}': {period} bars present");
                assert!(
                    series.bars.windows(2).all(|pair| pair[0].date < pair[1].date),
                    "source '{name}': {period} bars chronological"
                );
                assert!(series
                    .bars
                    .iter()
                    .all(|bar| bar.low <= bar.open.min(bar.close) && bar.high >= bar.open.max(bar.close)));
            }
        }
    }
}

#[tokio::test]
async fn date_interval_bundle_holds_only_date_range_types() {
    for case in source_cases() {
        let name = case.source.name();
        let bundle = case
            .source
            .date_interval_statement(DateIntervalRequest {
                security: security("sz.000001"),
                range: february(),
            })
            .await
            .unwrap_or_else(|error| panic!("source '{name}' interval failed: {error}"));

        let expected: Vec<_> = StatementType::with_shape(InputShape::DateRange).collect();
        assert_eq!(bundle.types().collect::<Vec<_>>(), expected, "source '{name}'");
    }
}

#[tokio::test]
async fn quarter_bundle_holds_only_fiscal_period_types() {
    for case in source_cases() {
        let name = case.source.name();
        let bundle = case
            .source
            .quarter_statement(QuarterRequest {
                security: security("sz.000001"),
                period: FiscalPeriod::new(2023, Quarter::Q4),
            })
            .await
            .unwrap_or_else(|error| panic!("source '{name}' quarter failed: {error}"));

        let expected: Vec<_> = StatementType::with_shape(InputShape::FiscalPeriod).collect();
        assert_eq!(bundle.types().collect::<Vec<_>>(), expected, "source '{name}'");
    }
}

#[tokio::test]
async fn unknown_security_is_not_found_on_every_endpoint() {
    let unknown = security("missing.1");
    for case in source_cases() {
        let name = case.source.name();
        let source = &case.source;

        let errors = [
            source.security_info(&unknown).await.err(),
            source
                .daily_bars(BarsRequest::daily(unknown.clone(), february(), AdjustmentMode::None))
                .await
                .err(),
            source
                .weekly_bars(BarsRequest::weekly(unknown.clone(), february(), AdjustmentMode::None))
                .await
                .err(),
            source
                .date_interval_statement(DateIntervalRequest {
                    security: unknown.clone(),
                    range: february(),
                })
                .await
                .err(),
            source
                .quarter_statement(QuarterRequest {
                    security: unknown.clone(),
                    period: FiscalPeriod::new(2023, Quarter::Q4),
                })
                .await
                .err(),
        ];

        for error in errors {
            let error = error.unwrap_or_else(|| panic!("source '{name}' accepted unknown id"));
            assert_eq!(error.kind(), SourceErrorKind::NotFound, "source '{name}'");
            assert!(!error.message().is_empty());
        }
    }
}
