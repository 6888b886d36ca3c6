use serde_json::{json, Value};
use time::{Date, Duration, Month, Weekday};

use super::validation_to_error;
use crate::data_source::{
    AnalysisSource, BarsRequest, DateIntervalRequest, QuarterRequest, SourceError, SourceFuture,
};
use crate::{
    format_date, AdjustmentMode, Bar, BarPeriod, BarSeries, DateIntervalBundle, DateRange,
    FiscalPeriod, InputShape, QuarterBundle, SecurityId, SecurityInfo, SecurityKind,
    StatementType,
};

const MISSING_PREFIX: &str = "missing";
const INDUSTRIES: [&str; 5] = ["Banking", "Utilities", "Semiconductors", "Consumer staples", "Pharmaceuticals"];

/// Offline source producing deterministic data seeded by the security id.
///
/// Ids beginning with `missing` answer every call with a not-found error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSource;

impl FixtureSource {
    pub fn new() -> Self {
        Self
    }
}

impl AnalysisSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn security_info<'a>(&'a self, security: &'a SecurityId) -> SourceFuture<'a, SecurityInfo> {
        Box::pin(async move {
            ensure_known(security)?;
            let seed = security_seed(security);
            let kind = if security.as_str().starts_with("idx") {
                SecurityKind::Index
            } else {
                SecurityKind::Stock
            };
            let base = Date::from_calendar_date(1995, Month::January, 3)
                .map_err(|error| SourceError::internal(error.to_string()))?;

            Ok(SecurityInfo {
                id: security.clone(),
                name: format!("Fixture {}", security.as_str().to_ascii_uppercase()),
                kind,
                industry: (kind == SecurityKind::Stock)
                    .then(|| INDUSTRIES[(seed % INDUSTRIES.len() as u64) as usize].to_owned()),
                classification: Some(String::from(if seed % 2 == 0 { "main board" } else { "growth board" })),
                listed_date: base + Duration::days((seed % 7_000) as i64),
                delisted_date: None,
            })
        })
    }

    fn daily_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        Box::pin(async move {
            ensure_known(&req.security)?;
            ensure_ordered(req.range)?;
            let bars = daily_rows(&req)?;
            BarSeries::new(req.security, BarPeriod::Day, req.adjustment, bars).map_err(validation_to_error)
        })
    }

    fn weekly_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        Box::pin(async move {
            ensure_known(&req.security)?;
            ensure_ordered(req.range)?;
            let bars = weekly_rows(daily_rows(&req)?)?;
            BarSeries::new(req.security, BarPeriod::Week, req.adjustment, bars).map_err(validation_to_error)
        })
    }

    fn date_interval_statement<'a>(
        &'a self,
        req: DateIntervalRequest,
    ) -> SourceFuture<'a, DateIntervalBundle> {
        Box::pin(async move {
            ensure_known(&req.security)?;
            ensure_ordered(req.range)?;
            let seed = security_seed(&req.security);
            Ok(StatementType::with_shape(InputShape::DateRange)
                .map(|kind| (kind, interval_document(kind, seed, req.range)))
                .collect())
        })
    }

    fn quarter_statement<'a>(&'a self, req: QuarterRequest) -> SourceFuture<'a, QuarterBundle> {
        Box::pin(async move {
            ensure_known(&req.security)?;
            let seed = security_seed(&req.security);
            Ok(StatementType::with_shape(InputShape::FiscalPeriod)
                .map(|kind| (kind, quarter_document(kind, seed, req.period)))
                .collect())
        })
    }
}

fn ensure_known(security: &SecurityId) -> Result<(), SourceError> {
    if security.as_str().starts_with(MISSING_PREFIX) {
        return Err(SourceError::not_found(format!("unknown security '{security}'")));
    }
    Ok(())
}

fn ensure_ordered(range: DateRange) -> Result<(), SourceError> {
    if range.begin > range.end {
        return Err(SourceError::invalid_request(format!("range {range} is reversed")));
    }
    Ok(())
}

fn security_seed(security: &SecurityId) -> u64 {
    security
        .as_str()
        .bytes()
        .fold(17_u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)))
}

fn adjustment_factor(mode: AdjustmentMode) -> f64 {
    match mode {
        AdjustmentMode::None => 1.0,
        AdjustmentMode::Pre => 0.92,
        AdjustmentMode::Post => 1.35,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn daily_rows(req: &BarsRequest) -> Result<Vec<Bar>, SourceError> {
    let seed = security_seed(&req.security);
    let factor = adjustment_factor(req.adjustment);
    let base = 8.0 + (seed % 400) as f64 / 10.0;

    let mut bars = Vec::new();
    let mut day = req.range.begin;
    loop {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let step = u64::try_from(day.to_julian_day()).unwrap_or_default().wrapping_add(seed);
            let open = round2((base + (step % 17) as f64 * 0.12) * factor);
            let close = round2((open + ((step % 5) as f64 - 2.0) * 0.07 * factor).max(0.01));
            let high = round2(open.max(close) + 0.15 * factor);
            let low = round2((open.min(close) - 0.15 * factor).max(0.0));
            let volume = 100_000 + step % 50_000;
            let turnover = round2(volume as f64 * close);
            let turnover_rate = Some(round2(volume as f64 / 150_000.0));

            bars.push(
                Bar::new(day, open, high, low, close, volume, turnover, turnover_rate)
                    .map_err(validation_to_error)?,
            );
        }

        if day >= req.range.end {
            break;
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }

    Ok(bars)
}

/// One bar per ISO week, dated on the week's last trading day in range.
fn weekly_rows(daily: Vec<Bar>) -> Result<Vec<Bar>, SourceError> {
    let mut weeks: Vec<Vec<Bar>> = Vec::new();
    for bar in daily {
        let key = iso_week_key(bar.date);
        match weeks.last_mut() {
            Some(week) if week.first().map(|first| iso_week_key(first.date)) == Some(key) => {
                week.push(bar);
            }
            _ => weeks.push(vec![bar]),
        }
    }

    weeks
        .into_iter()
        .filter_map(|week| {
            let first = week.first()?;
            let last = week.last()?;
            let high = week.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
            let low = week.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
            let volume = week.iter().map(|bar| bar.volume).sum();
            let turnover = round2(week.iter().map(|bar| bar.turnover).sum());
            let turnover_rate = Some(round2(
                week.iter().filter_map(|bar| bar.turnover_rate).sum(),
            ));
            Some(
                Bar::new(last.date, first.open, high, low, last.close, volume, turnover, turnover_rate)
                    .map_err(validation_to_error),
            )
        })
        .collect()
}

fn iso_week_key(date: Date) -> (i32, u8) {
    let (year, week, _) = date.to_iso_week_date();
    (year, week)
}

fn ratio(seed: u64, salt: u64, scale: f64) -> f64 {
    round2(((seed.wrapping_add(salt)) % 1_000) as f64 / 1_000.0 * scale)
}

fn interval_document(kind: StatementType, seed: u64, range: DateRange) -> Value {
    match kind {
        StatementType::PerformanceExpress => json!([{
            "reportDate": format_date(range.end),
            "totalAssets": 1.0e9 + (seed % 9_000) as f64 * 1.0e6,
            "netProfit": 5.0e7 + (seed % 700) as f64 * 1.0e5,
            "epsDilutedYoy": ratio(seed, 11, 0.5),
            "roeWeighted": ratio(seed, 13, 0.25),
        }]),
        _ => json!([{
            "reportDate": format_date(range.end),
            "forecastType": if seed % 3 == 0 { "decrease" } else { "increase" },
            "netProfitChangeUpper": ratio(seed, 17, 1.2),
            "netProfitChangeLower": ratio(seed, 19, 0.6),
            "abstract": format!("forecast for {range}"),
        }]),
    }
}

fn quarter_document(kind: StatementType, seed: u64, period: FiscalPeriod) -> Value {
    let salt = u64::from(period.quarter.number()) + u64::try_from(period.year).unwrap_or_default();
    let figures = match kind {
        StatementType::Profitability => json!({
            "roeAvg": ratio(seed, salt, 0.3),
            "npMargin": ratio(seed, salt + 1, 0.4),
            "gpMargin": ratio(seed, salt + 2, 0.6),
            "epsTtm": ratio(seed, salt + 3, 3.0),
        }),
        StatementType::Operation => json!({
            "nrTurnRatio": ratio(seed, salt, 20.0),
            "invTurnRatio": ratio(seed, salt + 1, 8.0),
            "assetTurnRatio": ratio(seed, salt + 2, 1.5),
        }),
        StatementType::Growth => json!({
            "yoyEquity": ratio(seed, salt, 0.4),
            "yoyAsset": ratio(seed, salt + 1, 0.3),
            "yoyNi": ratio(seed, salt + 2, 0.5),
        }),
        StatementType::Solvency => json!({
            "currentRatio": ratio(seed, salt, 3.0),
            "quickRatio": ratio(seed, salt + 1, 2.0),
            "liabilityToAsset": ratio(seed, salt + 2, 0.9),
        }),
        StatementType::CashFlow => json!({
            "caToAsset": ratio(seed, salt, 0.8),
            "cfoToOr": ratio(seed, salt + 1, 0.4),
            "cfoToNp": ratio(seed, salt + 2, 2.0),
        }),
        _ => json!({
            "dupontRoe": ratio(seed, salt, 0.3),
            "dupontAssetStoEquity": ratio(seed, salt + 1, 12.0),
            "dupontAssetTurn": ratio(seed, salt + 2, 0.2),
            "dupontNitogr": ratio(seed, salt + 3, 0.5),
        }),
    };

    json!({
        "year": period.year,
        "quarter": period.quarter.number(),
        "figures": figures,
    })
}
