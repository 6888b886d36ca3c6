use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::calendar::{format_date, iso_date};
use crate::{SecurityId, ValidationError};

/// Price-adjustment convention for historical bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentMode {
    #[default]
    None,
    /// Forward-adjusted.
    Pre,
    /// Backward-adjusted.
    Post,
}

impl AdjustmentMode {
    pub const ALL: [Self; 3] = [Self::None, Self::Pre, Self::Post];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

impl Display for AdjustmentMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            other => Err(ValidationError::InvalidAdjustmentMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Bucket size of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarPeriod {
    Day,
    Week,
}

impl BarPeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl Display for BarPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    Stock,
    Index,
}

/// Descriptive metadata snapshot for a security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub id: SecurityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SecurityKind,
    pub industry: Option<String>,
    pub classification: Option<String>,
    #[serde(with = "iso_date")]
    pub listed_date: Date,
    #[serde(default, with = "iso_date::option")]
    pub delisted_date: Option<Date>,
}

impl SecurityInfo {
    pub fn is_delisted_on(&self, date: Date) -> bool {
        self.delisted_date.is_some_and(|delisted| delisted <= date)
    }
}

/// OHLC bar with volume, turnover and turnover rate, keyed by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub turnover: f64,
    /// Percent of float traded.
    pub turnover_rate: Option<f64>,
}

pub type DailyBar = Bar;
pub type WeeklyBar = Bar;

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        turnover: f64,
        turnover_rate: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        validate_non_negative("turnover", turnover)?;
        if let Some(rate) = turnover_rate {
            validate_non_negative("turnover_rate", rate)?;
        }

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            turnover,
            turnover_rate,
        })
    }
}

/// Chronological bars for one security, period and adjustment mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub security: SecurityId,
    pub period: BarPeriod,
    pub adjustment: AdjustmentMode,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        security: SecurityId,
        period: BarPeriod,
        adjustment: AdjustmentMode,
        bars: Vec<Bar>,
    ) -> Result<Self, ValidationError> {
        if let Some(pair) = bars.windows(2).find(|pair| pair[1].date <= pair[0].date) {
            return Err(ValidationError::UnorderedBars {
                date: format_date(pair[1].date),
            });
        }

        Ok(Self {
            security,
            period,
            adjustment,
            bars,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.bars.last().map(|bar| bar.date)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
