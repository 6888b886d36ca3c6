use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationError;

/// Input a statement type is aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    DateRange,
    FiscalPeriod,
}

/// Financial statement category, in display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    #[default]
    Profitability,
    Operation,
    Growth,
    Solvency,
    CashFlow,
    Dupont,
    PerformanceExpress,
    PerformanceForecast,
}

impl StatementType {
    pub const ALL: [Self; 8] = [
        Self::Profitability,
        Self::Operation,
        Self::Growth,
        Self::Solvency,
        Self::CashFlow,
        Self::Dupont,
        Self::PerformanceExpress,
        Self::PerformanceForecast,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profitability => "profitability",
            Self::Operation => "operation",
            Self::Growth => "growth",
            Self::Solvency => "solvency",
            Self::CashFlow => "cash_flow",
            Self::Dupont => "dupont",
            Self::PerformanceExpress => "performance_express",
            Self::PerformanceForecast => "performance_forecast",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Profitability => "Profitability",
            Self::Operation => "Operation capability",
            Self::Growth => "Growth",
            Self::Solvency => "Solvency",
            Self::CashFlow => "Cash flow",
            Self::Dupont => "DuPont analysis",
            Self::PerformanceExpress => "Performance express report",
            Self::PerformanceForecast => "Performance forecast",
        }
    }

    pub const fn input_shape(self) -> InputShape {
        match self {
            Self::PerformanceExpress | Self::PerformanceForecast => InputShape::DateRange,
            _ => InputShape::FiscalPeriod,
        }
    }

    /// Types served by the bundle for `shape`, in display order.
    pub fn with_shape(shape: InputShape) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |kind| kind.input_shape() == shape)
    }
}

impl Display for StatementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidStatementType {
                value: value.to_owned(),
            })
    }
}

/// Statement figures aggregated over an explicit date interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateIntervalBundle(BTreeMap<StatementType, Value>);

/// Statement figures for a single fiscal quarter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuarterBundle(BTreeMap<StatementType, Value>);

macro_rules! bundle_accessors {
    ($bundle:ident) => {
        impl $bundle {
            pub fn new(entries: BTreeMap<StatementType, Value>) -> Self {
                Self(entries)
            }

            pub fn get(&self, kind: StatementType) -> Option<&Value> {
                self.0.get(&kind)
            }

            pub fn types(&self) -> impl Iterator<Item = StatementType> + '_ {
                self.0.keys().copied()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl FromIterator<(StatementType, Value)> for $bundle {
            fn from_iter<I: IntoIterator<Item = (StatementType, Value)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

bundle_accessors!(DateIntervalBundle);
bundle_accessors!(QuarterBundle);

/// The committed bundle pair. Only ever stored or cleared as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementBundles {
    pub date_interval: DateIntervalBundle,
    pub quarter: QuarterBundle,
}

impl StatementBundles {
    /// Figures for `kind` from whichever bundle serves its input shape.
    pub fn figures(&self, kind: StatementType) -> Option<&Value> {
        match kind.input_shape() {
            InputShape::DateRange => self.date_interval.get(kind),
            InputShape::FiscalPeriod => self.quarter.get(kind),
        }
    }
}
