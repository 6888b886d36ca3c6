use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Iso8601;
use time::{Date, Duration, Month};

use crate::ValidationError;

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), &Iso8601::DATE).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    // Four-digit years always format; anything else is outside the supported calendar.
    date.format(&Iso8601::DATE)
        .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()))
}

/// `date` minus `days`, saturating at the representable calendar bounds.
pub fn days_before(date: Date, days: i64) -> Date {
    let bound = if days >= 0 { Date::MIN } else { Date::MAX };
    days.checked_mul(86_400)
        .map(Duration::seconds)
        .and_then(|span| date.checked_sub(span))
        .unwrap_or(bound)
}

/// `date` minus whole calendar months; the day is clamped to the target month's length.
pub fn months_before(date: Date, months: u32) -> Date {
    let total = i64::from(date.year()) * 12 + i64::from(u8::from(date.month()))
        - 1
        - i64::from(months);
    let Ok(year) = i32::try_from(total.div_euclid(12)) else {
        return Date::MIN;
    };
    let month = match u8::try_from(total.rem_euclid(12) + 1)
        .ok()
        .and_then(|value| Month::try_from(value).ok())
    {
        Some(month) => month,
        None => return Date::MIN,
    };

    let mut day = date.day();
    loop {
        if let Ok(clamped) = Date::from_calendar_date(year, month, day) {
            return clamped;
        }
        if day <= 28 {
            return Date::MIN;
        }
        day -= 1;
    }
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub mod iso_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }

    /// Same format for optional dates; empty strings read as `None`.
    pub mod option {
        use serde::de::Error as DeError;
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(date) => serializer.serialize_some(&super::super::format_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<String>::deserialize(deserializer)?;
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(raw) => super::super::parse_date(raw)
                    .map(Some)
                    .map_err(D::Error::custom),
            }
        }
    }
}

/// Inclusive calendar interval. Not validated on construction: drafts with
/// `begin > end` are representable until the range validator checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "iso_date")]
    pub begin: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

impl DateRange {
    pub const fn new(begin: Date, end: Date) -> Self {
        Self { begin, end }
    }

    /// `[today - days, today]`.
    pub fn trailing_days(today: Date, days: i64) -> Self {
        Self::new(days_before(today, days), today)
    }

    /// `[today - months, today]`.
    pub fn trailing_months(today: Date, months: u32) -> Self {
        Self::new(months_before(today, months), today)
    }

    pub fn contains(&self, date: Date) -> bool {
        self.begin <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", format_date(self.begin), format_date(self.end))
    }
}

/// Fiscal quarter; declaration order is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    pub const fn number(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    pub fn from_month(month: Month) -> Self {
        match u8::from(month) {
            1..=3 => Self::Q1,
            4..=6 => Self::Q2,
            7..=9 => Self::Q3,
            _ => Self::Q4,
        }
    }
}

impl Display for Quarter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl TryFrom<u8> for Quarter {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Q1),
            2 => Ok(Self::Q2),
            3 => Ok(Self::Q3),
            4 => Ok(Self::Q4),
            other => Err(ValidationError::InvalidQuarter {
                value: other.to_string(),
            }),
        }
    }
}

impl From<Quarter> for u8 {
    fn from(value: Quarter) -> Self {
        value.number()
    }
}

impl FromStr for Quarter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidQuarter {
                value: value.to_owned(),
            })
            .and_then(Self::try_from)
    }
}

/// A reporting quarter. Ordering is chronological (year, then quarter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub year: i32,
    pub quarter: Quarter,
}

impl FiscalPeriod {
    pub const fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    /// The quarter `date` falls in.
    pub fn containing(date: Date) -> Self {
        Self::new(date.year(), Quarter::from_month(date.month()))
    }

    pub fn previous(self) -> Self {
        match self.quarter {
            Quarter::Q1 => Self::new(self.year - 1, Quarter::Q4),
            Quarter::Q2 => Self::new(self.year, Quarter::Q1),
            Quarter::Q3 => Self::new(self.year, Quarter::Q2),
            Quarter::Q4 => Self::new(self.year, Quarter::Q3),
        }
    }

    pub const fn with_year(self, year: i32) -> Self {
        Self::new(year, self.quarter)
    }

    pub const fn with_quarter(self, quarter: Quarter) -> Self {
        Self::new(self.year, quarter)
    }
}

impl Display for FiscalPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.year, self.quarter)
    }
}
