//! Range rules applied before any fetch is issued.
//!
//! | Rule | Check | Violation |
//! |------|-------|-----------|
//! | Date range | `begin <= end` | [`RangeViolation::BeginAfterEnd`] |
//! | Fiscal period | strictly before the quarter containing today | [`RangeViolation::CurrentOrFutureQuarter`] |
//! | Future date | strictly before today | [`RangeViolation::FutureDate`] |
//!
//! All functions are pure; "today" is always passed in.

use time::Date;

use crate::{DateRange, FiscalPeriod, RangeViolation};

pub fn check_date_range(range: &DateRange) -> Result<(), RangeViolation> {
    if range.begin > range.end {
        return Err(RangeViolation::BeginAfterEnd);
    }
    Ok(())
}

/// Accepts only periods that ended before the current quarter began.
pub fn check_fiscal_period(period: FiscalPeriod, today: Date) -> Result<(), RangeViolation> {
    if period >= FiscalPeriod::containing(today) {
        return Err(RangeViolation::CurrentOrFutureQuarter);
    }
    Ok(())
}

/// Entry guard for a single date endpoint; today itself counts as the future.
pub fn reject_future_date(date: Date, today: Date) -> Result<(), RangeViolation> {
    if date >= today {
        return Err(RangeViolation::FutureDate);
    }
    Ok(())
}
