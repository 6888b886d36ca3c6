//! Property tests for the range rules.
//!
//! Uses proptest to verify:
//! 1. Reversed date ranges are rejected and never reach the source
//! 2. Fiscal periods at or after the current quarter are rejected
//! 3. Endpoint setters refuse today and later, leaving state untouched

mod support;

use proptest::prelude::*;
use stockscope_core::validator::{check_date_range, check_fiscal_period, reject_future_date};
use stockscope_core::{
    DateRange, FetchOutcome, FiscalPeriod, Quarter, QuoteOrchestrator, RangeViolation,
    StatementOrchestrator,
};
use support::{harness, security, TODAY};
use time::macros::date;
use time::{Date, Duration};

// ── Strategies ───────────────────────────────────────────────────────

const EPOCH: Date = date!(2000 - 01 - 01);

fn arb_date() -> impl Strategy<Value = Date> {
    (0_i64..12_000).prop_map(|offset| EPOCH + Duration::days(offset))
}

/// Dates strictly before [`TODAY`].
fn arb_past_date() -> impl Strategy<Value = Date> {
    let span = (TODAY - EPOCH).whole_days();
    (0_i64..span).prop_map(|offset| EPOCH + Duration::days(offset))
}

fn arb_quarter() -> impl Strategy<Value = Quarter> {
    prop::sample::select(Quarter::ALL.to_vec())
}

fn arb_period() -> impl Strategy<Value = FiscalPeriod> {
    (1995_i32..2035, arb_quarter()).prop_map(|(year, quarter)| FiscalPeriod::new(year, quarter))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime builds")
}

// ── 1. Date ranges ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn range_is_valid_exactly_when_begin_is_not_after_end(
        begin in arb_date(),
        end in arb_date(),
    ) {
        let verdict = check_date_range(&DateRange::new(begin, end));
        if begin > end {
            prop_assert_eq!(verdict, Err(RangeViolation::BeginAfterEnd));
        } else {
            prop_assert_eq!(verdict, Ok(()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A reversed statement range is refused before either bundle is requested.
    #[test]
    fn reversed_statement_range_issues_no_calls(
        end in arb_past_date(),
        gap in 1_i64..400,
    ) {
        let begin = end + Duration::days(gap);
        prop_assume!(begin < TODAY);

        let h = harness();
        let statement = StatementOrchestrator::new(h.context.clone());
        statement.select_security(Some(security("sh.600000")));
        statement.set_begin_date(begin).expect("past begin accepted");
        statement.set_end_date(end).expect("past end accepted");

        let outcome = runtime()
            .block_on(statement.fetch_data())
            .expect("validation is not a source error");

        prop_assert_eq!(outcome, FetchOutcome::Rejected(RangeViolation::BeginAfterEnd));
        prop_assert_eq!(h.source.call_count(), 0);
        prop_assert!(statement.snapshot().bundles.is_none());
    }

    /// A reversed candle range on apply issues no bar calls.
    #[test]
    fn reversed_candle_range_issues_no_calls(
        end in arb_past_date(),
        gap in 1_i64..400,
    ) {
        let begin = end + Duration::days(gap);
        prop_assume!(begin < TODAY);

        let h = harness();
        let quote = QuoteOrchestrator::new(h.context.clone());
        let runtime = runtime();
        runtime
            .block_on(quote.select_security(Some(security("sh.600000"))))
            .expect("initial switch succeeds");
        let before = quote.snapshot();
        let calls = h.source.call_count();

        quote.set_candle_begin(begin).expect("past begin accepted");
        quote.set_candle_end(end).expect("past end accepted");
        let outcome = runtime
            .block_on(quote.apply_date_range())
            .expect("validation is not a source error");

        prop_assert_eq!(outcome, FetchOutcome::Rejected(RangeViolation::BeginAfterEnd));
        prop_assert_eq!(h.source.call_count(), calls);
        let after = quote.snapshot();
        prop_assert_eq!(after.daily, before.daily);
        prop_assert_eq!(after.weekly, before.weekly);
    }
}

// ── 2. Fiscal periods ────────────────────────────────────────────────

proptest! {
    #[test]
    fn period_is_valid_exactly_when_before_the_current_quarter(
        period in arb_period(),
        today in arb_date(),
    ) {
        let current = FiscalPeriod::containing(today);
        let verdict = check_fiscal_period(period, today);
        if period < current {
            prop_assert_eq!(verdict, Ok(()));
        } else {
            prop_assert_eq!(verdict, Err(RangeViolation::CurrentOrFutureQuarter));
        }
    }

    #[test]
    fn previous_quarter_is_always_selectable(today in arb_date()) {
        let previous = FiscalPeriod::containing(today).previous();
        prop_assert_eq!(check_fiscal_period(previous, today), Ok(()));
    }

    #[test]
    fn rejected_period_leaves_the_stored_period_alone(period in arb_period()) {
        prop_assume!(period >= FiscalPeriod::containing(TODAY));

        let h = harness();
        let statement = StatementOrchestrator::new(h.context.clone());
        let before = statement.snapshot().fiscal_period;

        prop_assert_eq!(
            statement.set_fiscal_period(period),
            Err(RangeViolation::CurrentOrFutureQuarter)
        );
        prop_assert_eq!(statement.snapshot().fiscal_period, before);
        prop_assert_eq!(h.notifier.messages().len(), 1);
    }
}

#[test]
fn mid_may_accepts_first_quarter_only() {
    // Given: today is 2024-05-15, inside 2024Q2
    // When / Then: 2024Q2 is rejected and 2024Q1 accepted
    assert_eq!(
        check_fiscal_period(FiscalPeriod::new(2024, Quarter::Q2), TODAY),
        Err(RangeViolation::CurrentOrFutureQuarter)
    );
    assert_eq!(
        check_fiscal_period(FiscalPeriod::new(2024, Quarter::Q1), TODAY),
        Ok(())
    );
}

// ── 3. Future endpoints ──────────────────────────────────────────────

proptest! {
    #[test]
    fn endpoint_is_accepted_exactly_when_before_today(
        date in arb_date(),
        today in arb_date(),
    ) {
        let verdict = reject_future_date(date, today);
        if date < today {
            prop_assert_eq!(verdict, Ok(()));
        } else {
            prop_assert_eq!(verdict, Err(RangeViolation::FutureDate));
        }
    }

    #[test]
    fn future_endpoint_never_changes_stored_ranges(ahead in 0_i64..2_000) {
        let future = TODAY + Duration::days(ahead);
        let h = harness();
        let quote = QuoteOrchestrator::new(h.context.clone());
        let statement = StatementOrchestrator::new(h.context.clone());
        let quote_before = quote.snapshot();
        let statement_before = statement.snapshot();

        prop_assert_eq!(quote.set_candle_begin(future), Err(RangeViolation::FutureDate));
        prop_assert_eq!(quote.set_candle_end(future), Err(RangeViolation::FutureDate));
        prop_assert_eq!(quote.set_week_begin(future), Err(RangeViolation::FutureDate));
        prop_assert_eq!(quote.set_week_end(future), Err(RangeViolation::FutureDate));
        prop_assert_eq!(statement.set_begin_date(future), Err(RangeViolation::FutureDate));
        prop_assert_eq!(statement.set_end_date(future), Err(RangeViolation::FutureDate));

        let quote_after = quote.snapshot();
        prop_assert_eq!(quote_after.candle_range, quote_before.candle_range);
        prop_assert_eq!(quote_after.week_range, quote_before.week_range);
        prop_assert_eq!(statement.snapshot().date_range, statement_before.date_range);
        prop_assert_eq!(h.notifier.messages().len(), 6);
        prop_assert_eq!(h.source.call_count(), 0);
    }
}
