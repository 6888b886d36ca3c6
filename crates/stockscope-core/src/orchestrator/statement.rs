use std::sync::Mutex;

use serde::Serialize;
use time::Date;

use super::{lock, notify_violation, FetchOutcome, ResetOnDrop};
use crate::config::AnalysisContext;
use crate::data_source::{DateIntervalRequest, QuarterRequest};
use crate::selection::StockSelection;
use crate::validator::{check_date_range, check_fiscal_period, reject_future_date};
use crate::{
    AnalysisError, DateRange, FiscalPeriod, Quarter, RangeViolation, SecurityId,
    StatementBundles, StatementType,
};

/// Everything the statement view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementState {
    pub selection: StockSelection,
    pub active_tab: StatementType,
    pub date_range: DateRange,
    pub fiscal_period: FiscalPeriod,
    pub fetching: bool,
    /// Both bundles or neither.
    pub bundles: Option<StatementBundles>,
    #[serde(skip)]
    fetch_ticket: u64,
}

impl StatementState {
    pub fn security(&self) -> Option<&SecurityId> {
        self.selection.security()
    }

    /// Figures for the active tab, if the bundles are loaded.
    pub fn active_figures(&self) -> Option<&serde_json::Value> {
        self.bundles
            .as_ref()
            .and_then(|bundles| bundles.figures(self.active_tab))
    }
}

/// Statement-analysis orchestrator.
///
/// [`fetch_data`](Self::fetch_data) validates the date range and fiscal
/// period, then loads the date-interval and quarter bundles concurrently
/// and stores them together or not at all.
pub struct StatementOrchestrator {
    context: AnalysisContext,
    state: Mutex<StatementState>,
}

impl StatementOrchestrator {
    pub fn new(context: AnalysisContext) -> Self {
        let today = context.today();
        let defaults = *context.defaults();
        let state = StatementState {
            selection: StockSelection::default(),
            active_tab: StatementType::default(),
            date_range: defaults.statement_range(today),
            fiscal_period: defaults.statement_period(today),
            fetching: false,
            bundles: None,
            fetch_ticket: 0,
        };

        Self {
            context,
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> StatementState {
        lock(&self.state).clone()
    }

    /// Stores the selection. A different security clears the bundles and
    /// invalidates fetches in flight. Returns whether the selection changed.
    pub fn select_security(&self, security: Option<SecurityId>) -> bool {
        let mut state = lock(&self.state);
        if state.security() == security.as_ref() {
            return false;
        }

        state.selection.select(security);
        state.bundles = None;
        state.fetching = false;
        tracing::debug!(
            security = ?state.security().map(SecurityId::as_str),
            generation = state.selection.generation().value(),
            "statement selection changed"
        );
        true
    }

    pub fn select_tab(&self, tab: StatementType) {
        lock(&self.state).active_tab = tab;
    }

    pub fn set_begin_date(&self, date: Date) -> Result<(), RangeViolation> {
        self.set_date(date, |range| &mut range.begin)
    }

    pub fn set_end_date(&self, date: Date) -> Result<(), RangeViolation> {
        self.set_date(date, |range| &mut range.end)
    }

    pub fn set_fiscal_year(&self, year: i32) -> Result<(), RangeViolation> {
        self.set_period(|period| period.with_year(year))
    }

    pub fn set_fiscal_quarter(&self, quarter: Quarter) -> Result<(), RangeViolation> {
        self.set_period(|period| period.with_quarter(quarter))
    }

    pub fn set_fiscal_period(&self, period: FiscalPeriod) -> Result<(), RangeViolation> {
        self.set_period(|_| period)
    }

    /// Validates both ranges, then fetches and commits the bundle pair.
    ///
    /// On a range violation nothing is fetched and the prior bundles stay.
    /// If either fetch fails nothing is committed and the failure is
    /// returned. Only the most recently issued fetch may commit. The fetching
    /// flag is lowered on every exit path.
    pub async fn fetch_data(&self) -> Result<FetchOutcome, AnalysisError> {
        let today = self.context.today();
        let (security, range, period, generation) = {
            let state = lock(&self.state);
            let security = state.security().cloned().ok_or(AnalysisError::NoSelection)?;
            (
                security,
                state.date_range,
                state.fiscal_period,
                state.selection.generation(),
            )
        };

        if let Err(violation) =
            check_date_range(&range).and_then(|()| check_fiscal_period(period, today))
        {
            return Ok(FetchOutcome::Rejected(notify_violation(
                &self.context,
                violation,
            )));
        }

        let ticket = {
            let mut state = lock(&self.state);
            state.fetch_ticket = state.fetch_ticket.wrapping_add(1);
            state.fetching = true;
            state.fetch_ticket
        };
        let _fetching = ResetOnDrop::new(&self.state, move |state: &mut StatementState| {
            if state.fetch_ticket == ticket {
                state.fetching = false;
            }
        });

        tracing::debug!(
            security = %security,
            range = %range,
            period = %period,
            generation = generation.value(),
            "fetching statement bundles"
        );
        let source = self.context.source();
        let (date_interval, quarter) = tokio::join!(
            source.date_interval_statement(DateIntervalRequest {
                security: security.clone(),
                range,
            }),
            source.quarter_statement(QuarterRequest {
                security: security.clone(),
                period,
            }),
        );

        let bundles = match (date_interval, quarter) {
            (Ok(date_interval), Ok(quarter)) => StatementBundles {
                date_interval,
                quarter,
            },
            (Err(error), _) | (_, Err(error)) => {
                tracing::warn!(security = %security, code = error.code(), %error, "statement fetch failed");
                return Err(error.into());
            }
        };

        {
            let mut state = lock(&self.state);
            if !state.selection.is_current(generation) || state.fetch_ticket != ticket {
                tracing::debug!(
                    generation = generation.value(),
                    ticket,
                    "discarding stale statement result"
                );
                return Ok(FetchOutcome::Superseded);
            }
            state.bundles = Some(bundles);
        }

        tracing::debug!(security = %security, "statement bundles committed");
        Ok(FetchOutcome::Committed)
    }

    fn set_date(
        &self,
        date: Date,
        field: impl FnOnce(&mut DateRange) -> &mut Date,
    ) -> Result<(), RangeViolation> {
        reject_future_date(date, self.context.today())
            .map_err(|violation| notify_violation(&self.context, violation))?;

        let mut state = lock(&self.state);
        *field(&mut state.date_range) = date;
        Ok(())
    }

    fn set_period(
        &self,
        change: impl FnOnce(FiscalPeriod) -> FiscalPeriod,
    ) -> Result<(), RangeViolation> {
        let today = self.context.today();
        let mut state = lock(&self.state);
        let candidate = change(state.fiscal_period);
        if let Err(violation) = check_fiscal_period(candidate, today) {
            drop(state);
            return Err(notify_violation(&self.context, violation));
        }
        state.fiscal_period = candidate;
        Ok(())
    }
}
