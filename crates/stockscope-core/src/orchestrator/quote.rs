use std::sync::Mutex;

use serde::Serialize;
use time::Date;

use super::{lock, notify_violation, FetchOutcome, ResetOnDrop};
use crate::config::AnalysisContext;
use crate::data_source::BarsRequest;
use crate::selection::{Generation, StockSelection};
use crate::validator::{check_date_range, reject_future_date};
use crate::{
    AdjustmentMode, AnalysisError, BarSeries, DateRange, RangeViolation, SecurityId, SecurityInfo,
};

/// Everything the quote view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteState {
    pub selection: StockSelection,
    pub adjustment: AdjustmentMode,
    pub candle_range: DateRange,
    pub week_range: DateRange,
    /// Set only while a full switch is in flight.
    pub loading: bool,
    pub info: Option<SecurityInfo>,
    pub daily: Option<BarSeries>,
    pub weekly: Option<BarSeries>,
    /// Identifies the most recently issued bar fetch; older ones never commit.
    #[serde(skip)]
    bar_ticket: u64,
}

impl QuoteState {
    pub fn security(&self) -> Option<&SecurityId> {
        self.selection.security()
    }

    pub fn has_results(&self) -> bool {
        self.info.is_some() || self.daily.is_some() || self.weekly.is_some()
    }

    fn clear_results(&mut self) {
        self.info = None;
        self.daily = None;
        self.weekly = None;
    }
}

/// Quote-analysis orchestrator.
///
/// A change of security or adjustment mode runs the full switch: metadata
/// first, then daily and weekly bars together, under the loading flag.
/// [`apply_date_range`](Self::apply_date_range) refetches only the bars and
/// never touches the loading flag.
pub struct QuoteOrchestrator {
    context: AnalysisContext,
    state: Mutex<QuoteState>,
}

impl QuoteOrchestrator {
    pub fn new(context: AnalysisContext) -> Self {
        let today = context.today();
        let defaults = *context.defaults();
        let state = QuoteState {
            selection: StockSelection::default(),
            adjustment: AdjustmentMode::default(),
            candle_range: defaults.candle_range(today),
            week_range: defaults.week_range(today),
            loading: false,
            info: None,
            daily: None,
            weekly: None,
            bar_ticket: 0,
        };

        Self {
            context,
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> QuoteState {
        lock(&self.state).clone()
    }

    /// Runs the full switch if `security` differs from the current selection.
    pub async fn select_security(
        &self,
        security: Option<SecurityId>,
    ) -> Result<FetchOutcome, AnalysisError> {
        let mode = {
            let state = lock(&self.state);
            if state.security() == security.as_ref() {
                return Ok(FetchOutcome::Unchanged);
            }
            state.adjustment
        };
        self.on_selection_or_mode_change(security, mode).await
    }

    /// Runs the full switch if `mode` differs from the current mode.
    pub async fn set_adjustment_mode(
        &self,
        mode: AdjustmentMode,
    ) -> Result<FetchOutcome, AnalysisError> {
        let security = {
            let state = lock(&self.state);
            if state.adjustment == mode {
                return Ok(FetchOutcome::Unchanged);
            }
            state.security().cloned()
        };
        self.on_selection_or_mode_change(security, mode).await
    }

    /// Full context switch.
    ///
    /// Stores both inputs and invalidates anything still in flight. A new
    /// security clears the previous results before the first fetch; a
    /// mode-only change keeps them until replaced. With no security the
    /// results are cleared and nothing is fetched.
    ///
    /// Loading is raised for the duration and lowered on every exit path,
    /// unless a newer switch has taken ownership of it.
    pub async fn on_selection_or_mode_change(
        &self,
        security: Option<SecurityId>,
        mode: AdjustmentMode,
    ) -> Result<FetchOutcome, AnalysisError> {
        let (security, generation, candle_range, week_range) = {
            let mut state = lock(&self.state);
            let security_changed = state.selection.select(security.clone());
            state.adjustment = mode;
            if security_changed {
                state.clear_results();
            }

            let Some(security) = security else {
                state.clear_results();
                state.loading = false;
                tracing::debug!("quote selection cleared");
                return Ok(FetchOutcome::Cleared);
            };

            state.loading = true;
            (
                security,
                state.selection.generation(),
                state.candle_range,
                state.week_range,
            )
        };

        let _loading = ResetOnDrop::new(&self.state, move |state: &mut QuoteState| {
            if state.selection.is_current(generation) {
                state.loading = false;
            }
        });

        tracing::debug!(
            security = %security,
            adjustment = %mode,
            generation = generation.value(),
            "fetching security info"
        );
        let info = self
            .context
            .source()
            .security_info(&security)
            .await
            .inspect_err(|error| {
                tracing::warn!(security = %security, code = error.code(), %error, "security info fetch failed");
            })?;

        if !self.commit_if_current(generation, None, |state| state.info = Some(info)) {
            return Ok(FetchOutcome::Superseded);
        }

        if let Err(violation) = self.check_ranges(candle_range, week_range) {
            return Ok(FetchOutcome::Rejected(violation));
        }

        self.fetch_bars(security, mode, generation, candle_range, week_range)
            .await
    }

    /// Refetches daily and weekly bars for the current ranges, keeping the
    /// metadata and leaving the loading flag alone.
    pub async fn apply_date_range(&self) -> Result<FetchOutcome, AnalysisError> {
        let (security, mode, generation, candle_range, week_range) = {
            let state = lock(&self.state);
            let security = state.security().cloned().ok_or(AnalysisError::NoSelection)?;
            (
                security,
                state.adjustment,
                state.selection.generation(),
                state.candle_range,
                state.week_range,
            )
        };

        if let Err(violation) = self.check_ranges(candle_range, week_range) {
            return Ok(FetchOutcome::Rejected(violation));
        }

        self.fetch_bars(security, mode, generation, candle_range, week_range)
            .await
    }

    pub fn set_candle_begin(&self, date: Date) -> Result<(), RangeViolation> {
        self.set_endpoint(date, |state| &mut state.candle_range.begin)
    }

    pub fn set_candle_end(&self, date: Date) -> Result<(), RangeViolation> {
        self.set_endpoint(date, |state| &mut state.candle_range.end)
    }

    pub fn set_week_begin(&self, date: Date) -> Result<(), RangeViolation> {
        self.set_endpoint(date, |state| &mut state.week_range.begin)
    }

    pub fn set_week_end(&self, date: Date) -> Result<(), RangeViolation> {
        self.set_endpoint(date, |state| &mut state.week_range.end)
    }

    fn set_endpoint(
        &self,
        date: Date,
        field: impl FnOnce(&mut QuoteState) -> &mut Date,
    ) -> Result<(), RangeViolation> {
        reject_future_date(date, self.context.today())
            .map_err(|violation| notify_violation(&self.context, violation))?;

        let mut state = lock(&self.state);
        *field(&mut *state) = date;
        Ok(())
    }

    fn check_ranges(&self, candle: DateRange, week: DateRange) -> Result<(), RangeViolation> {
        check_date_range(&candle)
            .and_then(|()| check_date_range(&week))
            .map_err(|violation| notify_violation(&self.context, violation))
    }

    async fn fetch_bars(
        &self,
        security: SecurityId,
        mode: AdjustmentMode,
        generation: Generation,
        candle_range: DateRange,
        week_range: DateRange,
    ) -> Result<FetchOutcome, AnalysisError> {
        let ticket = {
            let mut state = lock(&self.state);
            state.bar_ticket = state.bar_ticket.wrapping_add(1);
            state.bar_ticket
        };

        let source = self.context.source();
        tracing::debug!(
            security = %security,
            ticket,
            candle = %candle_range,
            week = %week_range,
            adjustment = %mode,
            "fetching bars"
        );

        let (daily, weekly) = tokio::join!(
            source.daily_bars(BarsRequest::daily(security.clone(), candle_range, mode)),
            source.weekly_bars(BarsRequest::weekly(security.clone(), week_range, mode)),
        );

        let (daily, weekly) = match (daily, weekly) {
            (Ok(daily), Ok(weekly)) => (daily, weekly),
            (Err(error), _) | (_, Err(error)) => {
                tracing::warn!(security = %security, code = error.code(), %error, "bar fetch failed");
                return Err(error.into());
            }
        };

        if !self.commit_if_current(generation, Some(ticket), |state| {
            state.daily = Some(daily);
            state.weekly = Some(weekly);
        }) {
            return Ok(FetchOutcome::Superseded);
        }

        tracing::debug!(security = %security, "bars committed");
        Ok(FetchOutcome::Committed)
    }

    /// Applies a result only if its selection generation is still current and,
    /// for bars, no newer bar fetch has been issued since `bar_ticket`.
    fn commit_if_current(
        &self,
        generation: Generation,
        bar_ticket: Option<u64>,
        apply: impl FnOnce(&mut QuoteState),
    ) -> bool {
        let mut state = lock(&self.state);
        let superseded_bars = bar_ticket.is_some_and(|ticket| ticket != state.bar_ticket);
        if !state.selection.is_current(generation) || superseded_bars {
            tracing::debug!(generation = generation.value(), "discarding stale quote result");
            return false;
        }
        apply(&mut *state);
        true
    }
}
