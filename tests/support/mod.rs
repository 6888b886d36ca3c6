//! Shared harness for orchestrator behaviour tests.
//!
//! [`ScriptedSource`] answers with fixture data, records every call at the
//! moment it is issued, and can fail an endpoint or hold its next response
//! back until the test releases it.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use stockscope_core::{
    AnalysisContext, AnalysisSource, BarSeries, BarsRequest, Clock, CollectingNotifier,
    DateIntervalBundle, DateIntervalRequest, Endpoint, FixtureSource, QuarterBundle,
    QuarterRequest, SecurityId, SecurityInfo, SourceError, SourceFuture,
};
use time::macros::date;
use time::Date;
use tokio::sync::oneshot;

pub const TODAY: Date = date!(2024 - 05 - 15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SecurityInfo(SecurityId),
    DailyBars(BarsRequest),
    WeeklyBars(BarsRequest),
    DateInterval(DateIntervalRequest),
    Quarter(QuarterRequest),
}

impl Call {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::SecurityInfo(_) => Endpoint::SecurityInfo,
            Self::DailyBars(_) => Endpoint::DailyBars,
            Self::WeeklyBars(_) => Endpoint::WeeklyBars,
            Self::DateInterval(_) => Endpoint::DateIntervalStatement,
            Self::Quarter(_) => Endpoint::QuarterStatement,
        }
    }
}

/// Releases one held response. Dropping the gate releases it as well.
pub struct Gate(Option<oneshot::Sender<()>>);

impl Gate {
    pub fn release(mut self) {
        if let Some(sender) = self.0.take() {
            let _ = sender.send(());
        }
    }
}

#[derive(Default)]
pub struct ScriptedSource {
    fixture: FixtureSource,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Endpoint, SourceError>>,
    gates: Mutex<HashMap<Endpoint, VecDeque<oneshot::Receiver<()>>>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every later call to `endpoint` fails with `error`.
    pub fn fail(&self, endpoint: Endpoint, error: SourceError) {
        guard(&self.failures).insert(endpoint, error);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        guard(&self.failures).remove(&endpoint);
    }

    /// The next call to `endpoint` waits until the returned gate is released.
    pub fn hold(&self, endpoint: Endpoint) -> Gate {
        let (sender, receiver) = oneshot::channel();
        guard(&self.gates)
            .entry(endpoint)
            .or_default()
            .push_back(receiver);
        Gate(Some(sender))
    }

    pub fn calls(&self) -> Vec<Call> {
        guard(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        guard(&self.calls).len()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        guard(&self.calls)
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    /// Yields to the runtime until at least `count` calls were issued.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1_000 {
            if self.call_count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {count} calls, saw {}: {:?}",
            self.call_count(),
            self.calls()
        );
    }

    fn enter(&self, call: Call) -> (Endpoint, Option<oneshot::Receiver<()>>) {
        let endpoint = call.endpoint();
        guard(&self.calls).push(call);
        let gate = guard(&self.gates)
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        (endpoint, gate)
    }

    async fn pass(
        &self,
        endpoint: Endpoint,
        gate: Option<oneshot::Receiver<()>>,
    ) -> Result<(), SourceError> {
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let failure = guard(&self.failures).get(&endpoint).cloned();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AnalysisSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn security_info<'a>(&'a self, security: &'a SecurityId) -> SourceFuture<'a, SecurityInfo> {
        let (endpoint, gate) = self.enter(Call::SecurityInfo(security.clone()));
        Box::pin(async move {
            self.pass(endpoint, gate).await?;
            self.fixture.security_info(security).await
        })
    }

    fn daily_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        let (endpoint, gate) = self.enter(Call::DailyBars(req.clone()));
        Box::pin(async move {
            self.pass(endpoint, gate).await?;
            self.fixture.daily_bars(req).await
        })
    }

    fn weekly_bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        let (endpoint, gate) = self.enter(Call::WeeklyBars(req.clone()));
        Box::pin(async move {
            self.pass(endpoint, gate).await?;
            self.fixture.weekly_bars(req).await
        })
    }

    fn date_interval_statement<'a>(
        &'a self,
        req: DateIntervalRequest,
    ) -> SourceFuture<'a, DateIntervalBundle> {
        let (endpoint, gate) = self.enter(Call::DateInterval(req.clone()));
        Box::pin(async move {
            self.pass(endpoint, gate).await?;
            self.fixture.date_interval_statement(req).await
        })
    }

    fn quarter_statement<'a>(&'a self, req: QuarterRequest) -> SourceFuture<'a, QuarterBundle> {
        let (endpoint, gate) = self.enter(Call::Quarter(req.clone()));
        Box::pin(async move {
            self.pass(endpoint, gate).await?;
            self.fixture.quarter_statement(req).await
        })
    }
}

/// Clock whose date can be moved by the test.
pub struct AdjustableClock(Mutex<Date>);

impl AdjustableClock {
    pub fn new(today: Date) -> Arc<Self> {
        Arc::new(Self(Mutex::new(today)))
    }

    pub fn set(&self, today: Date) {
        *guard(&self.0) = today;
    }
}

impl Clock for AdjustableClock {
    fn today(&self) -> Date {
        *guard(&self.0)
    }
}

pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub notifier: Arc<CollectingNotifier>,
    pub clock: Arc<AdjustableClock>,
    pub context: AnalysisContext,
}

/// Scripted source, collecting notifier and a clock pinned to [`TODAY`].
pub fn harness() -> Harness {
    let source = ScriptedSource::new();
    let notifier = Arc::new(CollectingNotifier::new());
    let clock = AdjustableClock::new(TODAY);
    let context = AnalysisContext::new(source.clone())
        .with_notifier(notifier.clone())
        .with_clock(clock.clone());
    Harness {
        source,
        notifier,
        clock,
        context,
    }
}

pub fn security(id: &str) -> SecurityId {
    SecurityId::parse(id).expect("valid security id")
}

fn guard<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
