//! Probe registry and runner
//!
//! Each registered probe runs once, in its own task, against its own Context.
//! A failing, erroring or panicking probe never stops the remaining probes,
//! and results always come back in registration order regardless of how many
//! run at once.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{StaticTrust, TrustProvider};
use crate::config::{ContextMode, RunnerConfig, TargetConfig};
use crate::context::{derive_seed, Context};
use crate::error::{ProbeError, Result};
use crate::probe::Probe;
use crate::report::ResultSink;

// =============================================================================
// Registry
// =============================================================================

struct Entry {
    name: String,
    probe: Arc<dyn Probe>,
}

/// Ordered set of uniquely named probes
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a probe. Names must be unique.
    pub fn register<P>(&mut self, name: impl Into<String>, probe: P) -> Result<()>
    where
        P: Probe + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(ProbeError::DuplicateProbe(name));
        }
        self.entries.push(Entry {
            name,
            probe: Arc::new(probe),
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Probe names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn description(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.probe.description())
    }

    /// Keep only the named probes, in registration order.
    pub fn select<S: AsRef<str>>(self, names: &[S]) -> Result<Registry> {
        for name in names {
            if !self.contains(name.as_ref()) {
                return Err(ProbeError::UnknownProbe(name.as_ref().to_string()));
            }
        }
        let entries = self
            .entries
            .into_iter()
            .filter(|e| names.iter().any(|n| n.as_ref() == e.name))
            .collect();
        Ok(Registry { entries })
    }
}

// =============================================================================
// Results
// =============================================================================

/// Final state of one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Errored,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed => "FAIL",
            Outcome::Errored => "ERROR",
        }
    }
}

/// Outcome of one probe with its captured message
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

impl ProbeResult {
    /// Map a probe's return value onto an outcome.
    pub fn from_verdict(name: String, verdict: Result<()>, elapsed: Duration) -> Self {
        let (outcome, message) = match verdict {
            Ok(()) => (Outcome::Passed, None),
            Err(e) if e.is_assertion() => (Outcome::Failed, Some(e.to_string())),
            Err(e) => (Outcome::Errored, Some(e.to_string())),
        };
        Self {
            name,
            outcome,
            message,
            elapsed,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Per-outcome totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

/// Aggregated results of a run, in registration order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub results: Vec<ProbeResult>,
}

impl RunReport {
    /// True only when every probe passed
    pub fn is_success(&self) -> bool {
        self.results.iter().all(ProbeResult::passed)
    }

    /// Probes that failed or errored
    pub fn failures(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.results
            .iter()
            .fold(OutcomeCounts::default(), |mut counts, r| {
                match r.outcome {
                    Outcome::Passed => counts.passed += 1,
                    Outcome::Failed => counts.failed += 1,
                    Outcome::Errored => counts.errored += 1,
                }
                counts
            })
    }
}

// =============================================================================
// Runner
// =============================================================================

enum ContextSource {
    Fresh(Context),
    Shared(Arc<Mutex<Context>>),
}

/// Executes every probe in a registry
pub struct Runner {
    registry: Registry,
    settings: RunnerConfig,
    trust: Arc<dyn TrustProvider>,
    cancel: CancellationToken,
}

impl Runner {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            settings: RunnerConfig::default(),
            trust: Arc::new(StaticTrust::placeholder()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_settings(mut self, settings: RunnerConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_trust(mut self, trust: Arc<dyn TrustProvider>) -> Self {
        self.trust = trust;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Root cancellation scope. Cancelling it aborts in-flight calls and
    /// skips probes that have not started.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn context(&self, target: &Arc<TargetConfig>, seed: u64) -> Context {
        Context::new(target.clone(), self.trust.clone(), seed)
            .with_cancellation(self.cancel.child_token())
            .with_timeout(self.settings.timeout)
    }

    /// Run every registered probe and report each result to `sink`.
    pub async fn run_all(&self, target: Arc<TargetConfig>, sink: &dyn ResultSink) -> RunReport {
        let seed = self.settings.seed.unwrap_or_else(rand::random);

        let (concurrency, shared) = match self.settings.context {
            ContextMode::PerProbe => (self.settings.concurrency.max(1), None),
            ContextMode::Shared => (1, Some(Arc::new(Mutex::new(self.context(&target, seed))))),
        };

        info!(
            seed,
            probes = self.registry.len(),
            concurrency,
            endpoint = %target.endpoint,
            "starting run"
        );

        let results: Vec<ProbeResult> = stream::iter(self.registry.entries.iter().enumerate())
            .map(|(index, entry)| {
                let source = match &shared {
                    Some(ctx) => ContextSource::Shared(ctx.clone()),
                    None => ContextSource::Fresh(
                        self.context(&target, derive_seed(seed, index as u64)),
                    ),
                };
                run_probe(
                    entry.name.clone(),
                    entry.probe.clone(),
                    source,
                    self.cancel.clone(),
                )
            })
            .buffered(concurrency)
            .inspect(|result| sink.record(result))
            .collect()
            .await;

        let report = RunReport { seed, results };
        let counts = report.counts();
        info!(
            passed = counts.passed,
            failed = counts.failed,
            errored = counts.errored,
            "run finished"
        );
        sink.finish(&report);
        report
    }
}

async fn run_probe(
    name: String,
    probe: Arc<dyn Probe>,
    source: ContextSource,
    cancel: CancellationToken,
) -> ProbeResult {
    if cancel.is_cancelled() {
        return ProbeResult::from_verdict(
            name,
            Err(ProbeError::execution("run", "cancelled before start")),
            Duration::ZERO,
        );
    }

    debug!(probe = %name, "starting probe");
    let started = Instant::now();

    let task = tokio::spawn(async move {
        match source {
            ContextSource::Fresh(mut ctx) => probe.run(&mut ctx).await,
            ContextSource::Shared(ctx) => {
                let mut guard = ctx.lock().await;
                probe.run(&mut *guard).await
            }
        }
    });

    let verdict = match task.await {
        Ok(verdict) => verdict,
        Err(join_err) if join_err.is_panic() => {
            Err(ProbeError::Panicked(panic_message(join_err.into_panic())))
        }
        Err(join_err) => Err(ProbeError::execution("probe task", join_err.to_string())),
    };

    let result = ProbeResult::from_verdict(name, verdict, started.elapsed());
    match (&result.outcome, &result.message) {
        (Outcome::Passed, _) => debug!(probe = %result.name, elapsed = ?result.elapsed, "probe passed"),
        (outcome, Some(message)) => warn!(
            probe = %result.name,
            outcome = outcome.label(),
            message = %message,
            "probe did not pass"
        ),
        (outcome, None) => warn!(probe = %result.name, outcome = outcome.label(), "probe did not pass"),
    }
    result
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
