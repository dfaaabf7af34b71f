//! Result sinks
//!
//! The runner pushes each `ProbeResult` into a sink as soon as it is known and
//! hands over the full `RunReport` at the end. Rendering lives entirely here.

use std::io::Write;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::runner::{Outcome, ProbeResult, RunReport};

/// Receiver for probe results
pub trait ResultSink: Send + Sync {
    /// Called once per probe, in registration order
    fn record(&self, result: &ProbeResult);

    /// Called once after the last probe
    fn finish(&self, _report: &RunReport) {}
}

/// Fan out to two sinks
impl<A: ResultSink, B: ResultSink> ResultSink for (A, B) {
    fn record(&self, result: &ProbeResult) {
        self.0.record(result);
        self.1.record(result);
    }

    fn finish(&self, report: &RunReport) {
        self.0.finish(report);
        self.1.finish(report);
    }
}

/// Structured log line per result
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn record(&self, result: &ProbeResult) {
        match result.outcome {
            Outcome::Passed => info!(probe = %result.name, elapsed = ?result.elapsed, "PASS"),
            outcome => warn!(
                probe = %result.name,
                elapsed = ?result.elapsed,
                message = result.message.as_deref().unwrap_or(""),
                "{}",
                outcome.label()
            ),
        }
    }
}

/// Human-readable lines
pub struct TextSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            warn!("Failed to write results: {}", e);
        }
    }
}

impl<W: Write + Send> ResultSink for TextSink<W> {
    fn record(&self, result: &ProbeResult) {
        let line = match &result.message {
            Some(message) => format!(
                "{:<5} {} ({:?}): {}\n",
                result.outcome.label(),
                result.name,
                result.elapsed,
                message
            ),
            None => format!(
                "{:<5} {} ({:?})\n",
                result.outcome.label(),
                result.name,
                result.elapsed
            ),
        };
        self.write(&line);
    }

    fn finish(&self, report: &RunReport) {
        let counts = report.counts();
        let mut text = format!(
            "\n{} passed, {} failed, {} errored (seed {})\n",
            counts.passed, counts.failed, counts.errored, report.seed
        );
        if !report.is_success() {
            text.push_str("\nNot passed:\n");
            for result in report.failures() {
                text.push_str(&format!(
                    "  {} [{}]: {}\n",
                    result.name,
                    result.outcome.label(),
                    result.message.as_deref().unwrap_or("")
                ));
            }
        }
        self.write(&text);
    }
}

/// Whole report as a YAML document once the run is over
pub struct YamlSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> YamlSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> ResultSink for YamlSink<W> {
    fn record(&self, _result: &ProbeResult) {}

    fn finish(&self, report: &RunReport) {
        let document = match serde_yaml::to_string(report) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to serialize report: {}", e);
                return;
            }
        };
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(document.as_bytes()).and_then(|_| out.flush()) {
            warn!("Failed to write report: {}", e);
        }
    }
}

/// Keeps everything in memory
#[derive(Default)]
pub struct MemorySink {
    results: Mutex<Vec<ProbeResult>>,
    report: Mutex<Option<RunReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> Vec<ProbeResult> {
        self.results.lock().clone()
    }

    /// The final report, once the run has finished
    pub fn report(&self) -> Option<RunReport> {
        self.report.lock().clone()
    }
}

impl ResultSink for MemorySink {
    fn record(&self, result: &ProbeResult) {
        self.results.lock().push(result.clone());
    }

    fn finish(&self, report: &RunReport) {
        *self.report.lock() = Some(report.clone());
    }
}
