//! Probe trait

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

/// A single behavioural assertion against the target.
///
/// `run` returns `Ok(())` when the target behaved as expected. Errors are
/// split by [`ProbeError::is_assertion`](crate::error::ProbeError::is_assertion)
/// into failures (target misbehaved) and errors (the probe could not observe
/// the target).
///
/// Probes hold no state of their own; everything per-run comes from the
/// Context, including the client and random resource names.
#[async_trait]
pub trait Probe: Send + Sync {
    /// One-line statement of the behaviour being asserted
    fn description(&self) -> &'static str;

    async fn run(&self, ctx: &mut Context) -> Result<()>;
}
