//! s3-probe: conformance probes for S3-compatible object stores
//!
//! Each probe is a small behavioural assertion against a live endpoint, such as
//! "GetBucketLocation on a missing bucket returns `NoSuchBucket`". Running the
//! catalogue against a provider characterizes its error codes and versioning
//! state machine so a compatible implementation can be checked against the
//! same ground truth.
//!
//! # Architecture
//!
//! - **Context**: per-probe configuration, random source, cancellation scope
//!   and client factory.
//! - **Classifier**: maps SDK errors to S3 error codes, separating target
//!   misbehaviour (failures) from transport trouble (errors).
//! - **State assertions**: versioning reads and transitions that fail
//!   descriptively on unexpected values.
//! - **Runner**: executes a registry of probes in isolation and reports
//!   results to a sink in registration order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use s3_probe::config::TargetConfig;
//! use s3_probe::probes::builtin_registry;
//! use s3_probe::report::TextSink;
//! use s3_probe::runner::Runner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = Arc::new(TargetConfig::new("http://localhost:9000").with_path_style(true));
//! let runner = Runner::new(builtin_registry()?);
//!
//! let report = runner.run_all(target, &TextSink::new(std::io::stdout())).await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod classify;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod probe;
pub mod probes;
pub mod report;
pub mod runner;
pub mod versioning;


pub use context::Context;
pub use error::{ProbeError, Result};
pub use probe::Probe;
