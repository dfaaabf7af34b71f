//! Transport trouble is an error, never a failure
//!
//! These tests need no MinIO.


use std::sync::Arc;
use std::time::Duration;

use common::*;
use s3_probe::config::{RunnerConfig, TargetConfig};
use s3_probe::report::MemorySink;
use s3_probe::runner::Outcome;

#[tokio::test]
async fn test_unreachable_endpoint_errors() -> anyhow::Result<()> {
    init_tracing();
    let runner = single_probe_runner(
        "s3-00006",
        RunnerConfig {
            seed: Some(1),
            timeout: Duration::from_secs(10),
            ..Default::default()
        },
    )?;
    let target = Arc::new(TargetConfig::new("http://127.0.0.1:1").with_path_style(true));

    let sink = MemorySink::new();
    let report = runner.run_all(target, &sink).await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Errored);
    assert!(!report.is_success());
    Ok(())
}

#[tokio::test]
async fn test_cancellation_mid_run_errors() -> anyhow::Result<()> {
    init_tracing();
    let runner = single_probe_runner(
        "s3-00010",
        RunnerConfig {
            seed: Some(2),
            timeout: Duration::from_secs(30),
            ..Default::default()
        },
    )?;
    // Non-routable address: connects hang until cancelled
    let target = Arc::new(TargetConfig::new("http://10.255.255.1:9000").with_path_style(true));

    let token = runner.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let sink = MemorySink::new();
    let report = tokio::time::timeout(Duration::from_secs(20), runner.run_all(target, &sink))
        .await?;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Errored);
    Ok(())
}
