//! Scratch buckets do not outlive their probes
//!
//! Kept in its own binary so no other test is creating buckets while the
//! listing is taken.


use common::*;
use s3_probe::context::SCRATCH_BUCKET_PREFIX;

#[tokio::test]
async fn test_scratch_buckets_removed_after_run() -> anyhow::Result<()> {
    let report = run_builtin(&["s3-00010", "s3-00011", "s3-00012"], 3).await?;
    assert!(report.is_success(), "{:?}", report.results);

    let minio = minio().await;
    assert!(
        !minio.has_bucket_with_prefix(SCRATCH_BUCKET_PREFIX).await?,
        "scratch bucket left behind"
    );
    Ok(())
}
