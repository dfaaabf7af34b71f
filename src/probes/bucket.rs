//! Probes that need a bucket of their own.

use async_trait::async_trait;
use aws_sdk_s3::Client;

use super::ScratchBucket;
use crate::classify::{codes, expect_error_code};
use crate::context::Context;
use crate::error::{ProbeError, Result};
use crate::probe::Probe;
use crate::versioning::VersioningStatus;

/// GetObject of a key that was never written
pub struct GetObjectNoSuchKey;

#[async_trait]
impl Probe for GetObjectNoSuchKey {
    fn description(&self) -> &'static str {
        "GetObject of a missing key in an existing bucket returns NoSuchKey"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ScratchBucket::create(ctx, &client).await?;
        let key = ctx.rand_string(16);

        let verdict = match ctx
            .call(
                "GetObject",
                client.get_object().bucket(bucket.name()).key(&key).send(),
            )
            .await
        {
            Ok(outcome) => expect_error_code("GetObject", outcome, codes::NO_SUCH_KEY),
            Err(e) => Err(e),
        };

        bucket.remove(ctx, &client).await;
        verdict
    }
}

/// ListParts with an upload id that was never issued
pub struct ListPartsNoSuchUpload;

#[async_trait]
impl Probe for ListPartsNoSuchUpload {
    fn description(&self) -> &'static str {
        "ListParts with an unknown upload id returns NoSuchUpload"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ScratchBucket::create(ctx, &client).await?;
        let key = ctx.rand_string(16);
        let upload_id = ctx.rand_string(24);

        let verdict = match ctx
            .call(
                "ListParts",
                client
                    .list_parts()
                    .bucket(bucket.name())
                    .key(&key)
                    .upload_id(&upload_id)
                    .send(),
            )
            .await
        {
            Ok(outcome) => expect_error_code("ListParts", outcome, codes::NO_SUCH_UPLOAD),
            Err(e) => Err(e),
        };

        bucket.remove(ctx, &client).await;
        verdict
    }
}

/// Versioning state machine on a fresh bucket:
/// never configured -> Enabled (idempotently) -> Suspended, and a suspended
/// bucket no longer counts as never configured.
pub struct VersioningTransitions;

impl VersioningTransitions {
    async fn check(ctx: &Context, client: &Client, bucket: &str) -> Result<()> {
        ctx.ensure_versioning_never_enabled(client, bucket).await?;

        for _ in 0..2 {
            ctx.ensure_versioning_enabled(client, bucket).await?;
            expect_status(ctx, client, bucket, VersioningStatus::Enabled).await?;
        }

        ctx.set_versioning(client, bucket, VersioningStatus::Suspended)
            .await?;
        expect_status(ctx, client, bucket, VersioningStatus::Suspended).await?;

        let state = ctx.bucket_versioning(client, bucket).await?;
        if state.is_never_enabled() {
            return Err(ProbeError::assertion(
                "suspended bucket was reported as never versioned",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Probe for VersioningTransitions {
    fn description(&self) -> &'static str {
        "Bucket versioning moves from unset to Enabled (idempotently) to Suspended"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ScratchBucket::create(ctx, &client).await?;

        let verdict = Self::check(ctx, &client, bucket.name()).await;

        bucket.remove(ctx, &client).await;
        verdict
    }
}

async fn expect_status(
    ctx: &Context,
    client: &Client,
    bucket: &str,
    expected: VersioningStatus,
) -> Result<()> {
    let observed = ctx.bucket_versioning(client, bucket).await?;
    if observed.status != expected {
        return Err(ProbeError::assertion(format!(
            "expected versioning status {}, found {}",
            expected, observed.status
        )));
    }
    Ok(())
}
