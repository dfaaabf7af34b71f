//! Operations against a bucket that does not exist must report `NoSuchBucket`.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketVersioningStatus, Delete, ObjectIdentifier, VersioningConfiguration};
use bytes::Bytes;

use crate::classify::{codes, expect_error_code};
use crate::context::Context;
use crate::error::{ProbeError, Result};
use crate::probe::Probe;

/// Status value no server accepts
const INVALID_VERSIONING_STATUS: &str = "enorbled";

/// GetBucketLocation on a missing bucket
pub struct GetBucketLocationNoSuchBucket;

#[async_trait]
impl Probe for GetBucketLocationNoSuchBucket {
    fn description(&self) -> &'static str {
        "GetBucketLocation on a missing bucket returns NoSuchBucket"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ctx.missing_bucket_name();

        let outcome = ctx
            .call(
                "GetBucketLocation",
                client.get_bucket_location().bucket(&bucket).send(),
            )
            .await?;
        expect_error_code("GetBucketLocation", outcome, codes::NO_SUCH_BUCKET)
    }
}

/// Get/PutBucketVersioning on a missing bucket. The put carries an invalid
/// status, so the bucket check has to happen before payload validation.
pub struct BucketVersioningNoSuchBucket;

#[async_trait]
impl Probe for BucketVersioningNoSuchBucket {
    fn description(&self) -> &'static str {
        "Get/PutBucketVersioning on a missing bucket return NoSuchBucket, even with an invalid status"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ctx.missing_bucket_name();

        let outcome = ctx
            .call(
                "GetBucketVersioning",
                client.get_bucket_versioning().bucket(&bucket).send(),
            )
            .await?;
        expect_error_code("GetBucketVersioning", outcome, codes::NO_SUCH_BUCKET)?;

        let configuration = VersioningConfiguration::builder()
            .status(BucketVersioningStatus::from(INVALID_VERSIONING_STATUS))
            .build();
        let outcome = ctx
            .call(
                "PutBucketVersioning",
                client
                    .put_bucket_versioning()
                    .bucket(&bucket)
                    .versioning_configuration(configuration)
                    .send(),
            )
            .await?;
        expect_error_code("PutBucketVersioning", outcome, codes::NO_SUCH_BUCKET)
    }
}

/// Object reads and writes on a missing bucket
pub struct ObjectOpsNoSuchBucket;

#[async_trait]
impl Probe for ObjectOpsNoSuchBucket {
    fn description(&self) -> &'static str {
        "PutObject, GetObject, DeleteObject and DeleteObjects on a missing bucket return NoSuchBucket"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ctx.missing_bucket_name();
        let key = ctx.rand_string(8);
        let body = Bytes::from(ctx.rand_bytes(64));

        let outcome = ctx
            .call(
                "PutObject",
                client
                    .put_object()
                    .bucket(&bucket)
                    .key(&key)
                    .body(ByteStream::from(body))
                    .send(),
            )
            .await?;
        expect_error_code("PutObject", outcome, codes::NO_SUCH_BUCKET)?;

        let outcome = ctx
            .call(
                "GetObject",
                client.get_object().bucket(&bucket).key(&key).send(),
            )
            .await?;
        expect_error_code("GetObject", outcome, codes::NO_SUCH_BUCKET)?;

        let outcome = ctx
            .call(
                "DeleteObject",
                client.delete_object().bucket(&bucket).key(&key).send(),
            )
            .await?;
        expect_error_code("DeleteObject", outcome, codes::NO_SUCH_BUCKET)?;

        let delete = delete_request(&[key.as_str(), "second-object"])?;
        let outcome = ctx
            .call(
                "DeleteObjects",
                client.delete_objects().bucket(&bucket).delete(delete).send(),
            )
            .await?;
        expect_error_code("DeleteObjects", outcome, codes::NO_SUCH_BUCKET)
    }
}

/// ListMultipartUploads on a missing bucket
pub struct ListMultipartUploadsNoSuchBucket;

#[async_trait]
impl Probe for ListMultipartUploadsNoSuchBucket {
    fn description(&self) -> &'static str {
        "ListMultipartUploads on a missing bucket returns NoSuchBucket"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let client = ctx.client();
        let bucket = ctx.missing_bucket_name();

        let outcome = ctx
            .call(
                "ListMultipartUploads",
                client.list_multipart_uploads().bucket(&bucket).send(),
            )
            .await?;
        expect_error_code("ListMultipartUploads", outcome, codes::NO_SUCH_BUCKET)
    }
}

/// Batch delete body for `keys`
fn delete_request(keys: &[&str]) -> Result<Delete> {
    let objects = keys
        .iter()
        .map(|key| {
            ObjectIdentifier::builder()
                .key(*key)
                .build()
                .map_err(|e| ProbeError::execution("DeleteObjects", e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    Delete::builder()
        .set_objects(Some(objects))
        .build()
        .map_err(|e| ProbeError::execution("DeleteObjects", e.to_string()))
}
