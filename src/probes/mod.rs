//! Built-in probes
//!
//! Probes against a missing bucket use a 40-byte random hex name. Probes that
//! need an existing bucket create a scratch bucket and remove it afterwards;
//! cleanup problems are logged and never change the verdict.

pub mod bucket;
pub mod missing_bucket;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use tracing::{debug, warn};

use crate::classify::expect_success;
use crate::config::DEFAULT_REGION;
use crate::context::Context;
use crate::error::Result;
use crate::runner::Registry;

pub use bucket::{GetObjectNoSuchKey, ListPartsNoSuchUpload, VersioningTransitions};
pub use missing_bucket::{
    BucketVersioningNoSuchBucket, GetBucketLocationNoSuchBucket,
    ListMultipartUploadsNoSuchBucket, ObjectOpsNoSuchBucket,
};

/// Register every built-in probe under its stable name.
pub fn register_builtin(registry: &mut Registry) -> Result<()> {
    registry.register("s3-00006", GetBucketLocationNoSuchBucket)?;
    registry.register("s3-00007", BucketVersioningNoSuchBucket)?;
    registry.register("s3-00008", ObjectOpsNoSuchBucket)?;
    registry.register("s3-00009", ListMultipartUploadsNoSuchBucket)?;
    registry.register("s3-00010", GetObjectNoSuchKey)?;
    registry.register("s3-00011", ListPartsNoSuchUpload)?;
    registry.register("s3-00012", VersioningTransitions)?;
    Ok(())
}

/// A registry holding every built-in probe
pub fn builtin_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}

/// Bucket created by a probe for its own use
pub(crate) struct ScratchBucket {
    name: String,
}

impl ScratchBucket {
    pub(crate) async fn create(ctx: &mut Context, client: &Client) -> Result<Self> {
        let name = ctx.scratch_bucket_name();

        let mut request = client.create_bucket().bucket(&name);
        // us-east-1 rejects an explicit location constraint
        let region = ctx.config().region.as_str();
        if region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        let outcome = ctx.call("CreateBucket", request.send()).await?;
        expect_success("CreateBucket", outcome)?;
        debug!(bucket = %name, "created scratch bucket");

        Ok(Self { name })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Delete the bucket; failures are only logged.
    pub(crate) async fn remove(self, ctx: &Context, client: &Client) {
        let outcome = ctx
            .call("DeleteBucket", client.delete_bucket().bucket(&self.name).send())
            .await;
        match outcome {
            Ok(Ok(_)) => debug!(bucket = %self.name, "removed scratch bucket"),
            Ok(Err(e)) => warn!(
                bucket = %self.name,
                error = %DisplayErrorContext(&e),
                "failed to remove scratch bucket"
            ),
            Err(e) => warn!(bucket = %self.name, error = %e, "failed to remove scratch bucket"),
        }
    }
}
