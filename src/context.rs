//! Per-probe execution context
//!
//! A `Context` bundles the target configuration, a private random generator,
//! a cancellation scope and the trust provider used to sign requests. It owns
//! no connections: every `client()` call builds a new, lazily connecting
//! client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::types::VersioningConfiguration;
use aws_sdk_s3::Client;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::auth::{StaticTrust, TrustProvider};
use crate::classify::expect_success;
use crate::config::TargetConfig;
use crate::error::{ProbeError, Result};
use crate::versioning::{BucketVersioning, VersioningStatus};

/// Default per-call deadline
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Random bytes behind a bucket name that is assumed not to exist
pub const MISSING_BUCKET_BYTES: usize = 40;

/// Prefix for buckets the probes create and remove themselves
pub const SCRATCH_BUCKET_PREFIX: &str = "s3probe-";

/// Random bytes behind a scratch bucket name (hex keeps it under 63 chars)
const SCRATCH_BUCKET_BYTES: usize = 16;

/// Mix a process seed with a probe index (SplitMix64 finalizer).
///
/// Neighbouring indices map to unrelated seeds, so contexts created from
/// the same process seed still draw independent names.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Execution context handed to each probe
pub struct Context {
    target: Arc<TargetConfig>,
    trust: Arc<dyn TrustProvider>,
    rng: StdRng,
    seed: u64,
    cancel: CancellationToken,
    timeout: Duration,
}

impl Context {
    /// Create a context with its own generator seeded from `seed`.
    pub fn new(target: Arc<TargetConfig>, trust: Arc<dyn TrustProvider>, seed: u64) -> Self {
        Self {
            target,
            trust,
            rng: StdRng::seed_from_u64(seed),
            seed,
            cancel: CancellationToken::new(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Context signing with the placeholder key pair
    pub fn with_placeholder_trust(target: Arc<TargetConfig>, seed: u64) -> Self {
        Self::new(target, Arc::new(StaticTrust::placeholder()), seed)
    }

    /// Run calls under `token`; cancelling it aborts in-flight calls.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Deadline applied to each call made through [`Context::call`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The immutable run configuration
    pub fn config(&self) -> &TargetConfig {
        &self.target
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// `n` bytes from this context's generator
    pub fn rand_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        self.rng.fill_bytes(&mut out);
        out
    }

    /// Lowercase hex of `n` random bytes (`2 * n` characters)
    pub fn rand_string(&mut self, n: usize) -> String {
        hex::encode(self.rand_bytes(n))
    }

    /// A bucket name that will not exist on the target
    pub fn missing_bucket_name(&mut self) -> String {
        self.rand_string(MISSING_BUCKET_BYTES)
    }

    /// A valid bucket name for a bucket the probe creates itself
    pub fn scratch_bucket_name(&mut self) -> String {
        format!(
            "{}{}",
            SCRATCH_BUCKET_PREFIX,
            self.rand_string(SCRATCH_BUCKET_BYTES)
        )
    }

    /// Build a fresh client for the configured endpoint.
    ///
    /// No network I/O happens here; the first request connects.
    pub fn client(&self) -> Client {
        if self.target.verbose {
            debug!(
                endpoint = %self.target.endpoint,
                region = %self.target.region,
                path_style = self.target.path_style,
                trust = self.trust.name(),
                "building S3 client"
            );
        }

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.target.region.clone()))
            .endpoint_url(&self.target.endpoint)
            .credentials_provider(self.trust.credentials_provider())
            .force_path_style(self.target.path_style)
            .build();

        Client::from_conf(config)
    }

    /// Await `fut` under this context's cancellation scope and deadline.
    pub async fn call<F>(&self, operation: &str, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        trace!(operation, "calling");
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProbeError::Cancelled),
            res = tokio::time::timeout(self.timeout, fut) => res.map_err(|_| ProbeError::Timeout {
                operation: operation.to_string(),
                after: self.timeout,
            }),
        }
    }

    /// Read and validate the versioning state of `bucket`.
    pub async fn bucket_versioning(&self, client: &Client, bucket: &str) -> Result<BucketVersioning> {
        let outcome = self
            .call(
                "GetBucketVersioning",
                client.get_bucket_versioning().bucket(bucket).send(),
            )
            .await?;
        let output = expect_success("GetBucketVersioning", outcome)?;
        BucketVersioning::try_from(&output)
    }

    /// Write a versioning status. `Unversioned` cannot be written.
    pub async fn set_versioning(
        &self,
        client: &Client,
        bucket: &str,
        status: VersioningStatus,
    ) -> Result<()> {
        let sdk_status = status.to_sdk().ok_or_else(|| {
            ProbeError::execution(
                "PutBucketVersioning",
                "a bucket cannot be returned to the unversioned state",
            )
        })?;

        let configuration = VersioningConfiguration::builder().status(sdk_status).build();
        let outcome = self
            .call(
                "PutBucketVersioning",
                client
                    .put_bucket_versioning()
                    .bucket(bucket)
                    .versioning_configuration(configuration)
                    .send(),
            )
            .await?;
        expect_success("PutBucketVersioning", outcome)?;

        debug!(bucket, status = %status, "versioning updated");
        Ok(())
    }

    /// Enable versioning on `bucket` unless it already is.
    pub async fn ensure_versioning_enabled(&self, client: &Client, bucket: &str) -> Result<()> {
        let current = self.bucket_versioning(client, bucket).await?;
        if current.status == VersioningStatus::Enabled {
            trace!(bucket, "versioning already enabled");
            return Ok(());
        }
        self.set_versioning(client, bucket, VersioningStatus::Enabled)
            .await
    }

    /// Fail unless `bucket` has never had versioning configured.
    pub async fn ensure_versioning_never_enabled(&self, client: &Client, bucket: &str) -> Result<()> {
        let current = self.bucket_versioning(client, bucket).await?;
        if !current.is_never_enabled() {
            return Err(ProbeError::assertion(format!(
                "unexpected status, found {:?}",
                current.status.as_str()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("target", &self.target)
            .field("trust", &self.trust)
            .field("seed", &self.seed)
            .field("timeout", &self.timeout)
            .finish()
    }
}
