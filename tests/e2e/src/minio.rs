//! MinIO server for e2e runs

use anyhow::{Context as _, Result};
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use bollard::container::{Config, CreateContainerOptions, StartContainerOptions};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use bollard::Docker;
use futures::StreamExt;
use s3_probe::auth::{StaticTrust, TrustProvider};
use s3_probe::config::{TargetConfig, DEFAULT_REGION};
use s3_probe::Context;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MINIO_IMAGE: &str = "minio/minio:latest";
const MINIO_CONTAINER_NAME: &str = "s3-probe-e2e-minio";
const DEFAULT_ACCESS_KEY: &str = "minioadmin";
const DEFAULT_SECRET_KEY: &str = "minioadmin";
const DEFAULT_PORT: u16 = 9000;
const READY_ATTEMPTS: u32 = 30;

/// A reachable MinIO, either external or a container we started
pub struct MinioServer {
    docker: Option<Docker>,
    container_id: Option<String>,
    endpoint: String,
    access_key: String,
    secret_key: String,
    admin: S3Client,
}

impl MinioServer {
    /// Connect to `MINIO_ENDPOINT` or start (or reuse) a local container.
    ///
    /// `MINIO_ACCESS_KEY` / `MINIO_SECRET_KEY` override the default
    /// `minioadmin` credentials.
    pub async fn start() -> Result<Self> {
        let access_key =
            env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| DEFAULT_ACCESS_KEY.to_string());
        let secret_key =
            env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string());

        let (docker, container_id, endpoint) = match env::var("MINIO_ENDPOINT") {
            Ok(endpoint) => {
                info!("Using existing MinIO at {}", endpoint);
                (None, None, endpoint)
            }
            Err(_) => {
                let docker = Docker::connect_with_local_defaults()
                    .context("Failed to connect to Docker. Is Docker running?")?;
                let id = Self::ensure_container(&docker, &access_key, &secret_key).await?;
                (Some(docker), Some(id), format!("http://localhost:{}", DEFAULT_PORT))
            }
        };

        let admin = admin_client(&endpoint, &access_key, &secret_key);
        wait_until_ready(&admin).await?;

        Ok(Self {
            docker,
            container_id,
            endpoint,
            access_key,
            secret_key,
            admin,
        })
    }

    async fn ensure_container(docker: &Docker, access_key: &str, secret_key: &str) -> Result<String> {
        let containers = docker
            .list_containers::<String>(None)
            .await
            .context("Failed to list containers")?;

        let existing = containers.iter().find(|c| {
            c.names
                .as_ref()
                .is_some_and(|names| names.iter().any(|n| n.contains(MINIO_CONTAINER_NAME)))
        });
        if let Some(container) = existing {
            let id = container.id.clone().unwrap_or_default();
            info!("Reusing MinIO container {}", id);
            return Ok(id);
        }

        info!("Pulling {}", MINIO_IMAGE);
        let mut pull = docker.create_image(
            Some(CreateImageOptions {
                from_image: MINIO_IMAGE,
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = pull.next().await {
            if let Err(e) = progress {
                warn!("Image pull warning: {}", e);
            }
        }

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            "9000/tcp".to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: Some(DEFAULT_PORT.to_string()),
            }]),
        );

        let env_user = format!("MINIO_ROOT_USER={}", access_key);
        let env_pass = format!("MINIO_ROOT_PASSWORD={}", secret_key);
        let config = Config {
            image: Some(MINIO_IMAGE),
            env: Some(vec![env_user.as_str(), env_pass.as_str()]),
            cmd: Some(vec!["server", "/data"]),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let container = docker
            .create_container(
                Some(CreateContainerOptions {
                    name: MINIO_CONTAINER_NAME,
                    platform: None,
                }),
                config,
            )
            .await
            .context("Failed to create MinIO container")?;

        docker
            .start_container(&container.id, None::<StartContainerOptions<String>>)
            .await
            .context("Failed to start MinIO container")?;

        info!("MinIO container started: {}", container.id);
        Ok(container.id)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Target description for probe contexts
    pub fn target(&self) -> Arc<TargetConfig> {
        Arc::new(
            TargetConfig::new(self.endpoint.clone())
                .with_region(DEFAULT_REGION)
                .with_path_style(true),
        )
    }

    /// MinIO rejects the placeholder keys, so probes sign with the root pair
    pub fn trust(&self) -> Arc<dyn TrustProvider> {
        Arc::new(StaticTrust::new(self.access_key.clone(), self.secret_key.clone()))
    }

    /// Probe context bound to this server
    pub fn context(&self, seed: u64) -> Context {
        Context::new(self.target(), self.trust(), seed).with_timeout(Duration::from_secs(20))
    }

    /// Client used for setup and verification, outside any probe
    pub fn admin(&self) -> &S3Client {
        &self.admin
    }

    /// Create a uniquely named bucket directly
    pub async fn create_bucket(&self) -> Result<String> {
        let name = format!("e2e-{}", Uuid::new_v4());
        self.admin
            .create_bucket()
            .bucket(&name)
            .send()
            .await
            .context("Failed to create bucket")?;
        debug!("Created bucket {}", name);
        Ok(name)
    }

    pub async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.admin
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .context("Failed to delete bucket")?;
        Ok(())
    }

    /// Whether any bucket with `prefix` is left behind
    pub async fn has_bucket_with_prefix(&self, prefix: &str) -> Result<bool> {
        let buckets = self.admin.list_buckets().send().await?;
        Ok(buckets
            .buckets()
            .iter()
            .filter_map(|b| b.name())
            .any(|n| n.starts_with(prefix)))
    }

    /// Stop and remove the container unless `KEEP_MINIO` is set
    pub async fn stop(self) -> Result<()> {
        if env::var("KEEP_MINIO").is_ok() {
            return Ok(());
        }
        if let (Some(docker), Some(id)) = (&self.docker, &self.container_id) {
            info!("Stopping MinIO container {}", id);
            docker.stop_container(id, None).await?;
            docker.remove_container(id, None).await?;
        }
        Ok(())
    }
}

fn admin_client(endpoint: &str, access_key: &str, secret_key: &str) -> S3Client {
    let credentials = Credentials::new(access_key, secret_key, None, None, "s3-probe-e2e");

    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(DEFAULT_REGION))
        .endpoint_url(endpoint)
        .credentials_provider(credentials)
        .force_path_style(true)
        .build();

    S3Client::from_conf(config)
}

async fn wait_until_ready(client: &S3Client) -> Result<()> {
    let mut attempts = 0;
    loop {
        match client.list_buckets().send().await {
            Ok(_) => {
                info!("MinIO is ready");
                return Ok(());
            }
            Err(e) => {
                attempts += 1;
                if attempts >= READY_ATTEMPTS {
                    anyhow::bail!("MinIO not ready after {} attempts: {}", attempts, e);
                }
                debug!("MinIO not ready yet (attempt {}): {}", attempts, e);
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
