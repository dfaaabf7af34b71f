//! Configuration parsing and structures

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::{EnvironmentTrust, StaticTrust, TrustProvider};
use crate::env::expand_env;

/// Placeholder access key used when no credentials are configured
pub const DEFAULT_ACCESS_KEY: &str = "dummy-access";
/// Placeholder secret key used when no credentials are configured
pub const DEFAULT_SECRET_KEY: &str = "dummy-secret";
/// Region used when the config does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// SDK targets that emit request/response detail when `verbose` is set
const WIRE_LOG_DIRECTIVES: &[&str] = &[
    "aws_smithy_runtime=trace",
    "aws_smithy_runtime_api=trace",
    "aws_sigv4=debug",
    "hyper=debug",
];

// =============================================================================
// Raw Config (Deserialized from YAML)
// =============================================================================

/// Raw configuration as deserialized from YAML.
/// This is converted to `Config` via `resolve()`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Endpoint under test
    pub target: RawTargetConfig,

    /// Runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Result rendering
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target section before defaults are applied
#[derive(Debug, Clone, Deserialize)]
pub struct RawTargetConfig {
    /// Endpoint URL (http or https)
    pub endpoint: String,

    /// Signing region
    pub region: Option<String>,

    /// Use path-style addressing (MinIO, emulators)
    #[serde(default)]
    pub path_style: bool,

    /// Emit wire-level SDK logs
    #[serde(default)]
    pub verbose: bool,

    /// Credential source
    pub credentials: Option<CredentialsConfig>,
}

/// Credential source (tagged enum)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CredentialsConfig {
    /// Fixed key pair; defaults to placeholder values
    Static {
        #[serde(default = "default_access_key")]
        access_key: String,
        #[serde(default = "default_secret_key")]
        secret_key: String,
    },
    /// Standard `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` variables
    Environment,
}

fn default_access_key() -> String {
    DEFAULT_ACCESS_KEY.to_string()
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        CredentialsConfig::Static {
            access_key: default_access_key(),
            secret_key: default_secret_key(),
        }
    }
}

impl CredentialsConfig {
    /// Build the trust provider this section describes
    pub fn trust_provider(&self) -> Arc<dyn TrustProvider> {
        match self {
            CredentialsConfig::Static {
                access_key,
                secret_key,
            } => Arc::new(StaticTrust::new(access_key.clone(), secret_key.clone())),
            CredentialsConfig::Environment => Arc::new(EnvironmentTrust),
        }
    }
}

// =============================================================================
// Resolved Config (Ready for use)
// =============================================================================

/// Top-level configuration (resolved from RawConfig)
#[derive(Debug, Clone)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Endpoint under test
    pub target: TargetConfig,

    /// Credential source
    pub credentials: CredentialsConfig,

    /// Runner settings
    pub runner: RunnerConfig,

    /// Result rendering
    pub output: OutputConfig,
}

/// Immutable description of the endpoint every probe talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub endpoint: String,
    pub region: String,
    pub path_style: bool,
    pub verbose: bool,
}

impl TargetConfig {
    /// Target with default region and virtual-host addressing
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: DEFAULT_REGION.to_string(),
            path_style: false,
            verbose: false,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_path_style(mut self, path_style: bool) -> Self {
        self.path_style = path_style;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Filter directives for `EnvFilter`, widened with SDK wire logging when verbose
    pub fn filter_directives(&self, verbose: bool) -> String {
        if !verbose {
            return self.level.clone();
        }
        let mut directives = vec![self.level.clone()];
        directives.extend(WIRE_LOG_DIRECTIVES.iter().map(|d| d.to_string()));
        directives.join(",")
    }
}

/// How probes receive their Context
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Fresh Context per probe
    #[default]
    PerProbe,
    /// One Context for the whole run; probes execute one at a time
    Shared,
}

/// Runner settings
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Process-level seed; random when absent
    pub seed: Option<u64>,

    /// Maximum probes in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline applied to each network call
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Context sharing policy
    #[serde(default)]
    pub context: ContextMode,

    /// Restrict the run to these probe names
    #[serde(default)]
    pub only: Vec<String>,
}

fn default_concurrency() -> usize {
    1
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            concurrency: default_concurrency(),
            timeout: default_timeout(),
            context: ContextMode::default(),
            only: Vec::new(),
        }
    }
}

/// Result rendering format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

// =============================================================================
// Resolution Logic
// =============================================================================

impl RawConfig {
    /// Resolve raw config into final config by applying defaults
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let RawConfig {
            logging,
            target,
            runner,
            output,
        } = self;

        let region = target
            .region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Config {
            logging,
            target: TargetConfig {
                endpoint: target.endpoint.trim().to_string(),
                region,
                path_style: target.path_style,
                verbose: target.verbose,
            },
            credentials: target.credentials.unwrap_or_default(),
            runner,
            output,
        })
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.clone(), e.to_string()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a YAML string, expanding `${VAR}` references first
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env(content)?;
        let raw: RawConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        raw.resolve()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = &self.target.endpoint;
        let host = endpoint
            .strip_prefix("http://")
            .or_else(|| endpoint.strip_prefix("https://"))
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "target.endpoint must be an http or https URL, got {:?}",
                    endpoint
                ))
            })?;
        if host.is_empty() || host.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "target.endpoint {:?} has no host",
                endpoint
            )));
        }

        if self.runner.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "runner.concurrency must be at least 1".to_string(),
            ));
        }

        if self.runner.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "runner.timeout must be greater than zero".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.runner.only {
            if !seen.insert(name) {
                return Err(ConfigError::ValidationError(format!(
                    "runner.only lists {:?} more than once",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Missing environment variables: {0}")]
    MissingEnv(String),
}
