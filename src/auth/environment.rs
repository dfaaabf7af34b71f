//! Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.

use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_credential_types::provider::SharedCredentialsProvider;

use super::TrustProvider;

/// Reads the standard AWS variables each time credentials are resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentTrust;

impl TrustProvider for EnvironmentTrust {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn credentials_provider(&self) -> SharedCredentialsProvider {
        SharedCredentialsProvider::new(EnvironmentVariableCredentialsProvider::new())
    }
}
