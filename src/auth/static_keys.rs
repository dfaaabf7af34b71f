//! Fixed key pair, used for unauthenticated or dummy-trust endpoints.

use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;

use super::TrustProvider;
use crate::config::{DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY};

const PROVIDER_NAME: &str = "s3-probe-static";

/// Signs with a fixed access/secret pair.
#[derive(Clone)]
pub struct StaticTrust {
    access_key: String,
    secret_key: String,
}

impl StaticTrust {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The placeholder pair used when no credentials are configured.
    pub fn placeholder() -> Self {
        Self::new(DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY)
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

impl Default for StaticTrust {
    fn default() -> Self {
        Self::placeholder()
    }
}

// Keep the secret out of debug output
impl std::fmt::Debug for StaticTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTrust")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .finish()
    }
}

impl TrustProvider for StaticTrust {
    fn name(&self) -> &'static str {
        "static"
    }

    fn credentials_provider(&self) -> SharedCredentialsProvider {
        SharedCredentialsProvider::new(Credentials::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            None,
            None,
            PROVIDER_NAME,
        ))
    }
}
