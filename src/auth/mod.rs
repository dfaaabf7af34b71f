//! Trust providers for the probe client
//!
//! The client signs every request, even against emulators that ignore the
//! signature. A `TrustProvider` decides which keys go into that signature:
//! - Static keys (placeholder values by default)
//! - The standard AWS environment variables

pub mod environment;
pub mod static_keys;

use std::fmt;

use aws_credential_types::provider::SharedCredentialsProvider;

pub use environment::EnvironmentTrust;
pub use static_keys::StaticTrust;

/// Source of request-signing credentials, consulted each time a Context
/// builds a client.
pub trait TrustProvider: Send + Sync + fmt::Debug {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// Credentials provider handed to the S3 client config.
    fn credentials_provider(&self) -> SharedCredentialsProvider;
}
