//! Error classification
//!
//! Probes assert that a call fails with one specific S3 error code. Whether an
//! SDK error carries such a code decides how a mismatch is reported:
//!
//! - a service response with a code is target behaviour, so a wrong code (or an
//!   unexpected success) is an assertion failure;
//! - anything else (timeouts, connection failures, unparseable responses) is an
//!   execution error and never counts against the target.

use std::error::Error as StdError;
use std::fmt;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::trace;

use crate::error::{ProbeError, Result};

/// Error codes the built-in probes assert on
pub mod codes {
    pub const NO_SUCH_BUCKET: &str = "NoSuchBucket";
    pub const NO_SUCH_KEY: &str = "NoSuchKey";
    pub const NO_SUCH_UPLOAD: &str = "NoSuchUpload";
}

/// Normalized view of an SDK error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The target answered with an error document carrying `code`
    Recognized { code: String, status: u16 },
    /// Transport, timeout, construction or shape failure
    Unrecognized,
}

impl Classification {
    pub fn code(&self) -> Option<&str> {
        match self {
            Classification::Recognized { code, .. } => Some(code),
            Classification::Unrecognized => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Classification::Recognized { status, .. } => Some(*status),
            Classification::Unrecognized => None,
        }
    }

    pub fn is_code(&self, expected: &str) -> bool {
        self.code() == Some(expected)
    }
}

/// Extract the semantic error code from an SDK error, if it has one.
pub fn classify<E>(err: &SdkError<E>) -> Classification
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::ServiceError(service) => match service.err().code() {
            Some(code) if !code.is_empty() => Classification::Recognized {
                code: code.to_string(),
                status: service.raw().status().as_u16(),
            },
            _ => Classification::Unrecognized,
        },
        _ => Classification::Unrecognized,
    }
}

/// Assert that `outcome` is a failure classified as `expected`.
pub fn expect_error_code<T, E>(
    operation: &str,
    outcome: std::result::Result<T, SdkError<E>>,
    expected: &str,
) -> Result<()>
where
    T: fmt::Debug,
    E: ProvideErrorMetadata + StdError + 'static,
{
    let err = match outcome {
        Ok(output) => {
            return Err(ProbeError::assertion(format!(
                "{}: expected {}, but call succeeded: {:?}",
                operation, expected, output
            )))
        }
        Err(err) => err,
    };

    match classify(&err) {
        Classification::Recognized { code, status } if code == expected => {
            trace!(operation, code = %code, status, "observed expected error");
            Ok(())
        }
        Classification::Recognized { code, status } => Err(ProbeError::assertion(format!(
            "{}: expected {}, found {} (HTTP {})",
            operation, expected, code, status
        ))),
        Classification::Unrecognized => Err(ProbeError::execution(
            operation,
            DisplayErrorContext(&err).to_string(),
        )),
    }
}

/// Require `outcome` to succeed; a coded failure is an assertion failure.
pub fn expect_success<T, E>(operation: &str, outcome: std::result::Result<T, SdkError<E>>) -> Result<T>
where
    E: ProvideErrorMetadata + StdError + 'static,
{
    match outcome {
        Ok(output) => Ok(output),
        Err(err) => match classify(&err) {
            Classification::Recognized { code, status } => Err(ProbeError::assertion(format!(
                "{}: call unexpectedly failed with {} (HTTP {})",
                operation, code, status
            ))),
            Classification::Unrecognized => Err(ProbeError::execution(
                operation,
                DisplayErrorContext(&err).to_string(),
            )),
        },
    }
}
