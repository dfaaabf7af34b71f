//! Bucket versioning state
//!
//! GetBucketVersioning reports a status and an MFA-delete flag as free-form
//! strings. Only a closed vocabulary is understood here; anything else is a
//! contract violation and stops the probe.

use std::fmt;

use aws_sdk_s3::operation::get_bucket_versioning::GetBucketVersioningOutput;
use aws_sdk_s3::types::BucketVersioningStatus;

use crate::error::{ProbeError, Result};

/// Versioning status of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersioningStatus {
    /// Versioning was never configured (empty status)
    Unversioned,
    Enabled,
    Suspended,
}

impl VersioningStatus {
    /// Wire value; the empty string for `Unversioned`
    pub fn as_str(&self) -> &'static str {
        match self {
            VersioningStatus::Unversioned => "",
            VersioningStatus::Enabled => "Enabled",
            VersioningStatus::Suspended => "Suspended",
        }
    }

    /// Value to send in PutBucketVersioning. `Unversioned` cannot be set.
    pub fn to_sdk(self) -> Option<BucketVersioningStatus> {
        match self {
            VersioningStatus::Unversioned => None,
            VersioningStatus::Enabled => Some(BucketVersioningStatus::Enabled),
            VersioningStatus::Suspended => Some(BucketVersioningStatus::Suspended),
        }
    }
}

impl fmt::Display for VersioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersioningStatus::Unversioned => f.write_str("Unversioned"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// MFA-delete flag. An enabled flag is outside what the probes support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaDelete {
    /// Not reported
    Unset,
    Disabled,
}

/// Validated result of GetBucketVersioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketVersioning {
    pub status: VersioningStatus,
    pub mfa_delete: MfaDelete,
}

impl BucketVersioning {
    /// Validate raw status strings against the known vocabulary.
    pub fn parse(status: Option<&str>, mfa_delete: Option<&str>) -> Result<Self> {
        let status = match status.unwrap_or("") {
            "" => VersioningStatus::Unversioned,
            "Enabled" => VersioningStatus::Enabled,
            "Suspended" => VersioningStatus::Suspended,
            other => {
                return Err(ProbeError::ContractViolation(format!(
                    "unexpected status {:?}",
                    other
                )))
            }
        };

        let mfa_delete = match mfa_delete.unwrap_or("") {
            "" => MfaDelete::Unset,
            "Disabled" => MfaDelete::Disabled,
            other => {
                return Err(ProbeError::ContractViolation(format!(
                    "unexpected MFADelete {:?}",
                    other
                )))
            }
        };

        Ok(Self { status, mfa_delete })
    }

    pub fn is_never_enabled(&self) -> bool {
        self.status == VersioningStatus::Unversioned
    }
}

impl TryFrom<&GetBucketVersioningOutput> for BucketVersioning {
    type Error = ProbeError;

    fn try_from(output: &GetBucketVersioningOutput) -> Result<Self> {
        Self::parse(
            output.status().map(|s| s.as_str()),
            output.mfa_delete().map(|m| m.as_str()),
        )
    }
}
