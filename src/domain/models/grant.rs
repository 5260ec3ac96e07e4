use chrono::{DateTime, Utc};

use crate::domain::value_objects::{BucketName, ObjectKey};

/// Validity window applied to signed URLs unless configured otherwise
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Longest validity S3 accepts for a presigned URL (7 days)
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 604_800;

/// The single HTTP method a signed URL authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignedUrlMethod {
    Put,
    Get,
}

impl SignedUrlMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignedUrlMethod::Put => "PUT",
            SignedUrlMethod::Get => "GET",
        }
    }
}

impl std::fmt::Display for SignedUrlMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignedUrlMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUT" | "UPLOAD" => Ok(SignedUrlMethod::Put),
            "GET" | "DOWNLOAD" => Ok(SignedUrlMethod::Get),
            other => Err(format!("unsupported signed URL method: {}", other)),
        }
    }
}

/// A time-boxed URL granting one operation on one key.
///
/// Grants are not persisted and cannot be renewed; issue a new one after
/// `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlGrant {
    pub url: String,
    pub method: SignedUrlMethod,
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub expires_at: DateTime<Utc>,
}

impl SignedUrlGrant {
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
