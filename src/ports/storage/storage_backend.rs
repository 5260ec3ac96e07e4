use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::domain::{
    errors::ErrorKind,
    models::{BucketRef, DeleteFailure, ListingPage, ObjectContent, SignedUrlMethod},
    value_objects::{BucketName, ObjectKey},
};

/// Maximum number of entries a backend returns in one listing page
pub const LISTING_PAGE_LIMIT: usize = 1000;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raw failure reported by a storage backend client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no such bucket: {bucket}")]
    NoSuchBucket { bucket: String },

    #[error("no such key: {key}")]
    NoSuchKey { key: String },

    #[error("bucket already exists: {bucket}")]
    BucketAlreadyExists { bucket: String },

    #[error("bucket is not empty: {bucket}")]
    BucketNotEmpty { bucket: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("signed URL rejected: {reason}")]
    SignatureRejected { reason: String },

    #[error("service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("{message}")]
    Other {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ClientError {
    pub fn other(message: impl Into<String>) -> Self {
        ClientError::Other {
            message: message.into(),
            source: None,
        }
    }

    /// How the gateway classifies this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NoSuchBucket { .. } | ClientError::NoSuchKey { .. } => {
                ErrorKind::NotFound
            }
            ClientError::BucketAlreadyExists { .. } | ClientError::BucketNotEmpty { .. } => {
                ErrorKind::Conflict
            }
            ClientError::InvalidRequest { .. } => ErrorKind::InvalidInput,
            ClientError::SignatureRejected { .. }
            | ClientError::Service { .. }
            | ClientError::Other { .. } => ErrorKind::Backend,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Per-key outcome of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteResult {
    pub deleted: Vec<ObjectKey>,
    pub failed: Vec<DeleteFailure>,
}

/// Port for the external object-storage service.
///
/// Each method is one backend call. Implementations must be safe to share
/// across concurrent operations and must not retry.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Create a bucket; fails if it already exists
    async fn create_bucket(&self, bucket: &BucketName) -> ClientResult<BucketRef>;

    /// List all buckets visible to the configured credentials
    async fn list_buckets(&self) -> ClientResult<Vec<BucketRef>>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &BucketName) -> ClientResult<()>;

    /// List the first page of objects whose key starts with `prefix`
    async fn list_objects(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> ClientResult<ListingPage>;

    /// Fetch an object's data and metadata
    async fn get_object(&self, bucket: &BucketName, key: &ObjectKey) -> ClientResult<ObjectContent>;

    /// Store an object in one request, replacing any existing object
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()>;

    /// Delete an object; deleting a missing key succeeds
    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey) -> ClientResult<()>;

    /// Delete several keys in one request
    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
    ) -> ClientResult<BulkDeleteResult>;

    /// Produce a URL authorizing `method` on `key` for `expires_in`
    async fn presign(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        method: SignedUrlMethod,
        expires_in: Duration,
    ) -> ClientResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = ClientError::NoSuchKey {
            key: "docs/a.txt".to_string(),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let not_empty = ClientError::BucketNotEmpty {
            bucket: "b1b".to_string(),
        };
        assert_eq!(not_empty.kind(), ErrorKind::Conflict);

        let service = ClientError::Service {
            status: 503,
            code: "SlowDown".to_string(),
            message: "Please reduce your request rate.".to_string(),
        };
        assert_eq!(service.kind(), ErrorKind::Backend);
        assert_eq!(
            service.to_string(),
            "service error 503 (SlowDown): Please reduce your request rate."
        );
    }
}
