use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::value_objects::{BucketName, ObjectKey};

/// Identifies one stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: BucketName,
    pub key: ObjectKey,
}

/// One entry of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: Option<String>,
}

impl ObjectSummary {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
        }
    }
}

/// A single page of a listing.
///
/// Listings never follow continuation tokens. `is_truncated` is set when the
/// backend had more matches than fit in this page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub bucket: BucketName,
    pub prefix: Option<String>,
    pub items: Vec<ObjectSummary>,
    pub is_truncated: bool,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.items.iter().map(|item| &item.key)
    }
}

/// Object data plus metadata returned by a get
#[derive(Debug, Clone)]
pub struct ObjectContent {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub data: Bytes,
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// A file handed to `put_object`
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub original_name: String,
    pub content: Bytes,
    pub content_type: Option<String>,
}

impl UploadPayload {
    pub fn new(original_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            content: content.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A key the backend refused to delete during a bulk delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub key: ObjectKey,
    pub message: String,
}

/// Outcome of `delete_all_objects`.
///
/// Bulk deletes are not transactional: some keys may be gone while others
/// are listed in `failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub bucket: BucketName,
    pub prefix: Option<String>,
    pub deleted: Vec<ObjectKey>,
    pub failed: Vec<DeleteFailure>,
}

impl BulkDeleteReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
