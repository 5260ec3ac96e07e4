use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::{BackendError, ErrorKind},
    models::{
        BucketRef, BulkDeleteReport, ListingPage, ObjectRef, ObjectSummary, SignedUrlGrant,
    },
};

/// DTO for bucket information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketDto {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// DTO for creating a bucket
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBucketDto {
    pub name: String,
}

/// DTO for object information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfoDto {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: Option<String>,
}

/// Query parameters for listing and bulk-deleting objects
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefixQueryDto {
    pub prefix: Option<String>,
}

/// DTO for object list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListObjectsResponseDto {
    pub bucket: String,
    pub prefix: Option<String>,
    pub objects: Vec<ObjectInfoDto>,
    pub is_truncated: bool,
    pub total_count: usize,
}

/// DTO returned after an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObjectDto {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFailureDto {
    pub key: String,
    pub message: String,
}

/// DTO for bulk delete response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResponseDto {
    pub bucket: String,
    pub prefix: Option<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<DeleteFailureDto>,
    pub deleted_count: usize,
}

/// DTO for requesting a signed URL
#[derive(Debug, Clone, Deserialize)]
pub struct SignUrlDto {
    pub key: String,
    /// `PUT`/`upload` or `GET`/`download`
    pub method: String,
}

/// DTO for an issued signed URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrlDto {
    pub url: String,
    pub method: String,
    pub bucket: String,
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub operation: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponseDto {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// Conversion implementations

impl From<BucketRef> for BucketDto {
    fn from(bucket: BucketRef) -> Self {
        BucketDto {
            name: bucket.name.into_inner(),
            created_at: bucket.created_at,
        }
    }
}

impl From<ObjectSummary> for ObjectInfoDto {
    fn from(summary: ObjectSummary) -> Self {
        ObjectInfoDto {
            key: summary.key.as_str().to_string(),
            size: summary.size,
            last_modified: summary.last_modified,
            etag: summary.etag,
        }
    }
}

impl From<ListingPage> for ListObjectsResponseDto {
    fn from(page: ListingPage) -> Self {
        let objects: Vec<ObjectInfoDto> = page.items.into_iter().map(Into::into).collect();
        ListObjectsResponseDto {
            bucket: page.bucket.into_inner(),
            prefix: page.prefix,
            total_count: objects.len(),
            objects,
            is_truncated: page.is_truncated,
        }
    }
}

impl From<ObjectRef> for StoredObjectDto {
    fn from(object: ObjectRef) -> Self {
        StoredObjectDto {
            bucket: object.bucket.into_inner(),
            key: object.key.as_str().to_string(),
        }
    }
}

impl From<BulkDeleteReport> for BulkDeleteResponseDto {
    fn from(report: BulkDeleteReport) -> Self {
        BulkDeleteResponseDto {
            deleted_count: report.deleted_count(),
            bucket: report.bucket.into_inner(),
            prefix: report.prefix,
            deleted: report
                .deleted
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            failed: report
                .failed
                .into_iter()
                .map(|f| DeleteFailureDto {
                    key: f.key.as_str().to_string(),
                    message: f.message,
                })
                .collect(),
        }
    }
}

impl From<SignedUrlGrant> for SignedUrlDto {
    fn from(grant: SignedUrlGrant) -> Self {
        SignedUrlDto {
            url: grant.url,
            method: grant.method.as_str().to_string(),
            bucket: grant.bucket.into_inner(),
            key: grant.key.as_str().to_string(),
            expires_at: grant.expires_at,
        }
    }
}

/// HTTP status for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound | ErrorKind::EmptyResult => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Backend => StatusCode::BAD_GATEWAY,
    }
}

impl ErrorResponseDto {
    pub fn from_backend_error(error: &BackendError) -> Self {
        let label = match error.kind() {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::EmptyResult => "EmptyResult",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Backend => "BackendError",
        };
        ErrorResponseDto {
            error: label.to_string(),
            operation: Some(error.operation().as_str().to_string()),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        ErrorResponseDto {
            error: "BadRequest".to_string(),
            operation: None,
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::Operation;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::EmptyResult), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Backend), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_body_names_operation() {
        let error = BackendError::empty_result(Operation::DeleteAllObjects, "nothing under docs");
        let body = ErrorResponseDto::from_backend_error(&error);
        assert_eq!(body.error, "EmptyResult");
        assert_eq!(body.operation.as_deref(), Some("delete_all_objects"));
        assert_eq!(body.message, "Failed to delete objects: nothing under docs");
    }
}
