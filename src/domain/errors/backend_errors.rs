use std::sync::Arc;

use crate::domain::errors::ValidationError;

/// Underlying failure kept alongside a [`BackendError`]
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The gateway operation an error was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateBucket,
    ListBuckets,
    DeleteBucket,
    ListObjects,
    GetObject,
    PutObject,
    DeleteObject,
    DeleteAllObjects,
    IssueUploadUrl,
    IssueDownloadUrl,
}

impl Operation {
    /// Stable snake_case identifier, used in logs and API error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateBucket => "create_bucket",
            Operation::ListBuckets => "list_buckets",
            Operation::DeleteBucket => "delete_bucket",
            Operation::ListObjects => "list_objects",
            Operation::GetObject => "get_object",
            Operation::PutObject => "put_object",
            Operation::DeleteObject => "delete_object",
            Operation::DeleteAllObjects => "delete_all_objects",
            Operation::IssueUploadUrl => "issue_upload_url",
            Operation::IssueDownloadUrl => "issue_download_url",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Operation::CreateBucket => "create bucket",
            Operation::ListBuckets => "list buckets",
            Operation::DeleteBucket => "delete bucket",
            Operation::ListObjects => "list objects",
            Operation::GetObject => "get object",
            Operation::PutObject => "put object",
            Operation::DeleteObject => "delete object",
            Operation::DeleteAllObjects => "delete objects",
            Operation::IssueUploadUrl => "issue upload URL",
            Operation::IssueDownloadUrl => "issue download URL",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing classification of a [`BackendError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bucket or object absent
    NotFound,
    /// Bucket exists on create, or is non-empty on delete
    Conflict,
    /// Bulk delete matched zero objects
    EmptyResult,
    /// Bucket name or key rejected before reaching the backend
    InvalidInput,
    /// Any other backend failure
    Backend,
}

/// The single error returned by every gateway operation
#[derive(Debug, Clone)]
pub enum BackendError {
    NotFound {
        operation: Operation,
        message: String,
        cause: Option<ErrorCause>,
    },

    Conflict {
        operation: Operation,
        message: String,
        cause: Option<ErrorCause>,
    },

    EmptyResult { operation: Operation, message: String },

    InvalidInput {
        operation: Operation,
        message: String,
        cause: Option<ErrorCause>,
    },

    Backend {
        operation: Operation,
        message: String,
        cause: Option<ErrorCause>,
    },
}

impl BackendError {
    /// Build an error of the given kind
    pub fn new(
        kind: ErrorKind,
        operation: Operation,
        message: impl Into<String>,
        cause: Option<ErrorCause>,
    ) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotFound => BackendError::NotFound {
                operation,
                message,
                cause,
            },
            ErrorKind::Conflict => BackendError::Conflict {
                operation,
                message,
                cause,
            },
            ErrorKind::EmptyResult => BackendError::EmptyResult { operation, message },
            ErrorKind::InvalidInput => BackendError::InvalidInput {
                operation,
                message,
                cause,
            },
            ErrorKind::Backend => BackendError::Backend {
                operation,
                message,
                cause,
            },
        }
    }

    /// Wrap a local validation failure
    pub fn invalid_input(operation: Operation, error: ValidationError) -> Self {
        BackendError::InvalidInput {
            operation,
            message: error.to_string(),
            cause: Some(Arc::new(error)),
        }
    }

    pub fn empty_result(operation: Operation, message: impl Into<String>) -> Self {
        BackendError::EmptyResult {
            operation,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::NotFound { .. } => ErrorKind::NotFound,
            BackendError::Conflict { .. } => ErrorKind::Conflict,
            BackendError::EmptyResult { .. } => ErrorKind::EmptyResult,
            BackendError::InvalidInput { .. } => ErrorKind::InvalidInput,
            BackendError::Backend { .. } => ErrorKind::Backend,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            BackendError::NotFound { operation, .. }
            | BackendError::Conflict { operation, .. }
            | BackendError::EmptyResult { operation, .. }
            | BackendError::InvalidInput { operation, .. }
            | BackendError::Backend { operation, .. } => *operation,
        }
    }

    /// The wrapped message, without the operation prefix
    pub fn message(&self) -> &str {
        match self {
            BackendError::NotFound { message, .. }
            | BackendError::Conflict { message, .. }
            | BackendError::EmptyResult { message, .. }
            | BackendError::InvalidInput { message, .. }
            | BackendError::Backend { message, .. } => message,
        }
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        match self {
            BackendError::NotFound { cause, .. }
            | BackendError::Conflict { cause, .. }
            | BackendError::InvalidInput { cause, .. }
            | BackendError::Backend { cause, .. } => cause.as_ref(),
            BackendError::EmptyResult { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to {}: {}",
            self.operation().description(),
            self.message()
        )
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause()
            .map(|cause| cause.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type for gateway operations
pub type BackendResult<T> = Result<T, BackendError>;
