pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod provider;
pub mod services;

// Re-export key types for convenience

// Domain types - core entities, value objects and errors
pub use domain::{
    // Errors
    BackendError,
    BackendResult,
    // Value objects
    BucketName,
    // Models
    BucketRef,
    BulkDeleteReport,
    ErrorKind,
    ListingPage,
    ObjectContent,
    ObjectKey,
    ObjectRef,
    ObjectSummary,
    Operation,
    SignedUrlGrant,
    SignedUrlMethod,
    UploadPayload,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{ClientError, ClientResult, StorageBackend, StorageGateway};

// Service implementations
pub use services::{StorageGatewayBuilder, StorageGatewayImpl};

// Configuration and the shared client
pub use provider::{BackendConfig, ClientProvider, ConfigError};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, create_s3_app, AppBuilder, AppConfig, AppError,
    AppServices, BackendKind,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{InMemoryBackend, S3Backend, S3Settings};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, BackendConfig, BackendError, BucketName,
        ErrorKind, InMemoryBackend, ObjectKey, SignedUrlMethod, StorageGateway, UploadPayload,
    };
}
