// Infrastructure error conversions
pub mod error;

// Shared object operations over `object_store`
pub mod bucket_store;

// Backend implementations
pub mod memory;
pub mod s3;

// Re-export key types
pub use bucket_store::BucketStore;
pub use memory::InMemoryBackend;
pub use s3::{S3Backend, S3Settings};
