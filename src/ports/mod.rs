pub mod services;
pub mod storage;

pub use services::StorageGateway;
pub use storage::{BulkDeleteResult, ClientError, ClientResult, StorageBackend};
