mod storage_backend;

pub use storage_backend::{
    BoxError, BulkDeleteResult, ClientError, ClientResult, StorageBackend, LISTING_PAGE_LIMIT,
};
