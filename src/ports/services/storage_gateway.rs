use async_trait::async_trait;

use crate::domain::{
    errors::BackendResult,
    models::{
        BucketRef, BulkDeleteReport, ListingPage, ObjectContent, ObjectRef, SignedUrlGrant,
        UploadPayload,
    },
    value_objects::BucketName,
};

/// Port for the storage gateway.
///
/// Operations are stateless and independent. Each one makes a single
/// backend call (bulk delete makes a listing call first) and reports
/// failures as a [`BackendError`](crate::domain::errors::BackendError)
/// naming the operation.
#[async_trait]
pub trait StorageGateway: Send + Sync + 'static {
    /// Bucket used when a caller does not name one
    fn default_bucket(&self) -> &BucketName;

    async fn create_bucket(&self, name: &str) -> BackendResult<BucketRef>;

    async fn list_buckets(&self) -> BackendResult<Vec<BucketRef>>;

    /// Fails if the bucket still holds objects
    async fn delete_bucket(&self, name: &str) -> BackendResult<()>;

    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> BackendResult<ListingPage>;

    async fn get_object(&self, bucket: &str, key: &str) -> BackendResult<ObjectContent>;

    /// Store `payload` under `"{key_prefix}/{original_name}"`, overwriting
    async fn put_object(
        &self,
        bucket: &str,
        key_prefix: &str,
        payload: UploadPayload,
    ) -> BackendResult<ObjectRef>;

    async fn delete_object(&self, bucket: &str, key: &str) -> BackendResult<()>;

    /// Delete every object on the first listing page under `prefix`.
    /// An empty listing is an error, not a no-op.
    async fn delete_all_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> BackendResult<BulkDeleteReport>;

    async fn issue_upload_url(&self, bucket: &str, key: &str) -> BackendResult<SignedUrlGrant>;

    async fn issue_download_url(&self, bucket: &str, key: &str) -> BackendResult<SignedUrlGrant>;
}
