use async_trait::async_trait;
use chrono::{SubsecRound, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{BackendError, BackendResult, Operation},
        models::{
            BucketRef, BulkDeleteReport, ListingPage, ObjectContent, ObjectRef, SignedUrlGrant,
            SignedUrlMethod, UploadPayload,
        },
        value_objects::{BucketName, ObjectKey},
    },
    ports::{
        services::StorageGateway,
        storage::{ClientError, StorageBackend},
    },
    provider::ClientProvider,
};

/// Gateway that forwards each operation to the provider's shared client
#[derive(Clone)]
pub struct StorageGatewayImpl {
    provider: Arc<ClientProvider>,
}

impl StorageGatewayImpl {
    pub fn new(provider: Arc<ClientProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<ClientProvider> {
        &self.provider
    }

    fn client(&self) -> &dyn StorageBackend {
        self.provider.client().as_ref()
    }

    async fn issue_url(
        &self,
        operation: Operation,
        bucket: &str,
        key: &str,
        method: SignedUrlMethod,
    ) -> BackendResult<SignedUrlGrant> {
        let bucket = parse_bucket(operation, bucket)?;
        let key = parse_key(operation, key)?;
        let ttl = self.provider.signed_url_ttl();

        debug!(bucket = %bucket, key = %key, method = %method, ttl_secs = ttl.as_secs(), "issuing signed URL");

        // Anchored before the backend call, in whole seconds, so the grant never outlives the URL.
        let issued_at = Utc::now().trunc_subsecs(0);
        let expires_at = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| BackendError::InvalidInput {
                operation,
                message: format!("signed URL lifetime of {}s is out of range", ttl.as_secs()),
                cause: None,
            })?;

        let url = self
            .client()
            .presign(&bucket, &key, method, ttl)
            .await
            .map_err(|e| normalize(operation, e))?;

        Ok(SignedUrlGrant {
            url,
            method,
            bucket,
            key,
            expires_at,
        })
    }
}

fn parse_bucket(operation: Operation, name: &str) -> BackendResult<BucketName> {
    BucketName::new(name).map_err(|e| BackendError::invalid_input(operation, e))
}

fn parse_key(operation: Operation, key: &str) -> BackendResult<ObjectKey> {
    ObjectKey::new(key).map_err(|e| BackendError::invalid_input(operation, e))
}

fn normalize_prefix(prefix: Option<&str>) -> Option<&str> {
    prefix.filter(|p| !p.is_empty())
}

/// Wrap a raw client failure with the operation that raised it
fn normalize(operation: Operation, err: ClientError) -> BackendError {
    let kind = err.kind();
    let error = BackendError::new(kind, operation, err.to_string(), Some(Arc::new(err)));
    warn!(operation = %operation, kind = ?kind, "{}", error);
    error
}

#[async_trait]
impl StorageGateway for StorageGatewayImpl {
    fn default_bucket(&self) -> &BucketName {
        self.provider.default_bucket()
    }

    async fn create_bucket(&self, name: &str) -> BackendResult<BucketRef> {
        let operation = Operation::CreateBucket;
        let bucket = parse_bucket(operation, name)?;

        let created = self
            .client()
            .create_bucket(&bucket)
            .await
            .map_err(|e| normalize(operation, e))?;

        info!(bucket = %bucket, "bucket created");
        Ok(created)
    }

    async fn list_buckets(&self) -> BackendResult<Vec<BucketRef>> {
        let buckets = self
            .client()
            .list_buckets()
            .await
            .map_err(|e| normalize(Operation::ListBuckets, e))?;

        debug!(count = buckets.len(), "listed buckets");
        Ok(buckets)
    }

    async fn delete_bucket(&self, name: &str) -> BackendResult<()> {
        let operation = Operation::DeleteBucket;
        let bucket = parse_bucket(operation, name)?;

        self.client()
            .delete_bucket(&bucket)
            .await
            .map_err(|e| normalize(operation, e))?;

        info!(bucket = %bucket, "bucket deleted");
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> BackendResult<ListingPage> {
        let operation = Operation::ListObjects;
        let bucket = parse_bucket(operation, bucket)?;
        let prefix = normalize_prefix(prefix);

        let page = self
            .client()
            .list_objects(&bucket, prefix)
            .await
            .map_err(|e| normalize(operation, e))?;

        if page.is_truncated {
            warn!(
                bucket = %bucket,
                prefix = prefix.unwrap_or(""),
                returned = page.len(),
                "listing truncated to a single page"
            );
        }
        Ok(page)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> BackendResult<ObjectContent> {
        let operation = Operation::GetObject;
        let bucket = parse_bucket(operation, bucket)?;
        let key = parse_key(operation, key)?;

        debug!(bucket = %bucket, key = %key, "getting object");
        self.client()
            .get_object(&bucket, &key)
            .await
            .map_err(|e| normalize(operation, e))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key_prefix: &str,
        payload: UploadPayload,
    ) -> BackendResult<ObjectRef> {
        let operation = Operation::PutObject;
        let bucket = parse_bucket(operation, bucket)?;
        let key = ObjectKey::from_upload(key_prefix, &payload.original_name)
            .map_err(|e| BackendError::invalid_input(operation, e))?;

        debug!(bucket = %bucket, key = %key, size = payload.content.len(), "putting object");
        self.client()
            .put_object(
                &bucket,
                &key,
                payload.content,
                payload.content_type.as_deref(),
            )
            .await
            .map_err(|e| normalize(operation, e))?;

        Ok(ObjectRef { bucket, key })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> BackendResult<()> {
        let operation = Operation::DeleteObject;
        let bucket = parse_bucket(operation, bucket)?;
        let key = parse_key(operation, key)?;

        debug!(bucket = %bucket, key = %key, "deleting object");
        self.client()
            .delete_object(&bucket, &key)
            .await
            .map_err(|e| normalize(operation, e))
    }

    async fn delete_all_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> BackendResult<BulkDeleteReport> {
        let operation = Operation::DeleteAllObjects;
        let bucket = parse_bucket(operation, bucket)?;
        let prefix = normalize_prefix(prefix);

        let page = self
            .client()
            .list_objects(&bucket, prefix)
            .await
            .map_err(|e| normalize(operation, e))?;

        // An empty listing is reported as a failure rather than a no-op.
        if page.is_empty() {
            return Err(BackendError::empty_result(
                operation,
                format!(
                    "no objects found in bucket '{}' under prefix '{}'",
                    bucket,
                    prefix.unwrap_or("")
                ),
            ));
        }

        let keys: Vec<ObjectKey> = page.items.into_iter().map(|item| item.key).collect();
        debug!(bucket = %bucket, count = keys.len(), "bulk deleting objects");

        let result = self
            .client()
            .delete_objects(&bucket, &keys)
            .await
            .map_err(|e| normalize(operation, e))?;

        if !result.failed.is_empty() {
            warn!(
                bucket = %bucket,
                deleted = result.deleted.len(),
                failed = result.failed.len(),
                "bulk delete partially failed"
            );
        }

        Ok(BulkDeleteReport {
            bucket,
            prefix: prefix.map(str::to_string),
            deleted: result.deleted,
            failed: result.failed,
        })
    }

    async fn issue_upload_url(&self, bucket: &str, key: &str) -> BackendResult<SignedUrlGrant> {
        self.issue_url(Operation::IssueUploadUrl, bucket, key, SignedUrlMethod::Put)
            .await
    }

    async fn issue_download_url(&self, bucket: &str, key: &str) -> BackendResult<SignedUrlGrant> {
        self.issue_url(Operation::IssueDownloadUrl, bucket, key, SignedUrlMethod::Get)
            .await
    }
}

/// Builder for StorageGatewayImpl
#[derive(Default)]
pub struct StorageGatewayBuilder {
    provider: Option<Arc<ClientProvider>>,
}

impl StorageGatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Arc<ClientProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> Result<StorageGatewayImpl, &'static str> {
        let provider = self.provider.ok_or("Provider is required")?;
        Ok(StorageGatewayImpl::new(provider))
    }
}
