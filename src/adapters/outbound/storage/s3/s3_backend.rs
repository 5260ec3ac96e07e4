use async_trait::async_trait;
use bytes::Bytes;
use object_store::{aws::AmazonS3, signer::Signer};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;

use super::{create_s3_store, S3BucketClient, S3Settings};
use crate::{
    adapters::outbound::storage::bucket_store::BucketStore,
    domain::{
        models::{BucketRef, ListingPage, ObjectContent, SignedUrlMethod},
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{BulkDeleteResult, ClientResult, StorageBackend},
};

/// Upper bound on cached per-bucket clients
const MAX_CACHED_STORES: usize = 64;

/// S3 storage backend.
///
/// One `object_store` client is built per bucket on first use and reused
/// afterwards. At most [`MAX_CACHED_STORES`] clients are kept; a full cache
/// drops one entry before inserting.
pub struct S3Backend {
    settings: S3Settings,
    buckets: S3BucketClient,
    stores: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl S3Backend {
    pub fn new(settings: S3Settings) -> ClientResult<Self> {
        let buckets = S3BucketClient::new(&settings)?;
        Ok(Self {
            settings,
            buckets,
            stores: RwLock::new(HashMap::new()),
        })
    }

    async fn store(&self, bucket: &BucketName) -> ClientResult<Arc<AmazonS3>> {
        if let Some(store) = self.stores.read().await.get(bucket.as_str()) {
            return Ok(store.clone());
        }

        let mut stores = self.stores.write().await;
        if let Some(store) = stores.get(bucket.as_str()) {
            return Ok(store.clone());
        }
        let store = Arc::new(create_s3_store(&self.settings, bucket)?);
        if stores.len() >= MAX_CACHED_STORES {
            if let Some(evicted) = stores.keys().next().cloned() {
                stores.remove(&evicted);
            }
        }
        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }

    async fn bucket_store(&self, bucket: &BucketName) -> ClientResult<BucketStore> {
        let store = self.store(bucket).await?;
        Ok(BucketStore::new(bucket.clone(), store))
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn create_bucket(&self, bucket: &BucketName) -> ClientResult<BucketRef> {
        self.buckets.create_bucket(bucket).await?;
        Ok(BucketRef::new(bucket.clone()))
    }

    async fn list_buckets(&self) -> ClientResult<Vec<BucketRef>> {
        self.buckets.list_buckets().await
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> ClientResult<()> {
        self.buckets.delete_bucket(bucket).await?;
        self.stores.write().await.remove(bucket.as_str());
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> ClientResult<ListingPage> {
        self.bucket_store(bucket).await?.list(prefix).await
    }

    async fn get_object(&self, bucket: &BucketName, key: &ObjectKey) -> ClientResult<ObjectContent> {
        self.bucket_store(bucket).await?.get(key).await
    }

    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        self.bucket_store(bucket)
            .await?
            .put(key, data, content_type)
            .await
    }

    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey) -> ClientResult<()> {
        self.bucket_store(bucket).await?.delete(key).await
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
    ) -> ClientResult<BulkDeleteResult> {
        self.bucket_store(bucket).await?.delete_many(keys).await
    }

    async fn presign(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        method: SignedUrlMethod,
        expires_in: Duration,
    ) -> ClientResult<String> {
        let store = self.store(bucket).await?;
        let method = match method {
            SignedUrlMethod::Put => http::Method::PUT,
            SignedUrlMethod::Get => http::Method::GET,
        };
        let path = BucketStore::to_object_path(key)?;
        let url = store.signed_url(method, &path, expires_in).await?;
        Ok(url.to_string())
    }
}
