use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::memory::InMemory;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::signed_url::{self, VerifiedUrl};
use crate::{
    adapters::outbound::storage::bucket_store::BucketStore,
    domain::{
        models::{BucketRef, ListingPage, ObjectContent, SignedUrlMethod},
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{BulkDeleteResult, ClientError, ClientResult, StorageBackend},
};

struct MemoryBucket {
    store: BucketStore,
    created_at: DateTime<Utc>,
}

/// Process-local storage backend.
///
/// Each bucket is an `object_store` in-memory store. Signed URLs use the
/// `memory://` scheme and are redeemed through [`InMemoryBackend::redeem_get`]
/// and [`InMemoryBackend::redeem_put`].
pub struct InMemoryBackend {
    buckets: RwLock<BTreeMap<String, MemoryBucket>>,
    signing_key: Vec<u8>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let mut signing_key = Vec::with_capacity(32);
        signing_key.extend_from_slice(Uuid::new_v4().as_bytes());
        signing_key.extend_from_slice(Uuid::new_v4().as_bytes());

        Self {
            buckets: RwLock::new(BTreeMap::new()),
            signing_key,
        }
    }

    /// Look up a bucket in a held table guard. Object calls keep the read
    /// guard until they finish, so they never land in a deleted bucket.
    fn bucket_store<'a>(
        buckets: &'a BTreeMap<String, MemoryBucket>,
        bucket: &BucketName,
    ) -> ClientResult<&'a BucketStore> {
        buckets
            .get(bucket.as_str())
            .map(|b| &b.store)
            .ok_or_else(|| ClientError::NoSuchBucket {
                bucket: bucket.to_string(),
            })
    }

    fn verify(&self, url: &str, method: SignedUrlMethod, at: DateTime<Utc>) -> ClientResult<VerifiedUrl> {
        let verified = signed_url::verify(&self.signing_key, url, at)?;
        if verified.method != method {
            return Err(ClientError::SignatureRejected {
                reason: format!("URL authorizes {}, not {}", verified.method, method),
            });
        }
        Ok(verified)
    }

    /// Fetch the object a download URL points at
    pub async fn redeem_get(&self, url: &str) -> ClientResult<ObjectContent> {
        self.redeem_get_at(url, Utc::now()).await
    }

    /// Like [`redeem_get`](Self::redeem_get), evaluated as of `at`
    pub async fn redeem_get_at(&self, url: &str, at: DateTime<Utc>) -> ClientResult<ObjectContent> {
        let verified = self.verify(url, SignedUrlMethod::Get, at)?;
        self.get_object(&verified.bucket, &verified.key).await
    }

    /// Store `data` at the key an upload URL points at
    pub async fn redeem_put(&self, url: &str, data: impl Into<Bytes>) -> ClientResult<()> {
        self.redeem_put_at(url, data, Utc::now()).await
    }

    /// Like [`redeem_put`](Self::redeem_put), evaluated as of `at`
    pub async fn redeem_put_at(
        &self,
        url: &str,
        data: impl Into<Bytes>,
        at: DateTime<Utc>,
    ) -> ClientResult<()> {
        let verified = self.verify(url, SignedUrlMethod::Put, at)?;
        self.put_object(&verified.bucket, &verified.key, data.into(), None)
            .await
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn create_bucket(&self, bucket: &BucketName) -> ClientResult<BucketRef> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket.as_str()) {
            return Err(ClientError::BucketAlreadyExists {
                bucket: bucket.to_string(),
            });
        }

        let created_at = Utc::now();
        buckets.insert(
            bucket.to_string(),
            MemoryBucket {
                store: BucketStore::new(bucket.clone(), Arc::new(InMemory::new())),
                created_at,
            },
        );
        debug!(bucket = %bucket, "created in-memory bucket");

        Ok(BucketRef {
            name: bucket.clone(),
            created_at: Some(created_at),
        })
    }

    async fn list_buckets(&self) -> ClientResult<Vec<BucketRef>> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .values()
            .map(|b| BucketRef {
                name: b.store.bucket().clone(),
                created_at: Some(b.created_at),
            })
            .collect())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> ClientResult<()> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get(bucket.as_str())
            .ok_or_else(|| ClientError::NoSuchBucket {
                bucket: bucket.to_string(),
            })?;

        if entry.store.has_objects().await? {
            return Err(ClientError::BucketNotEmpty {
                bucket: bucket.to_string(),
            });
        }

        buckets.remove(bucket.as_str());
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> ClientResult<ListingPage> {
        let buckets = self.buckets.read().await;
        Self::bucket_store(&buckets, bucket)?.list(prefix).await
    }

    async fn get_object(&self, bucket: &BucketName, key: &ObjectKey) -> ClientResult<ObjectContent> {
        let buckets = self.buckets.read().await;
        Self::bucket_store(&buckets, bucket)?.get(key).await
    }

    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        let buckets = self.buckets.read().await;
        Self::bucket_store(&buckets, bucket)?
            .put(key, data, content_type)
            .await
    }

    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey) -> ClientResult<()> {
        let buckets = self.buckets.read().await;
        Self::bucket_store(&buckets, bucket)?.delete(key).await
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
    ) -> ClientResult<BulkDeleteResult> {
        let buckets = self.buckets.read().await;
        Self::bucket_store(&buckets, bucket)?.delete_many(keys).await
    }

    async fn presign(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        method: SignedUrlMethod,
        expires_in: Duration,
    ) -> ClientResult<String> {
        let expires_at = chrono::Duration::from_std(expires_in)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| ClientError::InvalidRequest {
                message: format!("expiry of {}s is out of range", expires_in.as_secs()),
            })?;
        signed_url::sign(&self.signing_key, bucket, key, method, expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> BucketName {
        BucketName::new(s).unwrap()
    }

    fn key(s: &str) -> ObjectKey {
        ObjectKey::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_bucket_lifecycle() {
        let backend = InMemoryBackend::new();
        backend.create_bucket(&name("b1b")).await.unwrap();

        let err = backend.create_bucket(&name("b1b")).await.unwrap_err();
        assert!(matches!(err, ClientError::BucketAlreadyExists { .. }));

        backend
            .put_object(&name("b1b"), &key("a.txt"), Bytes::from("a"), None)
            .await
            .unwrap();
        let err = backend.delete_bucket(&name("b1b")).await.unwrap_err();
        assert!(matches!(err, ClientError::BucketNotEmpty { .. }));

        backend.delete_object(&name("b1b"), &key("a.txt")).await.unwrap();
        backend.delete_bucket(&name("b1b")).await.unwrap();
        assert!(backend.list_buckets().await.unwrap().is_empty());

        let err = backend.delete_bucket(&name("b1b")).await.unwrap_err();
        assert!(matches!(err, ClientError::NoSuchBucket { .. }));
    }

    #[tokio::test]
    async fn test_object_calls_need_a_bucket() {
        let backend = InMemoryBackend::new();
        let err = backend
            .put_object(&name("ghost"), &key("a.txt"), Bytes::from("a"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoSuchBucket { .. }));
    }

    #[tokio::test]
    async fn test_upload_url_then_download_url() {
        let backend = InMemoryBackend::new();
        backend.create_bucket(&name("b1b")).await.unwrap();

        let ttl = Duration::from_secs(60);
        let put_url = backend
            .presign(&name("b1b"), &key("docs/a.txt"), SignedUrlMethod::Put, ttl)
            .await
            .unwrap();
        backend.redeem_put(&put_url, "payload").await.unwrap();

        let get_url = backend
            .presign(&name("b1b"), &key("docs/a.txt"), SignedUrlMethod::Get, ttl)
            .await
            .unwrap();
        let content = backend.redeem_get(&get_url).await.unwrap();
        assert_eq!(content.data, Bytes::from("payload"));

        // An upload URL does not authorize reads
        let err = backend.redeem_get(&put_url).await.unwrap_err();
        assert!(matches!(err, ClientError::SignatureRejected { .. }));
    }

    #[tokio::test]
    async fn test_urls_from_another_backend_are_rejected() {
        let issuer = InMemoryBackend::new();
        let other = InMemoryBackend::new();
        issuer.create_bucket(&name("b1b")).await.unwrap();
        other.create_bucket(&name("b1b")).await.unwrap();

        let url = issuer
            .presign(
                &name("b1b"),
                &key("a.txt"),
                SignedUrlMethod::Put,
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        assert!(other.redeem_put(&url, "x").await.is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_rejected() {
        let backend = InMemoryBackend::new();
        backend.create_bucket(&name("b1b")).await.unwrap();

        let err = backend
            .presign(
                &name("b1b"),
                &key("a.txt"),
                SignedUrlMethod::Get,
                Duration::from_secs(10_000_000_000_000),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_put_racing_bucket_delete_is_never_lost() {
        for _ in 0..20 {
            let backend = Arc::new(InMemoryBackend::new());
            backend.create_bucket(&name("b1b")).await.unwrap();

            let puts: Vec<_> = (0..8)
                .map(|i| {
                    let backend = backend.clone();
                    tokio::spawn(async move {
                        let k = key(&format!("docs/{}.txt", i));
                        let stored = backend
                            .put_object(&name("b1b"), &k, Bytes::from("x"), None)
                            .await;
                        (k, stored.is_ok())
                    })
                })
                .collect();
            let delete = {
                let backend = backend.clone();
                tokio::spawn(async move { backend.delete_bucket(&name("b1b")).await.is_ok() })
            };

            let deleted = delete.await.unwrap();
            let mut stored_keys = Vec::new();
            for put in puts {
                let (k, ok) = put.await.unwrap();
                if ok {
                    stored_keys.push(k);
                }
            }

            if deleted {
                assert!(stored_keys.is_empty());
            }
            for k in &stored_keys {
                backend.get_object(&name("b1b"), k).await.unwrap();
            }
        }
    }
}
