use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use object_store::{
    path::Path as ObjectPath, Attribute, AttributeValue, Attributes, ObjectMeta, ObjectStore,
    PutOptions, PutPayload,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    domain::{
        models::{DeleteFailure, ListingPage, ObjectContent, ObjectSummary},
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{BulkDeleteResult, ClientError, ClientResult, LISTING_PAGE_LIMIT},
};

/// Object operations on one bucket, backed by any `object_store` implementation
#[derive(Clone)]
pub struct BucketStore {
    bucket: BucketName,
    inner: Arc<dyn ObjectStore>,
}

impl BucketStore {
    pub fn new(bucket: BucketName, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket,
            inner: store,
        }
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    pub fn inner(&self) -> &Arc<dyn ObjectStore> {
        &self.inner
    }

    /// The store path for a key, kept verbatim. `ObjectPath::from` would
    /// percent-encode characters such as `#` and `%`.
    pub(crate) fn to_object_path(key: &ObjectKey) -> ClientResult<ObjectPath> {
        ObjectPath::parse(key.as_str()).map_err(|e| ClientError::InvalidRequest {
            message: format!("unusable object key {}: {}", key, e),
        })
    }

    fn to_summary(&self, meta: ObjectMeta) -> Option<ObjectSummary> {
        match ObjectKey::new(meta.location.to_string()) {
            Ok(key) => Some(ObjectSummary {
                bucket: self.bucket.clone(),
                key,
                size: meta.size,
                last_modified: meta.last_modified,
                etag: meta.e_tag,
            }),
            Err(e) => {
                debug!(location = %meta.location, error = %e, "skipping unaddressable key");
                None
            }
        }
    }

    fn bucket_missing(&self, err: object_store::Error) -> ClientError {
        match err {
            object_store::Error::NotFound { .. } => ClientError::NoSuchBucket {
                bucket: self.bucket.to_string(),
            },
            other => other.into(),
        }
    }

    /// List the first page of keys starting with `prefix`.
    ///
    /// `object_store` lists whole path segments, so the listing starts at the
    /// last complete segment of the prefix and the rest is matched here.
    pub async fn list(&self, prefix: Option<&str>) -> ClientResult<ListingPage> {
        let raw_prefix = prefix.unwrap_or("");
        // A parent that is not a clean path falls back to a full listing.
        let segment = raw_prefix
            .rsplit_once('/')
            .and_then(|(parent, _)| ObjectPath::parse(parent).ok());

        let mut listing = self.inner.list(segment.as_ref());
        let mut items = Vec::new();
        let mut is_truncated = false;

        while let Some(meta) = listing
            .try_next()
            .await
            .map_err(|e| self.bucket_missing(e))?
        {
            if !meta.location.as_ref().starts_with(raw_prefix) {
                continue;
            }
            if items.len() >= LISTING_PAGE_LIMIT {
                is_truncated = true;
                break;
            }
            if let Some(summary) = self.to_summary(meta) {
                items.push(summary);
            }
        }

        items.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));

        Ok(ListingPage {
            bucket: self.bucket.clone(),
            prefix: prefix.map(str::to_string),
            items,
            is_truncated,
        })
    }

    pub async fn get(&self, key: &ObjectKey) -> ClientResult<ObjectContent> {
        let path = Self::to_object_path(key)?;
        let result = self.inner.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => ClientError::NoSuchKey {
                key: key.to_string(),
            },
            other => other.into(),
        })?;

        let meta = result.meta.clone();
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| AsRef::<str>::as_ref(v).to_owned());
        let data = result.bytes().await?;

        Ok(ObjectContent {
            bucket: self.bucket.clone(),
            key: key.clone(),
            size: meta.size,
            data,
            content_type,
            etag: meta.e_tag,
            last_modified: meta.last_modified,
        })
    }

    pub async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        let path = Self::to_object_path(key)?;

        let mut attributes = Attributes::new();
        if let Some(ct) = content_type {
            attributes.insert(Attribute::ContentType, AttributeValue::from(ct.to_string()));
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&path, PutPayload::from(data), options)
            .await?;
        Ok(())
    }

    /// Delete one key. A missing key is not an error.
    pub async fn delete(&self, key: &ObjectKey) -> ClientResult<()> {
        let path = Self::to_object_path(key)?;
        match self.inner.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete several keys, reporting the outcome per key.
    ///
    /// A store answers a whole failed batch request with a single error. When
    /// the outcomes do not line up one per key, that error is returned instead
    /// of a report.
    pub async fn delete_many(&self, keys: &[ObjectKey]) -> ClientResult<BulkDeleteResult> {
        let paths = keys
            .iter()
            .map(Self::to_object_path)
            .collect::<ClientResult<Vec<_>>>()?;
        let locations = stream::iter(paths.into_iter().map(Ok::<_, object_store::Error>)).boxed();

        // Results come back in request order.
        let outcomes: Vec<object_store::Result<ObjectPath>> =
            self.inner.delete_stream(locations).collect().await;

        let returned = outcomes.len();
        if returned != keys.len() {
            warn!(
                requested = keys.len(),
                returned,
                "bulk delete did not report every key"
            );
            return Err(match outcomes.into_iter().find_map(Result::err) {
                Some(e) => e.into(),
                None => ClientError::other(format!(
                    "bulk delete reported {} outcomes for {} keys",
                    returned,
                    keys.len()
                )),
            });
        }

        let mut result = BulkDeleteResult::default();
        for (key, outcome) in keys.iter().zip(outcomes) {
            match outcome {
                Ok(_) | Err(object_store::Error::NotFound { .. }) => {
                    result.deleted.push(key.clone())
                }
                Err(e) => result.failed.push(DeleteFailure {
                    key: key.clone(),
                    message: e.to_string(),
                }),
            }
        }
        Ok(result)
    }

    /// True if the bucket holds at least one object
    pub async fn has_objects(&self) -> ClientResult<bool> {
        let mut listing = self.inner.list(None);
        Ok(listing.try_next().await?.is_some())
    }
}
