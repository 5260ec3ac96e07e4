//! S3 storage backend.
//!
//! Object calls and signed URLs go through the `object_store` crate. Bucket
//! calls, which `object_store` does not offer, go through `rust-s3`.

mod bucket_client;
mod s3_backend;

pub use bucket_client::S3BucketClient;
pub use s3_backend::S3Backend;

use object_store::aws::{AmazonS3, AmazonS3Builder};

use crate::{
    domain::value_objects::BucketName, ports::storage::ClientResult, provider::BackendConfig,
};

/// Connection settings for the S3 backend
#[derive(Clone)]
pub struct S3Settings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>,
    pub allow_http: bool,
}

impl From<&BackendConfig> for S3Settings {
    fn from(config: &BackendConfig) -> Self {
        Self {
            region: config.region.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            endpoint: config.endpoint.clone(),
            allow_http: config.allow_http,
        }
    }
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .finish_non_exhaustive()
    }
}

/// Create an S3 store scoped to one bucket
pub fn create_s3_store(settings: &S3Settings, bucket: &BucketName) -> ClientResult<AmazonS3> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(bucket.as_str())
        .with_region(&settings.region)
        .with_access_key_id(&settings.access_key_id)
        .with_secret_access_key(&settings.secret_access_key)
        .with_allow_http(settings.allow_http);

    if let Some(endpoint) = &settings.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    Ok(builder.build()?)
}
