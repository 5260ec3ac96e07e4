use chrono::{DateTime, Utc};
use s3::{
    bucket_ops::ListBucketsResponse, creds::Credentials, Bucket, BucketConfiguration, Region,
};
use tracing::debug;

use super::S3Settings;
use crate::{
    adapters::outbound::storage::error::{from_s3_error, from_s3_response},
    domain::{models::BucketRef, value_objects::BucketName},
    ports::storage::{ClientError, ClientResult},
};

/// Client for the bucket-level S3 API (create, list, delete).
///
/// Requests use path-style addressing (`{endpoint}/{bucket}`) so the same
/// client works against AWS and S3-compatible servers such as MinIO.
#[derive(Clone, Debug)]
pub struct S3BucketClient {
    region: Region,
    credentials: Credentials,
}

impl S3BucketClient {
    pub fn new(settings: &S3Settings) -> ClientResult<Self> {
        let region = match &settings.endpoint {
            Some(endpoint) => {
                if endpoint.starts_with("http://") && !settings.allow_http {
                    return Err(ClientError::InvalidRequest {
                        message: "HTTP endpoint requires allow_http".to_string(),
                    });
                }
                Region::Custom {
                    region: settings.region.clone(),
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                }
            }
            None => settings
                .region
                .parse()
                .map_err(|e| ClientError::InvalidRequest {
                    message: format!("Invalid region '{}': {}", settings.region, e),
                })?,
        };

        let credentials = Credentials::new(
            Some(&settings.access_key_id),
            Some(&settings.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| ClientError::Other {
            message: format!("Failed to create S3 credentials: {}", e),
            source: Some(Box::new(e)),
        })?;

        // Failures surface on the first attempt.
        s3::set_retries(0);

        Ok(Self {
            region,
            credentials,
        })
    }

    fn bucket(&self, bucket: &BucketName) -> ClientResult<Box<Bucket>> {
        let mut handle = Bucket::new(bucket.as_str(), self.region.clone(), self.credentials.clone())
            .map_err(|e| from_s3_error(e, Some(bucket.as_str())))?;
        handle.set_path_style();
        Ok(handle)
    }

    pub async fn create_bucket(&self, bucket: &BucketName) -> ClientResult<()> {
        debug!(bucket = %bucket, region = %self.region, "creating bucket");

        // The location constraint is left out for us-east-1.
        let response = Bucket::create_with_path_style(
            bucket.as_str(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| from_s3_error(e, Some(bucket.as_str())))?;

        if !response.success() {
            return Err(from_s3_response(
                response.response_code,
                &response.response_text,
                Some(bucket.as_str()),
            ));
        }
        Ok(())
    }

    pub async fn delete_bucket(&self, bucket: &BucketName) -> ClientResult<()> {
        debug!(bucket = %bucket, "deleting bucket");

        let status = self
            .bucket(bucket)?
            .delete()
            .await
            .map_err(|e| from_s3_error(e, Some(bucket.as_str())))?;

        if !(200..300).contains(&status) {
            return Err(from_s3_response(status, "", Some(bucket.as_str())));
        }
        Ok(())
    }

    pub async fn list_buckets(&self) -> ClientResult<Vec<BucketRef>> {
        let response = Bucket::list_buckets(self.region.clone(), self.credentials.clone())
            .await
            .map_err(|e| from_s3_error(e, None))?;
        Ok(bucket_refs(response))
    }
}

/// Convert a bucket listing, skipping names `BucketName` does not accept
pub(crate) fn bucket_refs(response: ListBucketsResponse) -> Vec<BucketRef> {
    response
        .buckets
        .bucket
        .into_iter()
        .filter_map(|entry| match BucketName::new(entry.name.as_str()) {
            Ok(name) => Some(BucketRef {
                name,
                created_at: DateTime::parse_from_rfc3339(&entry.creation_date)
                    .ok()
                    .map(|d| d.with_timezone(&Utc)),
            }),
            Err(e) => {
                debug!(bucket = %entry.name, error = %e, "skipping bucket with unsupported name");
                None
            }
        })
        .collect()
}
