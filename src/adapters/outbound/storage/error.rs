use quick_xml::de::from_str;
use s3::error::S3Error;
use serde::Deserialize;

use crate::ports::storage::ClientError;

/// Convert object_store errors to client errors
impl From<object_store::Error> for ClientError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => ClientError::NoSuchKey { key: path },
            object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
                ClientError::InvalidRequest {
                    message: err.to_string(),
                }
            }
            _ => ClientError::Other {
                message: format!("Object store operation failed: {}", err),
                source: Some(Box::new(err)),
            },
        }
    }
}

/// Body of an S3 error response
#[derive(Debug, Deserialize)]
struct S3ErrorBody {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// Map a non-success S3 response to a client error.
///
/// `bucket` names the bucket the request targeted, if any.
pub(crate) fn from_s3_response(status: u16, body: &str, bucket: Option<&str>) -> ClientError {
    let bucket = bucket.unwrap_or_default().to_string();

    let parsed = match from_str::<S3ErrorBody>(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return match status {
                404 if !bucket.is_empty() => ClientError::NoSuchBucket { bucket },
                _ => ClientError::Service {
                    status,
                    code: http::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("Unknown")
                        .to_string(),
                    message: body.trim().to_string(),
                },
            };
        }
    };

    match parsed.code.as_str() {
        "NoSuchBucket" => ClientError::NoSuchBucket { bucket },
        "BucketAlreadyExists" | "BucketAlreadyOwnedByYou" => {
            ClientError::BucketAlreadyExists { bucket }
        }
        "BucketNotEmpty" => ClientError::BucketNotEmpty { bucket },
        "InvalidBucketName" => ClientError::InvalidRequest {
            message: parsed.message,
        },
        _ => ClientError::Service {
            status,
            code: parsed.code,
            message: parsed.message,
        },
    }
}

/// Map a `rust-s3` failure to a client error.
///
/// Non-2xx responses arrive as `HttpFailWithBody` and go through
/// [`from_s3_response`]. Everything else is a transport or signing failure.
pub(crate) fn from_s3_error(err: S3Error, bucket: Option<&str>) -> ClientError {
    match err {
        S3Error::HttpFailWithBody(status, body) => from_s3_response(status, &body, bucket),
        other => ClientError::Other {
            message: format!("S3 request failed: {}", other),
            source: Some(Box::new(other)),
        },
    }
}
