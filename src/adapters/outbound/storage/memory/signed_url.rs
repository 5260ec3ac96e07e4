use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;

use crate::{
    domain::{
        models::SignedUrlMethod,
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{ClientError, ClientResult},
};

type HmacSha256 = Hmac<Sha256>;

pub(crate) const SCHEME: &str = "memory";
const PARAM_METHOD: &str = "X-Method";
const PARAM_EXPIRES: &str = "X-Expires";
const PARAM_SIGNATURE: &str = "X-Signature";

/// A decoded `memory://` URL whose signature has been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VerifiedUrl {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub method: SignedUrlMethod,
}

fn rejected(reason: impl Into<String>) -> ClientError {
    ClientError::SignatureRejected {
        reason: reason.into(),
    }
}

fn mac(secret: &[u8]) -> ClientResult<HmacSha256> {
    HmacSha256::new_from_slice(secret)
        .map_err(|e| ClientError::other(format!("HMAC key error: {}", e)))
}

fn string_to_sign(method: SignedUrlMethod, bucket: &str, key: &str, expires: i64) -> String {
    format!("{}\n{}\n{}\n{}", method, bucket, key, expires)
}

/// Build a signed URL valid until `expires`
pub(crate) fn sign(
    secret: &[u8],
    bucket: &BucketName,
    key: &ObjectKey,
    method: SignedUrlMethod,
    expires: DateTime<Utc>,
) -> ClientResult<String> {
    let expires = expires.timestamp();

    let mut mac = mac(secret)?;
    mac.update(string_to_sign(method, bucket.as_str(), key.as_str(), expires).as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let mut url = Url::parse(&format!("{}://{}", SCHEME, bucket))
        .map_err(|e| ClientError::other(format!("Failed to build signed URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::other("Signed URL cannot carry a path"))?
        .extend(key.as_str().split('/'));
    url.query_pairs_mut()
        .append_pair(PARAM_METHOD, method.as_str())
        .append_pair(PARAM_EXPIRES, &expires.to_string())
        .append_pair(PARAM_SIGNATURE, &signature);

    Ok(url.to_string())
}

/// Check the signature and expiry of `url` as of `at`
pub(crate) fn verify(secret: &[u8], url: &str, at: DateTime<Utc>) -> ClientResult<VerifiedUrl> {
    let url = Url::parse(url).map_err(|e| rejected(format!("malformed URL: {}", e)))?;
    if url.scheme() != SCHEME {
        return Err(rejected(format!("unsupported scheme '{}'", url.scheme())));
    }

    let bucket = url
        .host_str()
        .ok_or_else(|| rejected("missing bucket"))
        .and_then(|b| BucketName::new(b).map_err(|e| rejected(e.to_string())))?;

    let segments = url
        .path_segments()
        .ok_or_else(|| rejected("missing key"))?
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .map_err(|e| rejected(format!("malformed key: {}", e)))
        })
        .collect::<ClientResult<Vec<_>>>()?;
    let key = ObjectKey::new(segments.join("/")).map_err(|e| rejected(e.to_string()))?;

    let (mut method, mut expires, mut signature) = (None, None, None);
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            PARAM_METHOD => method = Some(value.into_owned()),
            PARAM_EXPIRES => expires = Some(value.into_owned()),
            PARAM_SIGNATURE => signature = Some(value.into_owned()),
            _ => {}
        }
    }

    let method: SignedUrlMethod = method
        .ok_or_else(|| rejected("missing method"))?
        .parse()
        .map_err(|e| rejected(e))?;
    let expires: i64 = expires
        .ok_or_else(|| rejected("missing expiry"))?
        .parse()
        .map_err(|_| rejected("malformed expiry"))?;
    let signature = signature
        .ok_or_else(|| rejected("missing signature"))
        .and_then(|s| hex::decode(s).map_err(|_| rejected("malformed signature")))?;

    let mut mac = mac(secret)?;
    mac.update(string_to_sign(method, bucket.as_str(), key.as_str(), expires).as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| rejected("signature mismatch"))?;

    if at.timestamp() >= expires {
        return Err(rejected("URL has expired"));
    }

    Ok(VerifiedUrl {
        bucket,
        key,
        method,
    })
}
