//! Process-wide backend configuration and the shared client handle.
//!
//! A [`ClientProvider`] is built once at startup and handed to the gateway.
//! It is read-only afterwards, so cloning the `Arc` around it is the only
//! sharing mechanism needed.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    domain::{
        errors::ValidationError, models::{DEFAULT_SIGNED_URL_TTL_SECS, MAX_SIGNED_URL_TTL_SECS}, value_objects::BucketName,
    },
    ports::storage::StorageBackend,
};

pub const ENV_REGION: &str = "S3_REGION";
pub const ENV_ACCESS_KEY: &str = "S3_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "S3_SECRET_KEY";
pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_ENDPOINT: &str = "S3_ENDPOINT";
pub const ENV_ALLOW_HTTP: &str = "S3_ALLOW_HTTP";
pub const ENV_SIGNED_URL_TTL: &str = "SIGNED_URL_TTL_SECS";

/// Errors raised while loading configuration. These are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable required")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid default bucket: {0}")]
    InvalidDefaultBucket(#[from] ValidationError),

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Backend connection settings
#[derive(Clone)]
pub struct BackendConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub default_bucket: String,
    /// Custom S3-compatible endpoint, e.g. a MinIO server
    pub endpoint: Option<String>,
    pub allow_http: bool,
    pub signed_url_ttl: Duration,
}

impl BackendConfig {
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        default_bucket: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            default_bucket: default_bucket.into(),
            endpoint: None,
            allow_http: false,
            signed_url_ttl: Duration::from_secs(DEFAULT_SIGNED_URL_TTL_SECS),
        }
    }

    /// Settings for the process-local backend, which needs no real credentials
    pub fn in_memory(default_bucket: impl Into<String>) -> Self {
        Self::new("local", "memory", "memory", default_bucket)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_allow_http(mut self, allow_http: bool) -> Self {
        self.allow_http = allow_http;
        self
    }

    pub fn with_signed_url_ttl(mut self, ttl: Duration) -> Self {
        self.signed_url_ttl = ttl;
        self
    }

    /// Read the S3 settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns `None` for unset variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value)
        };

        let mut config = Self::new(
            required(ENV_REGION)?,
            required(ENV_ACCESS_KEY)?,
            required(ENV_SECRET_KEY)?,
            required(ENV_BUCKET)?,
        );

        config.endpoint = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty());
        config.allow_http = lookup(ENV_ALLOW_HTTP)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Some(ttl) = lookup(ENV_SIGNED_URL_TTL) {
            let secs = ttl
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    var: ENV_SIGNED_URL_TTL,
                    reason: e.to_string(),
                })?;
            config.signed_url_ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every required field and return the parsed default bucket
    pub fn validate(&self) -> Result<BucketName, ConfigError> {
        let fields = [
            (ENV_REGION, &self.region),
            (ENV_ACCESS_KEY, &self.access_key_id),
            (ENV_SECRET_KEY, &self.secret_access_key),
            (ENV_BUCKET, &self.default_bucket),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }

        if self.signed_url_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: ENV_SIGNED_URL_TTL,
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.signed_url_ttl.as_secs() > MAX_SIGNED_URL_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                var: ENV_SIGNED_URL_TTL,
                reason: format!("must be at most {} seconds", MAX_SIGNED_URL_TTL_SECS),
            });
        }

        Ok(BucketName::new(self.default_bucket.clone())?)
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("default_bucket", &self.default_bucket)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .field("signed_url_ttl", &self.signed_url_ttl)
            .finish()
    }
}

/// Owner of the configuration and the one client handle every operation uses
pub struct ClientProvider {
    config: BackendConfig,
    default_bucket: BucketName,
    client: Arc<dyn StorageBackend>,
}

impl ClientProvider {
    pub fn new(config: BackendConfig, client: Arc<dyn StorageBackend>) -> Result<Self, ConfigError> {
        let default_bucket = config.validate()?;
        Ok(Self {
            config,
            default_bucket,
            client,
        })
    }

    /// The shared client handle; every call returns the same instance
    pub fn client(&self) -> &Arc<dyn StorageBackend> {
        &self.client
    }

    pub fn default_bucket(&self) -> &BucketName {
        &self.default_bucket
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn signed_url_ttl(&self) -> Duration {
        self.config.signed_url_ttl
    }
}

impl std::fmt::Debug for ClientProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
