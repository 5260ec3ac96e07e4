use std::sync::Arc;
use tracing::info;

use crate::{
    adapters::outbound::storage::{InMemoryBackend, S3Backend, S3Settings},
    ports::{services::StorageGateway, storage::StorageBackend},
    provider::{BackendConfig, ClientProvider, ConfigError, ENV_BUCKET},
    services::StorageGatewayImpl,
};

pub const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";

/// Which storage backend the gateway talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Process-local store, for development and tests
    #[default]
    InMemory,
    /// Amazon S3 or an S3-compatible server
    S3,
}

impl std::str::FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(BackendKind::InMemory),
            "s3" | "minio" => Ok(BackendKind::S3),
            other => Err(AppError::Configuration {
                message: format!("unknown storage backend '{}'", other),
            }),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::InMemory => write!(f, "memory"),
            BackendKind::S3 => write!(f, "s3"),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_kind: BackendKind,
    pub backend: BackendConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_kind: BackendKind::InMemory,
            backend: BackendConfig::in_memory("uploads"),
        }
    }
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub provider: Arc<ClientProvider>,
    pub gateway: Arc<dyn StorageGateway>,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    client: Option<Arc<dyn StorageBackend>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            client: None,
        }
    }

    pub fn with_config(mut self, config: BackendConfig) -> Self {
        self.config.backend = config;
        self
    }

    pub fn with_backend_kind(mut self, kind: BackendKind) -> Self {
        self.config.backend_kind = kind;
        self
    }

    /// Use an already constructed client instead of building one from the config
    pub fn with_client(mut self, client: Arc<dyn StorageBackend>) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the complete application with services
    pub fn build(self) -> Result<AppServices, AppError> {
        let client = match self.client {
            Some(client) => client,
            None => Self::create_client(&self.config)?,
        };

        let provider = Arc::new(ClientProvider::new(self.config.backend, client)?);
        let gateway: Arc<dyn StorageGateway> = Arc::new(StorageGatewayImpl::new(provider.clone()));

        info!(
            backend = %self.config.backend_kind,
            default_bucket = %provider.default_bucket(),
            "storage gateway ready"
        );

        Ok(AppServices { provider, gateway })
    }

    fn create_client(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, AppError> {
        match config.backend_kind {
            BackendKind::InMemory => Ok(Arc::new(InMemoryBackend::new())),
            BackendKind::S3 => {
                let backend = S3Backend::new(S3Settings::from(&config.backend)).map_err(|e| {
                    AppError::StorageInit {
                        message: e.to_string(),
                    }
                })?;
                Ok(Arc::new(backend))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Create an in-memory application for testing and development
pub fn create_in_memory_app(default_bucket: &str) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend_kind(BackendKind::InMemory)
        .with_config(BackendConfig::in_memory(default_bucket))
        .build()
}

/// Create an S3-backed application
pub fn create_s3_app(config: BackendConfig) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend_kind(BackendKind::S3)
        .with_config(config)
        .build()
}

/// Create application from environment variables.
///
/// `STORAGE_BACKEND` selects the backend (`s3` or `memory`, default `s3`).
/// The memory backend only reads `S3_BUCKET`.
pub fn create_app_from_env() -> Result<AppServices, AppError> {
    let kind = match std::env::var(ENV_STORAGE_BACKEND) {
        Ok(value) => value.parse()?,
        Err(_) => BackendKind::S3,
    };

    match kind {
        BackendKind::S3 => create_s3_app(BackendConfig::from_env()?),
        BackendKind::InMemory => {
            let bucket =
                std::env::var(ENV_BUCKET).map_err(|_| ConfigError::Missing(ENV_BUCKET))?;
            create_in_memory_app(&bucket)
        }
    }
}
