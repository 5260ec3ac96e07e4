use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, time::Duration};
use storage_gateway::{
    adapters::inbound::http::router::{create_router, AppState},
    app::{AppBuilder, BackendKind},
    provider::BackendConfig,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "storage-gateway-server")]
#[command(about = "HTTP front end for the object storage gateway", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Storage backend type (s3 or memory)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "s3")]
    storage_backend: String,

    /// S3 endpoint URL, for MinIO and other S3-compatible servers
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Default bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION")]
    s3_region: Option<String>,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    s3_secret_key: Option<String>,

    /// Allow a plain http:// endpoint
    #[arg(long, env = "S3_ALLOW_HTTP", default_value = "false")]
    s3_allow_http: bool,

    /// Validity of issued signed URLs, in seconds
    #[arg(long, env = "SIGNED_URL_TTL_SECS", default_value = "3600")]
    signed_url_ttl_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<(BackendKind, BackendConfig)> {
        let kind: BackendKind = self.storage_backend.parse()?;

        let bucket = self
            .s3_bucket
            .clone()
            .context("S3_BUCKET is required")?;

        let config = match kind {
            BackendKind::InMemory => BackendConfig::in_memory(bucket),
            BackendKind::S3 => {
                let region = self
                    .s3_region
                    .clone()
                    .context("S3_REGION is required for the S3 backend")?;
                let access_key = self
                    .s3_access_key
                    .clone()
                    .context("S3_ACCESS_KEY is required for the S3 backend")?;
                let secret_key = self
                    .s3_secret_key
                    .clone()
                    .context("S3_SECRET_KEY is required for the S3 backend")?;

                let mut config = BackendConfig::new(region, access_key, secret_key, bucket)
                    .with_allow_http(self.s3_allow_http);
                if let Some(endpoint) = &self.s3_endpoint {
                    config = config.with_endpoint(endpoint.clone());
                }
                config
            }
        };

        Ok((
            kind,
            config.with_signed_url_ttl(Duration::from_secs(self.signed_url_ttl_secs)),
        ))
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(self.log_level.to_lowercase())
            .or_else(|_| EnvFilter::try_new("info"))
            .context("Failed to build log filter")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting storage gateway server");
    info!("Storage backend: {}", cli.storage_backend);

    let (kind, config) = cli.to_app_config()?;
    let app_services = AppBuilder::new()
        .with_backend_kind(kind)
        .with_config(config)
        .build()
        .context("Failed to build application")?;

    let router = create_router(AppState::new(app_services.gateway));

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}
