use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use storage_gateway::{
    adapters::inbound::http::dto::{
        BucketDto, BulkDeleteResponseDto, ListObjectsResponseDto, SignedUrlDto, StoredObjectDto,
    },
    app::create_app_from_env,
    StorageGateway, UploadPayload,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "storage-gateway-cli")]
#[command(about = "Run storage gateway operations from the command line", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage buckets
    Bucket {
        #[command(subcommand)]
        command: BucketCommands,
    },

    /// Upload a file under a key prefix
    Put {
        /// Key prefix; the object lands at `{prefix}/{file name}`
        path: String,
        /// File path to upload
        file: PathBuf,
        /// Bucket name
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Download an object
    Get {
        /// Object key
        key: String,
        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Bucket name
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// List objects
    List {
        /// Prefix to filter objects
        #[arg(short, long)]
        prefix: Option<String>,
        /// Bucket name
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Delete an object
    Delete {
        /// Object key
        key: String,
        /// Bucket name
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Delete every listed object under a prefix
    DeleteAll {
        /// Prefix to filter objects
        #[arg(short, long)]
        prefix: Option<String>,
        /// Bucket name
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Issue a time-limited URL
    Sign {
        #[command(subcommand)]
        command: SignCommands,
    },
}

#[derive(Subcommand, Debug)]
enum BucketCommands {
    /// Create a bucket
    Create { name: String },
    /// List all buckets
    List,
    /// Delete an empty bucket
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum SignCommands {
    /// URL for uploading a single object
    Upload {
        key: String,
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// URL for downloading a single object
    Download {
        key: String,
        #[arg(short, long)]
        bucket: Option<String>,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(level.to_lowercase())
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("Failed to build log filter")?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(gateway: &dyn StorageGateway, command: Commands) -> Result<()> {
    let default_bucket = gateway.default_bucket().as_str().to_string();
    let pick = |bucket: Option<String>| bucket.unwrap_or_else(|| default_bucket.clone());

    match command {
        Commands::Bucket { command } => match command {
            BucketCommands::Create { name } => {
                let bucket = gateway.create_bucket(&name).await?;
                print_json(&BucketDto::from(bucket))?;
            }
            BucketCommands::List => {
                let buckets: Vec<BucketDto> = gateway
                    .list_buckets()
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                print_json(&buckets)?;
            }
            BucketCommands::Delete { name } => {
                gateway.delete_bucket(&name).await?;
                eprintln!("Deleted bucket {}", name);
            }
        },
        Commands::Put { path, file, bucket } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .with_context(|| format!("{} has no usable file name", file.display()))?;
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let stored = gateway
                .put_object(&pick(bucket), &path, UploadPayload::new(file_name, content))
                .await?;
            print_json(&StoredObjectDto::from(stored))?;
        }
        Commands::Get {
            key,
            output,
            bucket,
        } => {
            let content = gateway.get_object(&pick(bucket), &key).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &content.data)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Wrote {} bytes to {}", content.size, path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&content.data)?;
                }
            }
        }
        Commands::List { prefix, bucket } => {
            let page = gateway
                .list_objects(&pick(bucket), prefix.as_deref())
                .await?;
            print_json(&ListObjectsResponseDto::from(page))?;
        }
        Commands::Delete { key, bucket } => {
            gateway.delete_object(&pick(bucket), &key).await?;
            eprintln!("Deleted {}", key);
        }
        Commands::DeleteAll { prefix, bucket } => {
            let report = gateway
                .delete_all_objects(&pick(bucket), prefix.as_deref())
                .await?;
            print_json(&BulkDeleteResponseDto::from(report))?;
        }
        Commands::Sign { command } => {
            let grant = match command {
                SignCommands::Upload { key, bucket } => {
                    gateway.issue_upload_url(&pick(bucket), &key).await?
                }
                SignCommands::Download { key, bucket } => {
                    gateway.issue_download_url(&pick(bucket), &key).await?
                }
            };
            print_json(&SignedUrlDto::from(grant))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let app = create_app_from_env().context("Failed to build application")?;
    run(app.gateway.as_ref(), cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_gateway::create_in_memory_app;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["storage-gateway-cli", "put", "docs", "a.txt", "-b", "b1b"]);
        match cli.command {
            Commands::Put { path, file, bucket } => {
                assert_eq!(path, "docs");
                assert_eq!(file, PathBuf::from("a.txt"));
                assert_eq!(bucket.as_deref(), Some("b1b"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["storage-gateway-cli", "sign", "download", "docs/a.txt"]);
        assert!(matches!(
            cli.command,
            Commands::Sign {
                command: SignCommands::Download { bucket: None, .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_commands_use_default_bucket() {
        let app = create_in_memory_app("uploads").unwrap();
        let gateway = app.gateway.as_ref();

        run(
            gateway,
            Commands::Bucket {
                command: BucketCommands::Create {
                    name: "uploads".to_string(),
                },
            },
        )
        .await
        .unwrap();

        let dir = std::env::temp_dir().join(format!("gateway-cli-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let file = dir.join("a.txt");
        tokio::fs::write(&file, b"hello").await.unwrap();

        run(
            gateway,
            Commands::Put {
                path: "docs".to_string(),
                file,
                bucket: None,
            },
        )
        .await
        .unwrap();

        let content = gateway.get_object("uploads", "docs/a.txt").await.unwrap();
        assert_eq!(&content.data[..], b"hello");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
