//! Urticaria Gateway - upload service for urticaria data and medical records

use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use urticaria_cli::{config::split_list, run_server_with_shutdown, CorsConfig, GatewayConfig};
use urticaria_storage::{StorageConfig, DEFAULT_PRESIGN_TTL, DEFAULT_RECORD_BUCKET, DEFAULT_UPLOAD_BUCKET};

#[derive(Parser, Debug)]
#[command(name = "urticaria-gateway")]
#[command(about = "Upload gateway storing urticaria data and medical records in S3-compatible storage")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "URTICARIA_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "URTICARIA_PORT")]
    port: u16,

    /// Object store endpoint as seen from this service
    #[arg(long, default_value = "http://localhost:9000", env = "MINIO_INTERNAL_ENDPOINT")]
    internal_endpoint: String,

    /// Object store endpoint as seen by clients
    #[arg(long, default_value = "http://localhost:9000", env = "MINIO_PUBLIC_ENDPOINT")]
    public_endpoint: String,

    /// Access key id
    #[arg(long, default_value = "", env = "MINIO_ACCESS_NAME")]
    access_key: String,

    /// Secret access key
    #[arg(long, default_value = "", env = "MINIO_ACCESS_SECRET", hide_env_values = true)]
    secret_key: String,

    /// Signing region
    #[arg(long, default_value = "us-east-1", env = "MINIO_REGION")]
    region: String,

    /// Bucket for generic uploads
    #[arg(long, default_value = DEFAULT_UPLOAD_BUCKET, env = "UPLOAD_BUCKET_NAME")]
    upload_bucket: String,

    /// Bucket for medical record uploads
    #[arg(long, default_value = DEFAULT_RECORD_BUCKET, env = "MINIO_BUCKET_NAME")]
    record_bucket: String,

    /// Timeout for each storage call, in seconds
    #[arg(long, default_value = "30", env = "STORAGE_TIMEOUT_SECS")]
    storage_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "104857600", env = "URTICARIA_MAX_BODY_SIZE")]
    max_body_size: usize,

    /// Allowed CORS origins (comma separated)
    #[arg(long, default_value = "*", env = "CORS_ALLOWED_ORIGINS")]
    cors_allowed_origins: String,

    /// Allowed CORS methods (comma separated)
    #[arg(long, default_value = "GET,POST,PUT,DELETE,OPTIONS", env = "CORS_ALLOWED_METHODS")]
    cors_allowed_methods: String,

    /// Allowed CORS request headers (comma separated)
    #[arg(long, default_value = "*", env = "CORS_ALLOWED_HEADERS")]
    cors_allowed_headers: String,

    /// CORS exposed headers (comma separated)
    #[arg(
        long,
        default_value = "Access-Control-Allow-Origin,Access-Control-Allow-Methods,Access-Control-Allow-Headers",
        env = "CORS_EXPOSED_HEADERS"
    )]
    cors_exposed_headers: String,

    /// Allow credentials on cross-origin requests
    #[arg(long, default_value_t = true, env = "CORS_ALLOW_CREDENTIALS", action = clap::ArgAction::Set)]
    cors_allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[arg(long, default_value = "3600", env = "CORS_MAX_AGE")]
    cors_max_age: u64,

    /// Use in-memory storage (for testing, data will not persist)
    #[arg(long, env = "URTICARIA_MEMORY_STORE")]
    memory_store: bool,

    /// Enable debug logging
    #[arg(short, long, env = "URTICARIA_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "urticaria_cli={log_level},urticaria_storage={log_level},tower_http=debug"
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting upload gateway on {}:{}", args.host, args.port);
    tracing::info!("Object store: {} (public: {})", args.internal_endpoint, args.public_endpoint);

    if args.memory_store {
        tracing::warn!("⚠️  Using in-memory storage - data will NOT persist!");
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        storage: StorageConfig {
            internal_endpoint: args.internal_endpoint,
            public_endpoint: args.public_endpoint,
            access_key: args.access_key,
            secret_key: args.secret_key,
            region: args.region,
            upload_bucket: args.upload_bucket,
            record_bucket: args.record_bucket,
            presign_ttl: DEFAULT_PRESIGN_TTL,
            operation_timeout: Duration::from_secs(args.storage_timeout_secs),
        },
        use_memory_store: args.memory_store,
        max_body_size: args.max_body_size,
        cors: CorsConfig {
            allowed_origins: split_list(&args.cors_allowed_origins),
            allowed_methods: split_list(&args.cors_allowed_methods),
            allowed_headers: split_list(&args.cors_allowed_headers),
            exposed_headers: split_list(&args.cors_exposed_headers),
            allow_credentials: args.cors_allow_credentials,
            max_age: Duration::from_secs(args.cors_max_age),
        },
    };

    run_server_with_shutdown(config, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await
}
