//! boxrelay gateway - streams uploads into Dropbox

use boxrelay_cli::{run_server, GatewayConfig};
use boxrelay_client::{DEFAULT_CHECKPOINT_BATCH, DEFAULT_CHUNK_SIZE};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "boxrelay-gateway")]
#[command(about = "Streaming upload relay for Dropbox")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "BOXRELAY_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "BOXRELAY_PORT")]
    port: u16,

    /// Dropbox RPC endpoint base, e.g. https://api.dropboxapi.com/2/files
    #[arg(long, env = "DROPBOX_API_URL")]
    api_url: String,

    /// Dropbox content-upload endpoint base, e.g. https://content.dropboxapi.com/2/files
    #[arg(long, env = "DROPBOX_CONTENT_URL")]
    content_url: String,

    /// Authorization header value, e.g. "Bearer <token>"
    #[arg(long, env = "DROPBOX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Bytes per forwarded chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, env = "BOXRELAY_CHUNK_SIZE")]
    chunk_size: usize,

    /// Chunks per append request before a checkpoint
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_BATCH, env = "BOXRELAY_CHECKPOINT_BATCH")]
    checkpoint_batch: u64,

    /// Outbound request timeout in seconds
    #[arg(long, default_value = "3600", env = "BOXRELAY_REQUEST_TIMEOUT")]
    request_timeout_secs: u64,

    /// Disable CORS headers
    #[arg(long, env = "BOXRELAY_NO_CORS")]
    no_cors: bool,

    /// Enable debug logging
    #[arg(short, long, env = "BOXRELAY_DEBUG")]
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
                "boxrelay_cli={0},boxrelay_client={0},tower_http=debug",
                log_level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting boxrelay gateway on {}:{}", args.host, args.port);
    tracing::info!("Dropbox API: {}", args.api_url);
    tracing::info!("Dropbox content: {}", args.content_url);

    if args.no_cors {
        tracing::warn!("CORS is disabled");
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        chunk_size: args.chunk_size,
        checkpoint_batch: args.checkpoint_batch,
        request_timeout_secs: args.request_timeout_secs,
        cors_enabled: !args.no_cors,
        ..GatewayConfig::new(args.api_url, args.content_url, args.access_token)
    };

    run_server(config).await
}
