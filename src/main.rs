use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pushcast::config::{DEFAULT_PUSH_TTL, DEFAULT_VAPID_SUBJECT, DeliveryConfig, ServerConfig};
use pushcast::push::{VapidKeys, WebPushClient};
use pushcast::server::{AppState, create_router};
use pushcast::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "pushcast")]
#[command(about = "A web push notification server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve(ServeArgs),

    /// Generate a VAPID keypair and print it in .env format
    Keygen,
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "PUSHCAST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, short, env = "PUSHCAST_PORT", default_value = "5000")]
    port: u16,

    /// SQLite database file
    #[arg(long, env = "PUSHCAST_DB", default_value = "./subscriptions.db")]
    db_path: PathBuf,

    /// VAPID public key (base64url, uncompressed P-256 point)
    #[arg(long, env = "VAPID_PUBLIC_KEY", hide_env_values = true)]
    vapid_public_key: String,

    /// VAPID private key (base64url, raw 32-byte scalar)
    #[arg(long, env = "VAPID_PRIVATE_KEY", hide_env_values = true)]
    vapid_private_key: String,

    /// Contact URI sent as the VAPID `sub` claim
    #[arg(long, env = "VAPID_SUBJECT", default_value = DEFAULT_VAPID_SUBJECT)]
    vapid_subject: String,

    /// Serve the frontend from this directory, falling back to its index.html
    #[arg(long, env = "PUSHCAST_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Origin allowed to call the API from a browser (repeatable)
    #[arg(
        long = "allowed-origin",
        env = "PUSHCAST_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:8000,http://127.0.0.1:8000"
    )]
    allowed_origins: Vec<String>,

    /// Mount the /api/debug routes (listing, clear-all, reset-db)
    #[arg(long, env = "PUSHCAST_DEBUG_ROUTES")]
    enable_debug_routes: bool,

    /// Push deliveries in flight at once during a broadcast
    #[arg(long, default_value = "1")]
    delivery_concurrency: usize,

    /// Seconds a push service keeps an undelivered message
    #[arg(long, default_value_t = DEFAULT_PUSH_TTL)]
    push_ttl: u32,
}

fn run_keygen() {
    let keys = VapidKeys::generate();

    println!("VAPID_PUBLIC_KEY={}", keys.public_key_base64url());
    println!("VAPID_PRIVATE_KEY={}", keys.private_key_base64url());
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let vapid = VapidKeys::from_base64url(&args.vapid_public_key, &args.vapid_private_key)
        .context("Invalid VAPID keys. Run 'pushcast keygen' to create a pair")?
        .into_config(args.vapid_subject);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        db_path: args.db_path,
        static_dir: args.static_dir,
        allowed_origins: args.allowed_origins,
        debug_routes: args.enable_debug_routes,
        delivery: DeliveryConfig {
            concurrency: args.delivery_concurrency.max(1),
            ttl: args.push_ttl,
        },
    };

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let store = SqliteStore::new(&config.db_path)?;
    store.initialize()?;
    info!("Database ready at {}", config.db_path.display());

    let push_client = WebPushClient::new(config.delivery.ttl);
    let addr = config.socket_addr()?;

    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(push_client),
        vapid,
        config,
    ));

    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pushcast=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await?,
        Commands::Keygen => run_keygen(),
    }

    Ok(())
}
