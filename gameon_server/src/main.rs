//! GameOn server binary.
//!
//! Runs the REST API over PostgreSQL, or over the in-memory store with
//! `--memory` for local development.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

use gameon::{
    auth::AuthManager,
    db::{Database, GameStore, MemGameStore, PgGameStore},
    GameManager, PaymentCoordinator, SandboxPaymentProvider, SettlementManager,
};
use gameon_server::{api, config::ServerConfig, logging, metrics};

const HELP: &str = "\
Run a GameOn API server

USAGE:
  gameon_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --memory                 Use the in-memory store with seeded lookup data
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  WEBHOOK_SECRET           Payment webhook signing secret (required)
  METRICS_BIND             Optional Prometheus exporter address
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let db_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let use_memory = pargs.contains("--memory");

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, db_url_override, use_memory)?;
    config.validate()?;

    if let Some(metrics_addr) = config.metrics_bind {
        metrics::init_metrics(metrics_addr).map_err(Error::msg)?;
        info!("Prometheus metrics exporter on {metrics_addr}");
    }

    let store: Arc<dyn GameStore> = if config.use_memory_store {
        info!("Using in-memory store (development mode)");
        let store = Arc::new(MemGameStore::new());
        store.seed_defaults().await;
        store
    } else {
        info!("Connecting to database: {}", config.database.database_url);
        let db = Database::new(&config.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
        info!("Database connected successfully");
        Arc::new(PgGameStore::new(Arc::new(db.pool().clone())))
    };

    let auth_manager = Arc::new(AuthManager::new(
        store.clone(),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    ));
    let game_manager = GameManager::new(store.clone());
    let settlement = SettlementManager::new(store.clone());
    let provider = Arc::new(SandboxPaymentProvider::new());
    let payments = PaymentCoordinator::new(store.clone(), provider, settlement.clone());

    let api_state = api::AppState {
        auth_manager,
        game_manager,
        payments,
        settlement,
        store,
        webhook_secret: config.security.webhook_secret.clone(),
    };

    let app = api::create_router(api_state);

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
