//! Raffle HTTP server.
//!
//! Number allocation and draw subsystem behind an Axum API.

use rifa_core::Raffle;
use rifa_core::providers::SystemClock;
use rifa_postgres::PostgresRaffleStore;
use rifa_web::auth::EnvTokenGate;
use rifa_web::notify::TracingNotifier;
use rifa_web::proofs::FsProofStorage;
use rifa_web::{AppState, Config, build_router};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rifa_web=info,rifa_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rifa HTTP server");

    // Load configuration
    let config = Config::from_env();
    info!(
        postgres_url = %config.postgres.url,
        pool_size = config.raffle.pool_size,
        "Configuration loaded"
    );

    // Setup store
    info!("Connecting to database...");
    let store = PostgresRaffleStore::connect(&config.postgres.url).await?;
    store.migrate().await?;
    info!("Database ready");

    // Wire the service
    let raffle = Raffle::new(
        store,
        FsProofStorage::new(config.proofs.dir.clone()),
        TracingNotifier,
        SystemClock,
        config.raffle_config(),
    );
    let state = AppState::new(raffle, EnvTokenGate::new(config.operator.token.clone()));

    // Serve
    let router = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
