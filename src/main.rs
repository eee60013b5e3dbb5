use std::process::ExitCode;
use std::sync::Arc;

use articles::{health, ArticlesApi, Config, Error, Router, Server, StoreConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Default to info-level logs; override via RUST_LOG.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;

    match &config.store {
        StoreConfig::Memory => info!("using in-memory store, nothing is persisted"),
        StoreConfig::Firestore(firestore) => info!(
            project = %firestore.project_id,
            database = %firestore.database,
            emulator = firestore.emulator_host.is_some(),
            "using firestore store"
        ),
    }
    info!(collection = %config.collection, "serving articles");

    let store = Arc::new(config.store.shared_store());

    let app = Router::new()
        .route("/healthz", health::liveness)
        .route("/readyz", health::readiness(Arc::clone(&store)))
        .fallback(ArticlesApi::new(Arc::clone(&store), config.collection).into_handler());

    let served = Server::bind(config.addr).await?.serve(app).await;
    store.shutdown().await;
    served
}
