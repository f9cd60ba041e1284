use std::sync::Arc;

use delivery_partner::api;
use delivery_partner::config::Config;
use delivery_partner::error::AppError;
use delivery_partner::state::AppState;
use delivery_partner::store::DeliveryStore;
use delivery_partner::store::blob::{BlobStore, FileBlobStore, MemoryBlobStore};
use delivery_partner::store::clock::SystemClock;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let blobs: Box<dyn BlobStore> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(data_dir = %dir.display(), "using file snapshot store");
            Box::new(FileBlobStore::open(dir).map_err(|err| {
                AppError::Internal(format!("failed to open data dir: {err}"))
            })?)
        }
        None => {
            tracing::warn!("DATA_DIR not set; state will not survive a restart");
            Box::new(MemoryBlobStore::new())
        }
    };

    let store = DeliveryStore::open(blobs, Box::new(SystemClock), config.transition_policy);
    let shared_state = Arc::new(AppState::new(store, config.event_buffer_size));

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
