use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod models;
mod routes;
mod services;

use services::{data_store::DataStore, storage::FileStorage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::from_env()?;

    // Build our application state
    let storage = FileStorage::new(&config.upload_dir)?;
    let store = DataStore::open(&config.database_path)?;
    let state = Arc::new(AppState::new(config, storage, store));

    // Build our application with a route
    let app = routes::routes()
        .layer(DefaultBodyLimit::max(state.config.max_file_size))
        .with_state(state.clone());

    // Run it
    tracing::info!("listening on {}", state.config.bind_addr);

    let listener = tokio::net::TcpListener::bind(state.config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
pub struct AppState {
    pub config: config::Config,
    pub storage: FileStorage,
    pub store: DataStore,
}

impl AppState {
    fn new(config: config::Config, storage: FileStorage, store: DataStore) -> Self {
        Self {
            config,
            storage,
            store,
        }
    }
}
