#![allow(unused, warnings)]

use color_eyre::{Result, eyre::Context};
use std::sync::Arc;

mod blob;
mod config;
mod http;
mod index;
mod manifest;
mod publish;
mod select;
mod store;
mod types;

use blob::FilesystemBlobStore;
use config::Config;
use store::SqliteReleaseStore;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "dotenv")]
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "zls_release_worker=info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();

    let store = SqliteReleaseStore::connect(&config.database_url)
        .await
        .wrap_err("failed to connect to the release store")?;
    let blob_store = FilesystemBlobStore::new(config.blob_root.clone());

    let listen_addr = config.listen_addr.clone();
    let state = http::AppState {
        store: Arc::new(store),
        blob_store: Arc::new(blob_store),
        config,
    };

    let app = http::router(state);

    tracing::info!(%listen_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {listen_addr}"))?;
    axum::serve(listener, app).await.wrap_err("server exited with an error")?;

    Ok(())
}
