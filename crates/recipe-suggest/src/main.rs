mod card;
mod cascade;
mod catalog;
mod config;
mod difficulty;
mod error;
mod generate;
mod journal;
mod model;
mod score;
mod server;
mod store;
mod tokenize;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use recipe_common::images::ImageClient;
use recipe_common::llm::{LlmClient, TextGeneration};

use config::Config;
use journal::Journal;
use server::AppState;
use store::GeneratedStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting recipe-suggest server");

    let config = Config::from_env()?;
    info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        text_generation = config.llm.is_configured(),
        image_search = config.images.api_key.is_some(),
        "configuration loaded"
    );

    let catalog = Arc::new(catalog::load()?);
    info!(recipes = catalog.len(), "catalog loaded");

    // Keys are optional; without them the catalog cascade and the
    // local image map carry every request.
    let llm: Option<Arc<dyn TextGeneration>> = if config.llm.is_configured() {
        Some(Arc::new(LlmClient::new(config.llm.clone())?))
    } else {
        info!("no text-generation key, serving from the catalog only");
        None
    };
    let images = Arc::new(ImageClient::new(config.images.clone())?);

    let state = AppState {
        catalog,
        store: GeneratedStore::new(),
        images,
        llm,
        journal: Journal::new(&config.data_dir),
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");
    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
