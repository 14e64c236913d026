mod app;

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Arc,
};

use freegames_core::{
    config::{self, AppConfig},
    CatalogStore, DetailsCache, HttpGamesApi,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()
        .with_context(|| format!("check {} or the FREEGAMES_* variables", config_path.display()))?;
    init_logging(&config.log_dir()?)?;

    let api = HttpGamesApi::new(&config)?;
    if !api.probe().await {
        bail!(
            "API connection failed. Please check your internet connection and API key, then try again."
        );
    }

    let catalog = Arc::new(CatalogStore::new(api.clone()));
    let details = Arc::new(DetailsCache::new(api));

    let mut app = app::FreeGamesApp::new(catalog, details, config.loading_timeout());
    app.run().await
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("freegames.log");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
