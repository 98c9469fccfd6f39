//! DmxFlow - Art-Net DMX transmission daemon
//!
//! Loads a TOML configuration and a fixture catalog (optionally importing
//! QLC+ `.qxf` files into it first), places the configured fixtures,
//! transmits every configured universe and optionally serves the catalog
//! over HTTP until Ctrl-C.

#![warn(missing_docs)]

mod config;
mod logging_setup;
mod patch;

use anyhow::{Context, Result};
use clap::Parser;
use dmxflow_control::Engine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Art-Net DMX transmission daemon", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "dmxflow.toml")]
    config: PathBuf,

    /// Fixture catalog directory, overriding the config file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Log level, overriding the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Serve the fixture catalog over HTTP
    #[arg(long)]
    http: bool,

    /// Import a QLC+ .qxf definition into the catalog directory before startup
    #[arg(long = "import", value_name = "QXF")]
    imports: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        eprintln!(
            "Warning: Config file {:?} not found, using defaults",
            cli.config
        );
        AppConfig::default()
    };

    if let Some(directory) = cli.catalog {
        config.catalog.directory = directory;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.http {
        config.http.enabled = true;
    }

    let _log_guard = logging_setup::init(&config.logging)?;

    info!("==========================================");
    info!("===      DmxFlow Session Started       ===");
    info!("==========================================");

    if !cli.imports.is_empty() {
        patch::import_qxf(&cli.imports, &config.catalog.directory)?;
    }
    let catalog = Arc::new(patch::load_catalog(&config.catalog.directory)?);

    let engine = Engine::bind(config.engine.clone())
        .await
        .context("Failed to start Art-Net engine")?;
    patch::place_fixtures(&engine, &catalog, &config.fixtures)?;

    let (stop_http, http_stopped) = tokio::sync::oneshot::channel::<()>();
    let http_task = start_http(&config, catalog.clone(), http_stopped)?;

    info!("Running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutting down");

    let _ = stop_http.send(());
    engine.shutdown(config.engine.shutdown_grace()).await;

    if let Some(task) = http_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Catalog server error: {}", e),
            Err(e) => warn!("Catalog server task failed: {}", e),
        }
    }

    info!("DmxFlow stopped");
    Ok(())
}

#[cfg(feature = "http-api")]
type HttpTask = tokio::task::JoinHandle<dmxflow_control::Result<()>>;

#[cfg(feature = "http-api")]
fn start_http(
    config: &AppConfig,
    catalog: Arc<dmxflow_core::FixtureCatalog>,
    stopped: tokio::sync::oneshot::Receiver<()>,
) -> Result<Option<HttpTask>> {
    use dmxflow_control::{CatalogServer, CatalogServerConfig};

    if !config.http.enabled {
        return Ok(None);
    }

    let server_config =
        CatalogServerConfig::new(config.http.port).with_host(config.http.host.clone());
    // Fail on a bad host before anything is spawned
    server_config.socket_addr()?;

    let server = CatalogServer::new(server_config, catalog);
    Ok(Some(server.spawn(async move {
        let _ = stopped.await;
    })))
}

#[cfg(not(feature = "http-api"))]
type HttpTask = tokio::task::JoinHandle<std::result::Result<(), std::convert::Infallible>>;

#[cfg(not(feature = "http-api"))]
fn start_http(
    config: &AppConfig,
    _catalog: Arc<dmxflow_core::FixtureCatalog>,
    _stopped: tokio::sync::oneshot::Receiver<()>,
) -> Result<Option<HttpTask>> {
    if config.http.enabled {
        warn!("HTTP catalog service requested but built without the http-api feature");
    }
    Ok(None)
}
