//! Axum HTTP server

use axum::http::Method;
use axum::Router;
use dmxflow_core::FixtureCatalog;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

use crate::{error::ControlError, Result};

use super::routes::build_router;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<FixtureCatalog>,
    pub started: Instant,
}

/// Catalog server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for CatalogServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8123,
            enable_cors: true,
        }
    }
}

impl CatalogServerConfig {
    /// Create a config listening on `port`
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Set the host address
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Set CORS enabled/disabled
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Socket address to listen on
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ControlError::HttpError(format!("Invalid address: {}", e)))
    }
}

/// Read-only HTTP server for the fixture catalog
pub struct CatalogServer {
    config: CatalogServerConfig,
    catalog: Arc<FixtureCatalog>,
}

impl CatalogServer {
    /// Create a server for `catalog`
    pub fn new(config: CatalogServerConfig, catalog: Arc<FixtureCatalog>) -> Self {
        Self { config, catalog }
    }

    /// Router with state and CORS applied
    pub fn router(&self) -> Router {
        let state = AppState {
            catalog: self.catalog.clone(),
            started: Instant::now(),
        };
        let app = build_router().with_state(state);

        if self.config.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET])
                    .allow_origin(Any),
            )
        } else {
            app
        }
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr()?;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ControlError::HttpError(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Catalog server listening on {}", addr);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ControlError::HttpError(format!("Server error: {}", e)))?;

        tracing::info!("Catalog server stopped");
        Ok(())
    }

    /// Spawn the server in a background task
    pub fn spawn<F>(self, shutdown: F) -> tokio::task::JoinHandle<Result<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
