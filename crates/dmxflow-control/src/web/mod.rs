//! Read-only HTTP introspection of the fixture catalog
//!
//! Serves the loaded [`FixtureCatalog`](dmxflow_core::FixtureCatalog) as
//! JSON. The service never touches universe buffers.
//!
//! - `GET /fixtures`: every definition
//! - `GET /fixtures/:manufacturer/:model`: one definition
//! - `GET /api/status`: version, uptime and catalog size

pub mod handlers;
pub mod routes;
pub mod server;

pub use handlers::{ApiResponse, StatusResponse};
pub use routes::build_router;
pub use server::{AppState, CatalogServer, CatalogServerConfig};
