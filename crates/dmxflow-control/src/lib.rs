//! DmxFlow Control - Art-Net Transmission
//!
//! This crate turns the channel state held in `dmxflow-core` into Art-Net
//! traffic:
//! - **Packet encoding**: wire-exact ArtDMX packets
//! - **Sequencing**: the per-universe 1-255 sequence byte
//! - **Transmission**: UDP sending behind a [`Transport`] trait
//! - **Scheduling**: periodic refresh plus coalesced change-triggered sends
//! - **Engine**: the instance tying universes, fixtures and tasks together
//! - **Web API**: read-only fixture catalog over HTTP (requires `http-api`)
//!
//! ## Feature Flags
//!
//! - `http-api`: Enable the catalog web API (requires `axum`, `tower-http`)
//!
//! ## Modules
//!
//! - [`artnet`] - ArtDMX encoding and sequence numbers
//! - [`transmitter`] - UDP transport
//! - [`scheduler`] - Per-universe send loop
//! - [`engine`] - Transmission engine
//! - [`config`] - Engine configuration
//! - [`stats`] - Counters and events
//! - `web` - Catalog web API (requires `http-api` feature)
//! - [`error`] - Error types

#![allow(missing_docs)]

/// ArtDMX packets and sequence numbers
pub mod artnet;
/// Engine configuration
pub mod config;
/// Transmission engine
pub mod engine;
/// Error types
pub mod error;
/// Per-universe scheduling
pub mod scheduler;
/// Transmission counters and events
pub mod stats;
/// UDP transmission
pub mod transmitter;

#[cfg(feature = "http-api")]
/// Catalog web API
pub mod web;

// Re-exports
pub use artnet::{ArtDmx, SequenceCounter, ARTNET_PORT};
pub use config::{EngineConfig, UniverseConfig};
pub use engine::Engine;
pub use error::{ControlError, Result};
pub use stats::{EngineEvent, StatsSnapshot};
pub use transmitter::{Transmitter, Transport, UdpTransport};

#[cfg(feature = "http-api")]
pub use web::{CatalogServer, CatalogServerConfig};
