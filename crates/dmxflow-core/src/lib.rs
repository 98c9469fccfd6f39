//! DmxFlow Core - Channel State and Fixture Model
//!
//! This crate contains the data model the Art-Net engine drives:
//! - **Port addresses**: the 15-bit Net/Sub-Net/Universe address space
//! - **Universe buffers**: 512 channel slots with a dirty marker
//! - **Fixture catalog**: fixture definitions, their JSON form and QLC+ import
//! - **Fixture map**: fixture placements resolved to absolute channel offsets
//!
//! Transmission (packet encoding, sequencing, scheduling) lives in
//! `dmxflow-control`.
//!
//! ## Example
//!
//! ```rust
//! use dmxflow_core::{PortAddress, UniverseBuffer};
//!
//! # fn main() -> dmxflow_core::Result<()> {
//! let buffer = UniverseBuffer::new(PortAddress::new(0, 0, 3)?);
//! buffer.set(0, 255)?;
//! assert_eq!(buffer.read(0), 255);
//! assert!(buffer.is_dirty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod catalog;
pub mod error;
pub mod fixture;
pub mod fixture_map;
pub mod universe;

pub use address::PortAddress;
pub use catalog::{
    Capability, CapabilityColor, ChannelDefinition, ChannelGroup, FixtureCatalog,
    FixtureDefinition, LampType, Mode, ModeChannel, Physical,
};
pub use error::{CoreError, Result};
pub use fixture::{FixtureId, FixtureInstance};
pub use fixture_map::{FixtureMap, OverlapPolicy};
pub use universe::{Snapshot, UniverseBuffer, Universes, CHANNELS_PER_UNIVERSE};
