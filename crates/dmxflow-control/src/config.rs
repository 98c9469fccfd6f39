//! Engine configuration
//!
//! Loaded from the `[engine]` table of the daemon's TOML file. Every field
//! has a default so an empty table yields a working engine bound to
//! `0.0.0.0:6454`.

use dmxflow_core::{OverlapPolicy, PortAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

use crate::{artnet::ARTNET_PORT, error::ControlError, Result};

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], ARTNET_PORT))
}

fn default_refresh_interval_ms() -> u64 {
    25
}

fn default_coalesce_window_ms() -> u64 {
    5
}

fn default_shutdown_grace_ms() -> u64 {
    250
}

/// Whole milliseconds, rounded up so a non-zero duration never becomes 0
fn ceil_millis(duration: Duration) -> u64 {
    let mut millis = duration.as_millis();
    if duration.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Transmission settings for one universe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Flat integer or `{ net, sub_net, universe }` table
    pub address: PortAddress,
    /// Nodes receiving this universe; falls back to the engine defaults when empty
    #[serde(default)]
    pub destinations: Vec<SocketAddr>,
    /// Emit live sequence numbers (otherwise always 0)
    #[serde(default = "default_true")]
    pub sequencing: bool,
    /// Physical port byte
    #[serde(default)]
    pub physical: u8,
}

impl UniverseConfig {
    /// Create a sequenced universe without destinations
    pub fn new(address: PortAddress) -> Self {
        Self {
            address,
            destinations: Vec::new(),
            sequencing: true,
            physical: 0,
        }
    }

    /// Add a destination node
    pub fn with_destination(mut self, destination: SocketAddr) -> Self {
        self.destinations.push(destination);
        self
    }

    /// Enable or disable sequence numbers
    pub fn with_sequencing(mut self, sequencing: bool) -> Self {
        self.sequencing = sequencing;
        self
    }

    /// Set the physical port byte
    pub fn with_physical(mut self, physical: u8) -> Self {
        self.physical = physical;
        self
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Local address of the sending socket
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
    /// Allow sending to broadcast addresses
    #[serde(default)]
    pub broadcast: bool,
    /// Full refresh period per universe
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Minimum gap between change-triggered packets of one universe
    #[serde(default = "default_coalesce_window_ms")]
    pub coalesce_window_ms: u64,
    /// How long shutdown waits for scheduling tasks before aborting them
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    /// Whether fixture placements may share channels
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    /// Destinations for universes that configure none
    #[serde(default)]
    pub default_destinations: Vec<SocketAddr>,
    /// Universes known at startup
    #[serde(default)]
    pub universes: Vec<UniverseConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            broadcast: false,
            refresh_interval_ms: default_refresh_interval_ms(),
            coalesce_window_ms: default_coalesce_window_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            overlap_policy: OverlapPolicy::default(),
            default_destinations: Vec::new(),
            universes: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document holding the engine table's fields
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ControlError::Configuration(format!("Invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the local socket address
    pub fn with_bind_address(mut self, address: SocketAddr) -> Self {
        self.bind_address = address;
        self
    }

    /// Enable or disable broadcast on the socket
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Set the refresh period, rounded up to whole milliseconds
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_ms = ceil_millis(interval);
        self
    }

    /// Set the coalescing window, rounded up to whole milliseconds
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_window_ms = ceil_millis(window);
        self
    }

    /// Set the shutdown grace period
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_ms = ceil_millis(grace);
        self
    }

    /// Set the overlap policy
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Add a fallback destination
    pub fn with_default_destination(mut self, destination: SocketAddr) -> Self {
        self.default_destinations.push(destination);
        self
    }

    /// Add a universe
    pub fn with_universe(mut self, universe: UniverseConfig) -> Self {
        self.universes.push(universe);
        self
    }

    /// Refresh period
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Coalescing window
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    /// Shutdown grace period
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Settings for a configured universe
    pub fn universe(&self, address: PortAddress) -> Option<&UniverseConfig> {
        self.universes.iter().find(|u| u.address == address)
    }

    /// Destinations for `address`: its own, or the defaults when it has none
    pub fn destinations_for(&self, address: PortAddress) -> &[SocketAddr] {
        match self.universe(address) {
            Some(universe) if !universe.destinations.is_empty() => &universe.destinations,
            _ => &self.default_destinations,
        }
    }

    /// Check value ranges and duplicate universes
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms == 0 {
            return Err(ControlError::Configuration(
                "refresh_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.coalesce_window_ms > self.refresh_interval_ms {
            return Err(ControlError::Configuration(format!(
                "coalesce_window_ms ({}) must not exceed refresh_interval_ms ({})",
                self.coalesce_window_ms, self.refresh_interval_ms
            )));
        }

        let mut seen = BTreeSet::new();
        for universe in &self.universes {
            if !seen.insert(universe.address) {
                return Err(ControlError::Configuration(format!(
                    "universe {} configured more than once",
                    universe.address
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.bind_address.port(), 6454);
        assert_eq!(config.refresh_interval(), Duration::from_millis(25));
        assert_eq!(config.coalesce_window(), Duration::from_millis(5));
        assert_eq!(config.shutdown_grace(), Duration::from_millis(250));
        assert_eq!(config.overlap_policy, OverlapPolicy::Permissive);
    }

    #[test]
    fn test_parse_full() {
        let config = EngineConfig::from_toml_str(
            r#"
            bind_address = "192.168.1.10:6454"
            broadcast = true
            refresh_interval_ms = 40
            coalesce_window_ms = 10
            overlap_policy = "reject"
            default_destinations = ["192.168.1.255:6454"]

            [[universes]]
            address = 3
            destinations = ["192.168.1.3:6454"]

            [[universes]]
            address = { net = 1, sub_net = 2, universe = 3 }
            sequencing = false
            physical = 1
            "#,
        )
        .unwrap();

        assert!(config.broadcast);
        assert_eq!(config.overlap_policy, OverlapPolicy::Reject);
        assert_eq!(config.universes.len(), 2);

        let first = PortAddress::from_flat(3).unwrap();
        assert_eq!(
            config.destinations_for(first),
            &["192.168.1.3:6454".parse::<SocketAddr>().unwrap()]
        );

        let second = PortAddress::new(1, 2, 3).unwrap();
        let universe = config.universe(second).unwrap();
        assert!(!universe.sequencing);
        assert_eq!(universe.physical, 1);
        assert_eq!(
            config.destinations_for(second),
            &["192.168.1.255:6454".parse::<SocketAddr>().unwrap()]
        );
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        assert!(EngineConfig::from_toml_str("refresh_interval_ms = 0").is_err());
        assert!(EngineConfig::from_toml_str(
            "refresh_interval_ms = 10\ncoalesce_window_ms = 20"
        )
        .is_err());
        assert!(EngineConfig::from_toml_str("[[universes]]\naddress = 40000").is_err());
        assert!(EngineConfig::from_toml_str(
            "[[universes]]\naddress = { universe = 16 }"
        )
        .is_err());
        assert!(EngineConfig::from_toml_str("bind_address = \"not an address\"").is_err());
    }

    #[test]
    fn test_duplicate_universe_rejected() {
        let address = PortAddress::from_flat(1).unwrap();
        let config = EngineConfig::new()
            .with_universe(UniverseConfig::new(address))
            .with_universe(UniverseConfig::new(address));
        assert!(matches!(
            config.validate(),
            Err(ControlError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder() {
        let destination: SocketAddr = "10.0.0.1:6454".parse().unwrap();
        let config = EngineConfig::new()
            .with_refresh_interval(Duration::from_millis(100))
            .with_coalesce_window(Duration::from_millis(20))
            .with_universe(
                UniverseConfig::new(PortAddress::default())
                    .with_destination(destination)
                    .with_sequencing(false)
                    .with_physical(2),
            );

        assert!(config.validate().is_ok());
        assert_eq!(config.refresh_interval_ms, 100);
        assert_eq!(config.universes[0].destinations, vec![destination]);
        assert!(!config.universes[0].sequencing);
    }

    #[test]
    fn test_sub_millisecond_durations_round_up() {
        let config = EngineConfig::new()
            .with_refresh_interval(Duration::from_micros(500))
            .with_coalesce_window(Duration::from_micros(1))
            .with_shutdown_grace(Duration::from_micros(2500));

        assert_eq!(config.refresh_interval_ms, 1);
        assert_eq!(config.coalesce_window_ms, 1);
        assert_eq!(config.shutdown_grace_ms, 3);
        assert!(config.validate().is_ok());

        let exact = EngineConfig::new().with_refresh_interval(Duration::from_millis(40));
        assert_eq!(exact.refresh_interval_ms, 40);
        assert_eq!(ceil_millis(Duration::ZERO), 0);
    }
}
