//! Per-universe transmission statistics and engine events

use dmxflow_core::PortAddress;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::time::Instant;

/// Capacity of the engine event channel
pub const EVENT_CAPACITY: usize = 256;

/// Something the scheduler did on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A datagram left the socket
    PacketSent {
        /// Universe of the packet
        universe: PortAddress,
        /// Datagram destination
        destination: SocketAddr,
        /// Sequence byte carried by the packet
        sequence: u8,
    },
    /// A datagram could not be sent
    SendFailed {
        /// Universe of the packet
        universe: PortAddress,
        /// Datagram destination
        destination: SocketAddr,
        /// Socket error text
        error: String,
    },
}

/// Counters for one universe, as of the time of the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Datagrams sent successfully
    pub packets_sent: u64,
    /// Datagrams that failed to send
    pub send_failures: u64,
    /// Text of the most recent send failure
    pub last_error: Option<String>,
    /// Sequence byte of the most recent successful packet
    pub last_sequence: Option<u8>,
    /// Time of the most recent successful packet
    pub last_sent: Option<Instant>,
}

/// Shared per-universe counters, updated by the universe's scheduling task.
#[derive(Debug, Default)]
pub struct UniverseStats {
    inner: Mutex<StatsSnapshot>,
}

impl UniverseStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sent(&self, sequence: u8, at: Instant) {
        let mut inner = self.inner.lock();
        inner.packets_sent += 1;
        inner.last_sequence = Some(sequence);
        inner.last_sent = Some(at);
    }

    pub(crate) fn record_failure(&self, error: String) {
        let mut inner = self.inner.lock();
        inner.send_failures += 1;
        inner.last_error = Some(error);
    }

    /// Copy the current counters
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.lock().clone()
    }
}
