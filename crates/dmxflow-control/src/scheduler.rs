//! Per-universe transmission scheduling
//!
//! Every universe with destinations runs one [`UniverseWorker`] task. A
//! worker sends on two triggers:
//!
//! - **Refresh**: a fixed-cadence tick that always sends the current buffer,
//!   whether or not anything changed.
//! - **Dirty**: a write to the buffer. The send happens one
//!   `coalesce_window` after the first write of a burst, so any number of
//!   writes inside that window leave the socket as a single packet carrying
//!   the latest values.
//!
//! The buffer lock is only held while taking the snapshot; encoding and
//! sending run on the copy.

use dmxflow_core::UniverseBuffer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::{
    artnet::{packet, SequenceCounter},
    stats::{EngineEvent, UniverseStats},
    transmitter::{Transmitter, Transport},
};

/// Why a packet is being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Periodic full refresh
    Refresh,
    /// Buffer changed
    Dirty,
}

/// Timing of one universe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Full refresh period
    pub refresh_interval: Duration,
    /// Minimum gap before a change-triggered send
    pub coalesce_window: Duration,
}

/// Owns the sequence counter of one universe and drives its sends.
pub struct UniverseWorker<T> {
    buffer: Arc<UniverseBuffer>,
    destinations: Vec<SocketAddr>,
    physical: u8,
    sequence: SequenceCounter,
    timing: Timing,
    transmitter: Transmitter<T>,
    stats: Arc<UniverseStats>,
    events: broadcast::Sender<EngineEvent>,
}

impl<T: Transport> UniverseWorker<T> {
    /// Create a worker. `destinations` must not be empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buffer: Arc<UniverseBuffer>,
        destinations: Vec<SocketAddr>,
        physical: u8,
        sequencing: bool,
        timing: Timing,
        transmitter: Transmitter<T>,
        stats: Arc<UniverseStats>,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        Self {
            buffer,
            destinations,
            physical,
            sequence: SequenceCounter::new(sequencing),
            timing,
            transmitter,
            stats,
            events,
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let address = self.buffer.address();
        let buffer = self.buffer.clone();

        let mut refresh = interval_at(
            Instant::now() + self.timing.refresh_interval,
            self.timing.refresh_interval,
        );
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_sent: Option<Instant> = None;

        debug!(
            "Universe {} scheduler started ({} destinations, refresh {:?}, coalesce {:?})",
            address,
            self.destinations.len(),
            self.timing.refresh_interval,
            self.timing.coalesce_window
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                _ = shutdown.changed() => break,

                _ = refresh.tick() => {
                    self.transmit(Trigger::Refresh).await;
                    last_sent = Some(Instant::now());
                }

                _ = buffer.changed() => {
                    // Wake-up left over from writes the last send already carried
                    if !buffer.is_dirty() {
                        continue;
                    }

                    // Pending: collect further writes for one full window
                    let now = Instant::now();
                    let deadline = last_sent.map_or(now, |last| last.max(now))
                        + self.timing.coalesce_window;
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        _ = sleep_until(deadline) => {}
                    }

                    if !buffer.is_dirty() {
                        continue;
                    }

                    self.transmit(Trigger::Dirty).await;
                    last_sent = Some(Instant::now());
                    refresh.reset();
                }
            }
        }

        debug!("Universe {} scheduler stopped", address);
    }

    /// Snapshot, encode and send to every destination.
    ///
    /// The sequence advances when at least one destination received the
    /// packet; the buffer is marked clean only when all of them did.
    async fn transmit(&mut self, trigger: Trigger) {
        let snapshot = self.buffer.snapshot();
        let sequence = self.sequence.current();
        let packet = packet::encode(
            snapshot.address,
            sequence,
            self.physical,
            &snapshot.channels,
        );

        let mut delivered = 0;
        for &destination in &self.destinations {
            match self.transmitter.send(destination, &packet).await {
                Ok(_) => {
                    delivered += 1;
                    self.stats
                        .record_sent(sequence, Instant::now().into_std());
                    let _ = self.events.send(EngineEvent::PacketSent {
                        universe: snapshot.address,
                        destination,
                        sequence,
                    });
                }
                Err(e) => {
                    warn!("Universe {}: {}", snapshot.address, e);
                    self.stats.record_failure(e.to_string());
                    let _ = self.events.send(EngineEvent::SendFailed {
                        universe: snapshot.address,
                        destination,
                        error: e.to_string(),
                    });
                }
            }
        }

        if delivered > 0 {
            self.sequence.advance();
        }
        if delivered == self.destinations.len() {
            self.buffer
                .mark_sent(snapshot.revision, Instant::now().into_std());
        }

        trace!(
            "Universe {} {:?} send: seq {} rev {} ({}/{} delivered)",
            snapshot.address,
            trigger,
            sequence,
            snapshot.revision,
            delivered,
            self.destinations.len()
        );
    }
}
