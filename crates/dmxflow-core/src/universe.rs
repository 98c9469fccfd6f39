//! Per-universe channel buffers
//!
//! A [`UniverseBuffer`] is the single source of truth for one universe's 512
//! channel values. Writers set values under a short exclusive lock and wake
//! the universe's transmit task; the transmit task takes a [`Snapshot`],
//! releases the lock and only then touches the network.

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

use crate::{address::PortAddress, error::CoreError, Result};

/// Number of channel slots in a DMX512 universe.
pub const CHANNELS_PER_UNIVERSE: usize = 512;

#[derive(Debug)]
struct BufferState {
    channels: [u8; CHANNELS_PER_UNIVERSE],
    dirty: bool,
    revision: u64,
    last_sent: Option<Instant>,
}

/// Consistent copy of a universe's channels, taken for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Universe the values belong to
    pub address: PortAddress,
    /// Channel values, index 0 is DMX channel 1
    pub channels: [u8; CHANNELS_PER_UNIVERSE],
    /// Write revision the copy reflects
    pub revision: u64,
}

/// 512-slot channel store with a dirty marker.
#[derive(Debug)]
pub struct UniverseBuffer {
    address: PortAddress,
    state: Mutex<BufferState>,
    changed: Notify,
}

impl UniverseBuffer {
    /// Create an all-zero, clean buffer.
    pub fn new(address: PortAddress) -> Self {
        Self {
            address,
            state: Mutex::new(BufferState {
                channels: [0u8; CHANNELS_PER_UNIVERSE],
                dirty: false,
                revision: 0,
                last_sent: None,
            }),
            changed: Notify::new(),
        }
    }

    /// Universe this buffer belongs to
    pub fn address(&self) -> PortAddress {
        self.address
    }

    /// Set one channel (0-based offset).
    ///
    /// Fails with [`CoreError::OutOfRange`] for offsets past 511; the buffer is
    /// left untouched in that case.
    pub fn set(&self, offset: usize, value: u8) -> Result<()> {
        check_range(offset, 1)?;
        {
            let mut state = self.state.lock();
            state.channels[offset] = value;
            state.dirty = true;
            state.revision += 1;
        }
        self.changed.notify_one();
        Ok(())
    }

    /// Set consecutive channels starting at `offset`, all or nothing.
    pub fn set_range(&self, offset: usize, values: &[u8]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        check_range(offset, values.len())?;
        {
            let mut state = self.state.lock();
            state.channels[offset..offset + values.len()].copy_from_slice(values);
            state.dirty = true;
            state.revision += 1;
        }
        self.changed.notify_one();
        Ok(())
    }

    /// Current value at `offset`; offsets past the universe read as 0.
    pub fn read(&self, offset: usize) -> u8 {
        self.state.lock().channels.get(offset).copied().unwrap_or(0)
    }

    /// Set every channel to 0.
    pub fn clear(&self) {
        {
            let mut state = self.state.lock();
            state.channels = [0u8; CHANNELS_PER_UNIVERSE];
            state.dirty = true;
            state.revision += 1;
        }
        self.changed.notify_one();
    }

    /// Copy all 512 values. Does not clear the dirty flag.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            address: self.address,
            channels: state.channels,
            revision: state.revision,
        }
    }

    /// Whether values changed since the last successful transmission
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Number of writes applied so far
    pub fn revision(&self) -> u64 {
        self.state.lock().revision
    }

    /// Time of the last successful transmission
    pub fn last_sent(&self) -> Option<Instant> {
        self.state.lock().last_sent
    }

    /// Record a successful transmission of the snapshot taken at `revision`.
    ///
    /// The dirty flag is only cleared when no write landed after that
    /// snapshot. Returns whether the buffer is clean afterwards.
    pub fn mark_sent(&self, revision: u64, at: Instant) -> bool {
        let mut state = self.state.lock();
        state.last_sent = Some(at);
        if state.revision == revision {
            state.dirty = false;
        }
        !state.dirty
    }

    /// Resolves after the next write (or immediately if one happened since
    /// the last wake-up). Multiple writes collapse into a single wake-up.
    pub async fn changed(&self) {
        self.changed.notified().await
    }
}

fn check_range(offset: usize, len: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= CHANNELS_PER_UNIVERSE => Ok(()),
        _ => Err(CoreError::OutOfRange {
            offset,
            len: CHANNELS_PER_UNIVERSE,
        }),
    }
}

/// Registry of the universes referenced by configuration or placements.
#[derive(Debug, Default)]
pub struct Universes {
    buffers: RwLock<BTreeMap<PortAddress, Arc<UniverseBuffer>>>,
}

impl Universes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing universe
    pub fn get(&self, address: PortAddress) -> Option<Arc<UniverseBuffer>> {
        self.buffers.read().get(&address).cloned()
    }

    /// Return the universe at `address`, creating it on first reference.
    ///
    /// The flag is `true` when this call created the buffer.
    pub fn get_or_create(&self, address: PortAddress) -> (Arc<UniverseBuffer>, bool) {
        if let Some(buffer) = self.get(address) {
            return (buffer, false);
        }

        let mut buffers = self.buffers.write();
        let mut created = false;
        let buffer = buffers
            .entry(address)
            .or_insert_with(|| {
                created = true;
                tracing::debug!("Created universe {}", address);
                Arc::new(UniverseBuffer::new(address))
            })
            .clone();
        (buffer, created)
    }

    /// All known universe addresses, in ascending order
    pub fn addresses(&self) -> Vec<PortAddress> {
        self.buffers.read().keys().copied().collect()
    }

    /// Number of known universes
    pub fn len(&self) -> usize {
        self.buffers.read().len()
    }

    /// Check if no universe has been created yet
    pub fn is_empty(&self) -> bool {
        self.buffers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> UniverseBuffer {
        UniverseBuffer::new(PortAddress::default())
    }

    #[test]
    fn test_new_buffer_is_clean() {
        let buffer = buffer();
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.revision(), 0);
        assert!(buffer.last_sent().is_none());
        assert_eq!(buffer.snapshot().channels, [0u8; 512]);
    }

    #[test]
    fn test_set_marks_dirty() {
        let buffer = buffer();
        buffer.set(10, 200).unwrap();
        assert!(buffer.is_dirty());
        assert_eq!(buffer.read(10), 200);
        assert_eq!(buffer.snapshot().channels[10], 200);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let buffer = buffer();
        let err = buffer.set(512, 1).unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange { offset: 512, .. }));
        assert!(buffer.set(usize::MAX, 1).is_err());
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.revision(), 0);
    }

    #[test]
    fn test_set_range_all_or_nothing() {
        let buffer = buffer();
        assert!(buffer.set_range(510, &[1, 2, 3]).is_err());
        assert_eq!(buffer.read(510), 0);
        assert_eq!(buffer.read(511), 0);

        buffer.set_range(509, &[1, 2, 3]).unwrap();
        assert_eq!(buffer.read(509), 1);
        assert_eq!(buffer.read(511), 3);
    }

    #[test]
    fn test_snapshot_does_not_clear_dirty() {
        let buffer = buffer();
        buffer.set(0, 1).unwrap();
        let _ = buffer.snapshot();
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_mark_sent_clears_dirty() {
        let buffer = buffer();
        buffer.set(0, 1).unwrap();
        let snapshot = buffer.snapshot();
        assert!(buffer.mark_sent(snapshot.revision, Instant::now()));
        assert!(!buffer.is_dirty());
        assert!(buffer.last_sent().is_some());
    }

    #[test]
    fn test_write_after_snapshot_keeps_dirty() {
        let buffer = buffer();
        buffer.set(0, 1).unwrap();
        let snapshot = buffer.snapshot();
        buffer.set(1, 2).unwrap();

        assert!(!buffer.mark_sent(snapshot.revision, Instant::now()));
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_clear() {
        let buffer = buffer();
        buffer.set(3, 9).unwrap();
        let snapshot = buffer.snapshot();
        buffer.mark_sent(snapshot.revision, Instant::now());

        buffer.clear();
        assert_eq!(buffer.read(3), 0);
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_read_past_end() {
        assert_eq!(buffer().read(4096), 0);
    }

    #[tokio::test]
    async fn test_changed_wakes_after_write() {
        let buffer = buffer();
        buffer.set(0, 1).unwrap();
        buffer.set(0, 2).unwrap();
        // Permit stored by the writes above
        buffer.changed().await;
    }

    #[test]
    fn test_registry_get_or_create() {
        let universes = Universes::new();
        let address = PortAddress::from_flat(3).unwrap();

        let (first, created) = universes.get_or_create(address);
        assert!(created);
        let (second, created) = universes.get_or_create(address);
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(universes.addresses(), vec![address]);
        assert_eq!(universes.len(), 1);
    }
}
