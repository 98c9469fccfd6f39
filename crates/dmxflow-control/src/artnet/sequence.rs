//! ArtDMX sequence numbering

/// Per-universe sequence byte.
///
/// Live values run `1..=255` and wrap back to 1; 0 means "not sequenced" and
/// is only emitted when sequencing is disabled.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    enabled: bool,
    value: u8,
}

impl SequenceCounter {
    /// Create a counter starting at 1, or a disabled counter that always yields 0
    pub fn new(enabled: bool) -> Self {
        Self { enabled, value: 1 }
    }

    /// Whether sequencing is in use
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Value the next packet will carry
    pub fn current(&self) -> u8 {
        if self.enabled {
            self.value
        } else {
            0
        }
    }

    /// Move to the following value
    pub fn advance(&mut self) {
        if self.enabled {
            self.value = if self.value == u8::MAX { 1 } else { self.value + 1 };
        }
    }

    /// Return the current value and advance
    pub fn next(&mut self) -> u8 {
        let value = self.current();
        self.advance();
        value
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new(true)
    }
}
