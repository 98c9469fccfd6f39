//! Error types for the core model
use thiserror::Error;

use crate::address::PortAddress;
use crate::fixture::FixtureId;

/// Core model errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// Channel offset outside the 512-slot universe
    #[error("Channel offset {offset} out of range (universe has {len} channels)")]
    OutOfRange {
        /// Rejected offset
        offset: usize,
        /// Universe size
        len: usize,
    },

    /// Logical channel index beyond the fixture mode's footprint
    #[error("Channel index {index} out of range for mode with {count} channels")]
    ChannelIndexOutOfRange {
        /// Rejected 0-based logical index
        index: usize,
        /// Channel count of the selected mode
        count: usize,
    },

    /// Placement violates the starting address / channel count invariant
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// Placement collides with an existing fixture and overlap is rejected
    #[error("Address overlap in universe {universe}: channels {start}-{end} already used by fixture {existing}")]
    AddressOverlap {
        /// Universe of the rejected placement
        universe: PortAddress,
        /// First 1-based address of the rejected placement
        start: u16,
        /// Last 1-based address of the rejected placement
        end: u16,
        /// Fixture already occupying part of the range
        existing: FixtureId,
    },

    /// Mode name not present in the fixture definition
    #[error("Unknown mode '{mode}' for {manufacturer} {model}")]
    UnknownMode {
        /// Definition manufacturer
        manufacturer: String,
        /// Definition model
        model: String,
        /// Requested mode name
        mode: String,
    },

    /// Channel role not present in the selected mode
    #[error("Unknown channel role: {0}")]
    UnknownRole(String),

    /// Fixture id not known to the fixture map
    #[error("Unknown fixture: {0}")]
    UnknownFixture(FixtureId),

    /// Net/Sub-Net/Universe outside the 15-bit address space
    #[error("Invalid port address: {0}")]
    InvalidPortAddress(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fixture definition XML could not be read
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),
}

impl CoreError {
    /// Whether this error was raised by synchronous input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. }
                | Self::ChannelIndexOutOfRange { .. }
                | Self::InvalidPlacement(_)
                | Self::AddressOverlap { .. }
                | Self::UnknownMode { .. }
                | Self::UnknownRole(_)
                | Self::UnknownFixture(_)
                | Self::InvalidPortAddress(_)
        )
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::OutOfRange {
            offset: 512,
            len: 512,
        };
        assert_eq!(
            err.to_string(),
            "Channel offset 512 out of range (universe has 512 channels)"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(CoreError::UnknownRole("Red".to_string()).is_validation());
        let io = CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_validation());
    }
}
