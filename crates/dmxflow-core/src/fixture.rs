//! Fixture instances

use std::ops::Range;
use std::sync::Arc;

use crate::{
    address::PortAddress,
    catalog::{FixtureDefinition, Mode},
    error::CoreError,
    universe::CHANNELS_PER_UNIVERSE,
    Result,
};

/// Handle of a fixture placed in a [`FixtureMap`](crate::FixtureMap)
pub type FixtureId = u32;

/// A fixture definition patched at a universe and starting address.
#[derive(Debug, Clone)]
pub struct FixtureInstance {
    name: String,
    definition: Arc<FixtureDefinition>,
    mode_index: usize,
    universe: PortAddress,
    start_address: u16, // 1-512
}

impl FixtureInstance {
    /// Create a fixture instance.
    ///
    /// Fails if the mode does not exist or the footprint
    /// (`start_address + channel_count - 1`) does not fit in the universe.
    pub fn new(
        name: impl Into<String>,
        definition: Arc<FixtureDefinition>,
        mode: &str,
        universe: PortAddress,
        start_address: u16,
    ) -> Result<Self> {
        let mode_index = definition
            .modes
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(mode))
            .ok_or_else(|| CoreError::UnknownMode {
                manufacturer: definition.manufacturer.clone(),
                model: definition.model.clone(),
                mode: mode.to_string(),
            })?;

        validate_footprint(start_address, definition.modes[mode_index].channel_count())?;

        Ok(Self {
            name: name.into(),
            definition,
            mode_index,
            universe,
            start_address,
        })
    }

    /// Instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Definition this instance was created from
    pub fn definition(&self) -> &Arc<FixtureDefinition> {
        &self.definition
    }

    /// Selected mode
    pub fn mode(&self) -> &Mode {
        &self.definition.modes[self.mode_index]
    }

    /// Universe the fixture is patched in
    pub fn universe(&self) -> PortAddress {
        self.universe
    }

    /// First DMX address (1-based)
    pub fn start_address(&self) -> u16 {
        self.start_address
    }

    /// Number of channels the selected mode occupies
    pub fn channel_count(&self) -> usize {
        self.mode().channel_count()
    }

    /// Last DMX address (1-based). Equals `start_address - 1` for an empty mode.
    pub fn end_address(&self) -> u16 {
        self.start_address + self.channel_count() as u16 - 1
    }

    /// 0-based buffer offsets covered by the fixture
    pub fn offsets(&self) -> Range<usize> {
        let start = self.start_address as usize - 1;
        start..start + self.channel_count()
    }

    /// Absolute 0-based buffer offset of a 0-based logical channel index
    pub fn resolve(&self, index: usize) -> Result<usize> {
        let count = self.channel_count();
        if index >= count {
            return Err(CoreError::ChannelIndexOutOfRange { index, count });
        }
        Ok(self.start_address as usize - 1 + index)
    }

    /// Absolute 0-based buffer offset of the first channel with `role`
    pub fn resolve_role(&self, role: &str) -> Result<usize> {
        let index = self
            .mode()
            .role_index(role)
            .ok_or_else(|| CoreError::UnknownRole(role.to_string()))?;
        self.resolve(index)
    }

    /// Check whether two fixtures share at least one channel
    pub fn overlaps(&self, other: &FixtureInstance) -> bool {
        if self.universe != other.universe {
            return false;
        }
        let (a, b) = (self.offsets(), other.offsets());
        !a.is_empty() && !b.is_empty() && a.start < b.end && b.start < a.end
    }
}

/// Check `1 <= start_address` and `start_address + channel_count - 1 <= 512`.
pub(crate) fn validate_footprint(start_address: u16, channel_count: usize) -> Result<()> {
    if start_address == 0 || start_address as usize > CHANNELS_PER_UNIVERSE {
        return Err(CoreError::InvalidPlacement(format!(
            "start address {} out of range (1-512)",
            start_address
        )));
    }

    let end = start_address as usize + channel_count;
    if end - 1 > CHANNELS_PER_UNIVERSE {
        return Err(CoreError::InvalidPlacement(format!(
            "start address {} with {} channels ends at {} (past 512)",
            start_address,
            channel_count,
            end - 1
        )));
    }

    Ok(())
}
