//! Fixture patching
//!
//! Maps placed fixtures to absolute universe offsets and routes logical
//! channel writes into the addressed [`UniverseBuffer`](crate::UniverseBuffer).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    address::PortAddress,
    error::CoreError,
    fixture::{validate_footprint, FixtureId, FixtureInstance},
    universe::Universes,
    Result,
};

/// What to do when a placement shares channels with an existing fixture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Shared channels are allowed, as on a real patch panel
    #[default]
    Permissive,
    /// Overlapping placements fail with [`CoreError::AddressOverlap`]
    Reject,
}

/// Placed fixtures, keyed by id
#[derive(Debug, Clone, Default)]
pub struct FixtureMap {
    policy: OverlapPolicy,
    fixtures: BTreeMap<FixtureId, FixtureInstance>,
    next_id: FixtureId,
}

impl FixtureMap {
    /// Create an empty map with the default (permissive) overlap policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with an explicit overlap policy
    pub fn with_policy(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Current overlap policy
    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Change the overlap policy for future placements
    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.policy = policy;
    }

    /// Place a fixture. Nothing is stored when validation fails.
    pub fn place(&mut self, fixture: FixtureInstance) -> Result<FixtureId> {
        validate_footprint(fixture.start_address(), fixture.channel_count())?;

        if self.policy == OverlapPolicy::Reject {
            if let Some((&existing, _)) = self
                .fixtures
                .iter()
                .find(|(_, placed)| placed.overlaps(&fixture))
            {
                return Err(CoreError::AddressOverlap {
                    universe: fixture.universe(),
                    start: fixture.start_address(),
                    end: fixture.end_address(),
                    existing,
                });
            }
        }

        let id = self.next_id;
        self.next_id += 1;

        tracing::info!(
            "Placed fixture {} '{}' ({} {}, {} ch) at {}/{}",
            id,
            fixture.name(),
            fixture.definition().manufacturer,
            fixture.definition().model,
            fixture.channel_count(),
            fixture.universe(),
            fixture.start_address()
        );

        self.fixtures.insert(id, fixture);
        Ok(id)
    }

    /// Remove a placement
    pub fn remove(&mut self, id: FixtureId) -> Option<FixtureInstance> {
        self.fixtures.remove(&id)
    }

    /// Get a placed fixture
    pub fn get(&self, id: FixtureId) -> Option<&FixtureInstance> {
        self.fixtures.get(&id)
    }

    fn fixture(&self, id: FixtureId) -> Result<&FixtureInstance> {
        self.get(id).ok_or(CoreError::UnknownFixture(id))
    }

    /// Resolve a 0-based logical channel index to `(universe, offset)`
    pub fn resolve(&self, id: FixtureId, index: usize) -> Result<(PortAddress, usize)> {
        let fixture = self.fixture(id)?;
        Ok((fixture.universe(), fixture.resolve(index)?))
    }

    /// Resolve a channel role name to `(universe, offset)`
    pub fn resolve_role(&self, id: FixtureId, role: &str) -> Result<(PortAddress, usize)> {
        let fixture = self.fixture(id)?;
        Ok((fixture.universe(), fixture.resolve_role(role)?))
    }

    /// Write a logical channel of a placed fixture
    pub fn write(
        &self,
        universes: &Universes,
        id: FixtureId,
        index: usize,
        value: u8,
    ) -> Result<()> {
        let (universe, offset) = self.resolve(id, index)?;
        let (buffer, _) = universes.get_or_create(universe);
        buffer.set(offset, value)
    }

    /// Write a channel of a placed fixture by role name
    pub fn write_role(
        &self,
        universes: &Universes,
        id: FixtureId,
        role: &str,
        value: u8,
    ) -> Result<()> {
        let (universe, offset) = self.resolve_role(id, role)?;
        let (buffer, _) = universes.get_or_create(universe);
        buffer.set(offset, value)
    }

    /// Fixtures patched in a universe
    pub fn fixtures_in(&self, universe: PortAddress) -> Vec<(FixtureId, &FixtureInstance)> {
        self.fixtures
            .iter()
            .filter(|(_, fixture)| fixture.universe() == universe)
            .map(|(&id, fixture)| (id, fixture))
            .collect()
    }

    /// All universes that have fixtures
    pub fn universes(&self) -> Vec<PortAddress> {
        let mut universes: Vec<PortAddress> = self
            .fixtures
            .values()
            .map(|fixture| fixture.universe())
            .collect();
        universes.sort_unstable();
        universes.dedup();
        universes
    }

    /// Iterate over all placements
    pub fn iter(&self) -> impl Iterator<Item = (FixtureId, &FixtureInstance)> {
        self.fixtures.iter().map(|(&id, fixture)| (id, fixture))
    }

    /// Number of placed fixtures
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Check if nothing is placed
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
