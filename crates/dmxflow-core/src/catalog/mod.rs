//! Fixture catalog
//!
//! Immutable fixture definitions, keyed by manufacturer and model, plus
//! their JSON persistence and QLC+ `.qxf` import. The engine only consumes
//! mode channel counts and role names; everything else is carried for
//! catalog consumers.

mod definition;
mod kinds;
mod legacy;
mod qxf;

pub use definition::{
    Bulb, Capability, ChannelDefinition, Dimensions, FixtureDefinition, Focus, Lens, Mode,
    ModeChannel, Physical, Technical,
};
pub use kinds::{CapabilityColor, ChannelGroup, LampType};
pub use qxf::{parse_qxf, read_qxf};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Result;

/// Set of loaded fixture definitions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FixtureCatalog {
    definitions: Vec<Arc<FixtureDefinition>>,
}

impl FixtureCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, replacing one with the same manufacturer and model.
    pub fn insert(&mut self, definition: FixtureDefinition) -> Arc<FixtureDefinition> {
        let definition = Arc::new(definition);
        match self.position(&definition.manufacturer, &definition.model) {
            Some(index) => self.definitions[index] = definition.clone(),
            None => self.definitions.push(definition.clone()),
        }
        definition
    }

    /// Look up a definition (case-insensitive)
    pub fn get(&self, manufacturer: &str, model: &str) -> Option<Arc<FixtureDefinition>> {
        self.position(manufacturer, model)
            .map(|index| self.definitions[index].clone())
    }

    /// All definitions in insertion order
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<FixtureDefinition>> {
        self.definitions.iter()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn position(&self, manufacturer: &str, model: &str) -> Option<usize> {
        self.definitions.iter().position(|definition| {
            definition.manufacturer.eq_ignore_ascii_case(manufacturer)
                && definition.model.eq_ignore_ascii_case(model)
        })
    }

    /// Load every `*.json` definition in a directory.
    ///
    /// Files that fail to parse are skipped with a warning; an unreadable
    /// directory is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut catalog = Self::new();

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            match read_definition(&path) {
                Ok(definition) => {
                    debug!(
                        "Loaded fixture {} {} from {:?}",
                        definition.manufacturer, definition.model, path
                    );
                    catalog.insert(definition);
                }
                Err(e) => warn!("Skipping fixture definition {:?}: {}", path, e),
            }
        }

        info!("Loaded {} fixture definitions from {:?}", catalog.len(), dir);
        Ok(catalog)
    }

    /// Write every definition into `dir` as `<manufacturer>-<model>.json`.
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        for definition in &self.definitions {
            save_definition(&dir, definition)?;
        }
        Ok(())
    }
}

/// Read one definition from a JSON file.
pub fn read_definition(path: impl AsRef<Path>) -> Result<FixtureDefinition> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write one definition as pretty-printed JSON, replacing the file.
pub fn write_definition(path: impl AsRef<Path>, definition: &FixtureDefinition) -> Result<()> {
    let content = serde_json::to_string_pretty(definition)?;
    fs::write(path, content)?;
    Ok(())
}

/// Write one definition into a catalog directory, creating it if needed.
///
/// Returns the path of the written file.
pub fn save_definition(dir: impl AsRef<Path>, definition: &FixtureDefinition) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(definition));
    write_definition(&path, definition)?;
    Ok(path)
}

/// Catalog file name of a definition, `<manufacturer>-<model>.json`
pub fn file_name(definition: &FixtureDefinition) -> String {
    let slug: String = format!("{}-{}", definition.manufacturer, definition.model)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}.json", slug)
}
