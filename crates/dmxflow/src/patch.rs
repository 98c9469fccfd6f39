//! Startup catalog loading, QLC+ import and fixture placement

use anyhow::{anyhow, Context, Result};
use dmxflow_control::{Engine, Transport};
use dmxflow_core::catalog::{read_qxf, save_definition};
use dmxflow_core::{FixtureCatalog, FixtureDefinition, FixtureInstance};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::FixturePlacement;

/// Convert QLC+ `.qxf` files into JSON definitions inside the catalog
/// directory. Returns the written paths.
pub fn import_qxf(files: &[PathBuf], directory: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let definition =
            read_qxf(file).with_context(|| format!("Failed to import {:?}", file))?;
        let path = save_definition(directory, &definition).with_context(|| {
            format!(
                "Failed to write {} {}",
                definition.manufacturer, definition.model
            )
        })?;
        info!(
            "Imported {} {} ({} modes) from {:?} to {:?}",
            definition.manufacturer,
            definition.model,
            definition.modes.len(),
            file,
            path
        );
        written.push(path);
    }
    Ok(written)
}

/// Built-in generic definitions, overridden by catalog files with the same
/// manufacturer and model.
pub fn load_catalog(directory: &Path) -> Result<FixtureCatalog> {
    let mut catalog = FixtureCatalog::new();
    catalog.insert(FixtureDefinition::generic_dimmer());
    catalog.insert(FixtureDefinition::rgb_par());

    if !directory.exists() {
        warn!(
            "Fixture catalog directory {:?} does not exist, using built-in definitions only",
            directory
        );
        return Ok(catalog);
    }

    let loaded = FixtureCatalog::load_dir(directory)
        .with_context(|| format!("Failed to load fixture catalog from {:?}", directory))?;
    for definition in loaded.definitions() {
        catalog.insert(definition.as_ref().clone());
    }

    Ok(catalog)
}

/// Place every configured fixture. Stops at the first placement that fails.
pub fn place_fixtures<T: Transport>(
    engine: &Engine<T>,
    catalog: &FixtureCatalog,
    placements: &[FixturePlacement],
) -> Result<usize> {
    for placement in placements {
        let definition = catalog
            .get(&placement.manufacturer, &placement.model)
            .ok_or_else(|| {
                anyhow!(
                    "Fixture '{}': {} {} is not in the catalog",
                    placement.name,
                    placement.manufacturer,
                    placement.model
                )
            })?;

        let fixture = FixtureInstance::new(
            placement.name.clone(),
            definition,
            &placement.mode,
            placement.universe,
            placement.address,
        )
        .with_context(|| format!("Fixture '{}'", placement.name))?;

        engine
            .place_fixture(fixture)
            .with_context(|| format!("Fixture '{}'", placement.name))?;
    }

    info!("Placed {} fixtures", placements.len());
    Ok(placements.len())
}
