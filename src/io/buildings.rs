//! Building geometry and attribute tables joined on the building name.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::ScenarioPaths;
use crate::error::{LogisticsError, Result};
use crate::io::table::LabeledTable;
use crate::usage::UsageCategory;

const NAME: &str = "Name";
const FOOTPRINT: &str = "footprint_area_m2";
const USAGE: &str = "1ST_USE";
const FLOORS: &str = "floors_ag";

/// A building with its gross above-ground floor area and primary usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub name: String,
    /// Footprint area times above-ground floor count.
    pub floor_area: f64,
    pub usage: UsageCategory,
}

/// Outcome of joining the geometry and attribute tables.
///
/// Every building of the geometry table ends up in exactly one of the two lists.
#[derive(Debug, Default)]
pub struct BuildingJoin {
    pub buildings: Vec<Building>,
    pub unresolved: Vec<(String, LogisticsError)>,
}

impl BuildingJoin {
    /// Reads the zone, typology and architecture tables of a scenario and joins them.
    ///
    /// # Errors
    ///
    /// Fails only if one of the three tables cannot be loaded at all. A
    /// building missing from typology or architecture is listed in
    /// [`BuildingJoin::unresolved`] instead.
    pub fn load(paths: &ScenarioPaths) -> Result<Self> {
        let zone = LabeledTable::read(&paths.zone(), NAME)?;
        let typology = LabeledTable::read(&paths.typology(), NAME)?;
        let architecture = LabeledTable::read(&paths.architecture(), NAME)?;
        Ok(Self::join(&zone, &typology, &architecture))
    }

    /// Joins already-loaded tables, in zone-table order.
    ///
    /// A name repeated in the zone table keeps its first row; every later
    /// copy is unresolved, so no two jobs share a demand file.
    pub fn join(zone: &LabeledTable, typology: &LabeledTable, architecture: &LabeledTable) -> Self {
        let mut out = Self::default();
        let mut seen = BTreeSet::new();
        for name in zone.labels() {
            if !seen.insert(name) {
                let err = LogisticsError::IndexMismatch(format!(
                    "building {name} is listed more than once in \"{}\"",
                    zone.path().display()
                ));
                warn!(building = name, error = %err, "duplicate building name");
                out.unresolved.push((name.to_string(), err));
                continue;
            }
            match resolve_building(name, zone, typology, architecture) {
                Ok(building) => {
                    debug!(
                        building = %building.name,
                        usage = %building.usage,
                        floor_area = building.floor_area,
                        "resolved building"
                    );
                    out.buildings.push(building);
                }
                Err(err) => {
                    warn!(building = name, error = %err, "cannot resolve building attributes");
                    out.unresolved.push((name.to_string(), err));
                }
            }
        }
        out
    }
}

fn resolve_building(
    name: &str,
    zone: &LabeledTable,
    typology: &LabeledTable,
    architecture: &LabeledTable,
) -> Result<Building> {
    let footprint = zone.value(name, FOOTPRINT)?;
    let floors = architecture.value(name, FLOORS)?;
    let usage = UsageCategory::new(typology.text(name, USAGE)?);

    if !footprint.is_finite() || footprint < 0.0 || !floors.is_finite() || floors < 0.0 {
        return Err(LogisticsError::Configuration(format!(
            "building {name} has footprint {footprint} m2 and {floors} floors; both must be non-negative"
        )));
    }

    Ok(Building {
        name: name.to_string(),
        floor_area: footprint * floors,
        usage,
    })
}
