//! TOML-based run configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the standard scenario layout. Load from
/// TOML with [`LogisticsConfig::from_toml_file`] or use
/// [`LogisticsConfig::standard`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticsConfig {
    /// Input and output locations relative to the scenario root.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Usage occupancy file format.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Forklift battery parameters.
    #[serde(default)]
    pub forklift: ForkliftConfig,
    /// Worker pool settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Demand series column names.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// Input and output locations, each relative to the scenario root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Building footprints (`Name`, `footprint_area_m2`).
    pub zone: PathBuf,
    /// Building usage (`Name`, `1ST_USE`).
    pub typology: PathBuf,
    /// Building floors (`Name`, `floors_ag`).
    pub architecture: PathBuf,
    /// Directory holding one `{USAGE}.csv` occupancy file per usage.
    pub use_types_dir: PathBuf,
    /// Per-usage cargo tonnage and forklift capacity.
    pub internal_loads: PathBuf,
    /// Shipment counts per direction and distance tier.
    pub destination: PathBuf,
    /// Shipped weight per direction and truck-capacity class.
    pub monthly_cargos: PathBuf,
    /// Distance per unit energy, per carrier and truck-capacity class.
    pub efficiency: PathBuf,
    /// Directory of per-building hourly demand series.
    pub demand_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            zone: "inputs/building-geometry/zone.csv".into(),
            typology: "inputs/building-properties/typology.csv".into(),
            architecture: "inputs/building-properties/architecture.csv".into(),
            use_types_dir: "inputs/technology/archetypes/use_types".into(),
            internal_loads: "inputs/technology/archetypes/use_types/INTERNAL_LOADS.csv".into(),
            destination: "inputs/technology/logistics/destination.csv".into(),
            monthly_cargos: "inputs/technology/logistics/monthly_cargos.csv".into(),
            efficiency: "inputs/technology/logistics/efficiency.csv".into(),
            demand_dir: "outputs/data/demand".into(),
        }
    }
}

/// Usage occupancy file format.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Preamble lines before the CSV header row.
    pub metadata_rows: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { metadata_rows: 2 }
    }
}

/// Forklift battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForkliftConfig {
    /// Battery voltage (V).
    pub battery_voltage_v: f64,
    /// Battery capacity (Ah).
    pub battery_capacity_ah: f64,
}

impl ForkliftConfig {
    /// Energy of one full battery charge (kWh).
    pub fn charge_kwh(&self) -> f64 {
        self.battery_voltage_v * self.battery_capacity_ah / 1000.0
    }
}

impl Default for ForkliftConfig {
    fn default() -> Self {
        Self {
            battery_voltage_v: 48.0,
            battery_capacity_ah: 400.0,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Run buildings on a worker pool instead of one after another.
    pub parallel: bool,
    /// Pool size; defaults to available parallelism minus one.
    pub workers: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: None,
        }
    }
}

/// Demand series column names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    /// Timestamp column.
    pub date: String,
    /// Forklift energy column.
    pub forklift: String,
    /// Prefix of the per-carrier truck energy columns.
    pub truck_prefix: String,
}

impl ColumnsConfig {
    pub fn truck_column(&self, carrier: &str) -> String {
        format!("{}{carrier}", self.truck_prefix)
    }
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            date: "DATE".to_string(),
            forklift: "forklift".to_string(),
            truck_prefix: "truck_".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"forklift.battery_voltage_v"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Config paths resolved against one scenario root.
#[derive(Debug, Clone)]
pub struct ScenarioPaths {
    root: PathBuf,
    paths: PathsConfig,
}

impl ScenarioPaths {
    pub fn new(root: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        Self {
            root: root.into(),
            paths: paths.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn zone(&self) -> PathBuf {
        self.root.join(&self.paths.zone)
    }

    pub fn typology(&self) -> PathBuf {
        self.root.join(&self.paths.typology)
    }

    pub fn architecture(&self) -> PathBuf {
        self.root.join(&self.paths.architecture)
    }

    pub fn internal_loads(&self) -> PathBuf {
        self.root.join(&self.paths.internal_loads)
    }

    pub fn destination(&self) -> PathBuf {
        self.root.join(&self.paths.destination)
    }

    pub fn monthly_cargos(&self) -> PathBuf {
        self.root.join(&self.paths.monthly_cargos)
    }

    pub fn efficiency(&self) -> PathBuf {
        self.root.join(&self.paths.efficiency)
    }

    /// Occupancy file for one usage code.
    pub fn use_type(&self, usage: &str) -> PathBuf {
        self.root
            .join(&self.paths.use_types_dir)
            .join(format!("{usage}.csv"))
    }

    /// Hourly demand series for one building.
    pub fn demand(&self, building: &str) -> PathBuf {
        self.root
            .join(&self.paths.demand_dir)
            .join(format!("{building}.csv"))
    }
}

impl LogisticsConfig {
    /// Returns the standard configuration (CEA-style scenario layout).
    pub fn standard() -> Self {
        Self::default()
    }

    /// Returns the serial preset: the standard layout run one building at a time.
    pub fn serial() -> Self {
        Self {
            dispatch: DispatchConfig {
                parallel: false,
                workers: None,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["standard", "serial"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "standard" => Ok(Self::standard()),
            "serial" => Ok(Self::serial()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Resolves the configured paths against a scenario root.
    pub fn scenario_paths(&self, root: impl Into<PathBuf>) -> ScenarioPaths {
        ScenarioPaths::new(root, &self.paths)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let f = &self.forklift;
        if f.battery_voltage_v.is_nan() || f.battery_voltage_v <= 0.0 {
            errors.push(ConfigError {
                field: "forklift.battery_voltage_v".into(),
                message: "must be > 0".into(),
            });
        }
        if f.battery_capacity_ah.is_nan() || f.battery_capacity_ah <= 0.0 {
            errors.push(ConfigError {
                field: "forklift.battery_capacity_ah".into(),
                message: "must be > 0".into(),
            });
        }

        if self.dispatch.workers == Some(0) {
            errors.push(ConfigError {
                field: "dispatch.workers".into(),
                message: "must be > 0 when set".into(),
            });
        }

        let c = &self.columns;
        for (field, value) in [
            ("columns.date", &c.date),
            ("columns.forklift", &c.forklift),
            ("columns.truck_prefix", &c.truck_prefix),
        ] {
            if value.trim().is_empty() {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if c.forklift.starts_with(&c.truck_prefix) {
            errors.push(ConfigError {
                field: "columns.forklift".into(),
                message: "must not start with columns.truck_prefix".into(),
            });
        }

        errors
    }
}
