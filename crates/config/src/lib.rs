//! Configuration models and loaders for the EV route planner.
//!
//! Every record accepts both the descriptive field names used in scenario files and the short
//! keys of the legacy JSON parameter files (`drag_coeff`, `OCV`, `R_internal`, ...), so either can
//! be loaded without conversion.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Vehicle description parsed from scenario manifests or vehicle catalogs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct VehicleConfig {
    #[serde(default = "default_vehicle_name")]
    pub name: String,
    #[serde(alias = "mass")]
    pub mass_kg: f64,
    #[serde(alias = "frontal_area")]
    pub frontal_area_m2: f64,
    #[serde(alias = "drag_coeff")]
    pub drag_coefficient: f64,
    #[serde(alias = "roll_res")]
    pub rolling_resistance: f64,
    #[serde(alias = "max_speed")]
    pub max_speed_m_s: f64,
    #[serde(alias = "motor_eff")]
    pub motor_efficiency: f64,
    #[serde(default, alias = "max_motor_power")]
    pub max_motor_power_w: Option<f64>,
}

fn default_vehicle_name() -> String {
    "vehicle".to_string()
}

/// Ambient conditions; defaults to sea-level air and standard gravity.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct EnvironmentConfig {
    #[serde(default = "default_air_density", alias = "air_dens")]
    pub air_density_kg_m3: f64,
    #[serde(default = "default_gravity", alias = "grav_acc")]
    pub gravity_m_s2: f64,
}

fn default_air_density() -> f64 {
    1.225
}

fn default_gravity() -> f64 {
    9.81
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            air_density_kg_m3: default_air_density(),
            gravity_m_s2: default_gravity(),
        }
    }
}

/// Equivalent-circuit battery parameters.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BatteryConfig {
    #[serde(alias = "OCV", alias = "ocv")]
    pub ocv_v: f64,
    #[serde(alias = "R_internal", alias = "internal_resistance")]
    pub internal_resistance_ohm: f64,
    #[serde(alias = "Capacity", alias = "capacity")]
    pub capacity_ah: f64,
}

/// Coefficients of the path routing cost.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WeightConfig {
    pub incline_weight: f64,
    pub max_incline_weight: f64,
    pub distance_weight: f64,
    pub zero_start_weight: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            incline_weight: 1.0,
            max_incline_weight: 1.0,
            distance_weight: 1.0,
            zero_start_weight: 1.0,
        }
    }
}

/// Knobs for a route simulation run.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cruise speed override; the vehicle's maximum speed is used when absent.
    pub target_velocity_m_s: Option<f64>,
    /// Split sections longer than this before simulating.
    pub max_section_length_m: Option<f64>,
    pub degradation_k: f64,
    pub degradation_n: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            target_velocity_m_s: None,
            max_section_length_m: None,
            degradation_k: 0.200,
            degradation_n: 0.2286,
        }
    }
}

/// Everything a simulation needs, in one manifest.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub vehicle: VehicleConfig,
    #[serde(default, alias = "static")]
    pub environment: EnvironmentConfig,
    pub battery: BatteryConfig,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no configuration records found in {0}")]
    Empty(PathBuf),
}

/// Load a complete scenario manifest (TOML, YAML or JSON by extension).
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    load_record(path)
}

/// Load vehicle configurations from a file or a directory of TOML files.
pub fn load_vehicle_configs<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleConfig>, ConfigError> {
    load_records(path)
}

/// Load a single vehicle parameter file.
pub fn load_vehicle<P: AsRef<Path>>(path: P) -> Result<VehicleConfig, ConfigError> {
    load_record(path)
}

/// Load a single environment parameter file.
pub fn load_environment<P: AsRef<Path>>(path: P) -> Result<EnvironmentConfig, ConfigError> {
    load_record(path)
}

/// Load a single battery parameter file.
pub fn load_battery<P: AsRef<Path>>(path: P) -> Result<BatteryConfig, ConfigError> {
    load_record(path)
}

#[derive(Clone, Copy)]
enum Format {
    Toml,
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Format {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Format::Toml,
        Some("json") => Format::Json,
        _ => Format::Yaml,
    }
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match format_of(path) {
        Format::Toml => {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        }
        Format::Json => Ok(serde_json::from_reader(File::open(path)?)?),
        Format::Yaml => Ok(serde_yaml::from_reader(File::open(path)?)?),
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let records = if path.is_dir() {
        read_dir_records(path)?
    } else {
        match format_of(path) {
            Format::Toml => vec![load_record(path)?],
            Format::Json => {
                let value: serde_json::Value = serde_json::from_reader(File::open(path)?)?;
                if value.is_array() {
                    serde_json::from_value(value)?
                } else {
                    vec![serde_json::from_value(value)?]
                }
            }
            Format::Yaml => serde_yaml::from_reader(File::open(path)?)?,
        }
    };
    if records.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }
    Ok(records)
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    entries.iter().map(load_record).collect()
}
