// Global configuration for electron collision physics
use crate::elastic_bivariate::TwoDGridPolicy;
use crate::elastic_scattering::CoupledElasticSamplingMethod;
use crate::error::{CollisionError, Result};
use crate::interpolation::TwoDInterpolation;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

// Global configuration for electron properties and data file paths
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Which elastic model an electroatom uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElasticElectronDistributionType {
    Coupled,
    Decoupled,
    Hybrid,
    Cutoff,
    ScreenedRutherford,
}

const DISTRIBUTION_TYPE_NAMES: [(ElasticElectronDistributionType, &str); 5] = [
    (ElasticElectronDistributionType::Coupled, "Coupled"),
    (ElasticElectronDistributionType::Decoupled, "Decoupled"),
    (ElasticElectronDistributionType::Hybrid, "Hybrid"),
    (ElasticElectronDistributionType::Cutoff, "Cutoff"),
    (ElasticElectronDistributionType::ScreenedRutherford, "Screened Rutherford"),
];

impl fmt::Display for ElasticElectronDistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = DISTRIBUTION_TYPE_NAMES
            .iter()
            .find(|(mode, _)| mode == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown");
        write!(f, "{}", name)
    }
}

impl FromStr for ElasticElectronDistributionType {
    type Err = CollisionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let squashed: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        DISTRIBUTION_TYPE_NAMES
            .iter()
            .find(|(_, name)| name.replace(' ', "").eq_ignore_ascii_case(&squashed))
            .map(|(mode, _)| *mode)
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "elastic electron distribution",
                name: s.to_string(),
            })
    }
}

/// Electron physics settings used by the reaction factories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectronProperties {
    pub elastic_distribution_mode: ElasticElectronDistributionType,
    pub coupled_elastic_sampling_method: CoupledElasticSamplingMethod,
    pub two_d_interpolation: TwoDInterpolation,
    pub two_d_grid_policy: TwoDGridPolicy,
    pub elastic_cutoff_angle_cosine: f64,
    pub evaluation_tolerance: f64,
    /// Atomic relaxation and secondary photon generation
    pub atomic_relaxation: bool,
}

impl Default for ElectronProperties {
    fn default() -> Self {
        ElectronProperties {
            elastic_distribution_mode: ElasticElectronDistributionType::Decoupled,
            coupled_elastic_sampling_method: CoupledElasticSamplingMethod::ModifiedTwoDUnion,
            two_d_interpolation: TwoDInterpolation::LogLogLog,
            two_d_grid_policy: TwoDGridPolicy::UnitBaseCorrelated,
            elastic_cutoff_angle_cosine: 1.0,
            evaluation_tolerance: 1e-7,
            atomic_relaxation: true,
        }
    }
}

impl ElectronProperties {
    pub fn validate(&self) -> Result<()> {
        validate_cutoff_angle_cosine(self.elastic_cutoff_angle_cosine)?;
        validate_evaluation_tolerance(self.evaluation_tolerance)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let properties: ElectronProperties = serde_json::from_str(&text)?;
        properties.validate()?;
        Ok(properties)
    }
}

fn validate_cutoff_angle_cosine(value: f64) -> Result<()> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(CollisionError::OutOfRange {
            value,
            min: -1.0,
            max: 1.0,
        });
    }
    Ok(())
}

fn validate_evaluation_tolerance(value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(CollisionError::OutOfRange {
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

/// Global configuration container.
///
/// Holds the electron physics settings and a mapping from element names
/// (e.g. "Pb") to the JSON relaxation data file for that element. A single
/// global instance is exposed via the `CONFIG` static; most code should go
/// through [`Config::global`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub electron: ElectronProperties,
    /// Map of element name -> path to its JSON relaxation data file.
    pub relaxation_data: HashMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn electron_properties(&self) -> &ElectronProperties {
        &self.electron
    }

    pub fn set_electron_properties(&mut self, properties: ElectronProperties) -> Result<()> {
        properties.validate()?;
        self.electron = properties;
        Ok(())
    }

    pub fn load_electron_properties<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.electron = ElectronProperties::from_json_file(path)?;
        Ok(())
    }

    pub fn set_elastic_distribution_mode(&mut self, name: &str) -> Result<()> {
        self.electron.elastic_distribution_mode = name.parse()?;
        Ok(())
    }

    pub fn set_coupled_elastic_sampling_method(&mut self, name: &str) -> Result<()> {
        self.electron.coupled_elastic_sampling_method = name.parse()?;
        Ok(())
    }

    pub fn set_two_d_interpolation(&mut self, name: &str) -> Result<()> {
        self.electron.two_d_interpolation = name.parse()?;
        Ok(())
    }

    pub fn set_two_d_grid_policy(&mut self, name: &str) -> Result<()> {
        self.electron.two_d_grid_policy = name.parse()?;
        Ok(())
    }

    pub fn set_elastic_cutoff_angle_cosine(&mut self, value: f64) -> Result<()> {
        validate_cutoff_angle_cosine(value)?;
        self.electron.elastic_cutoff_angle_cosine = value;
        Ok(())
    }

    pub fn set_evaluation_tolerance(&mut self, value: f64) -> Result<()> {
        validate_evaluation_tolerance(value)?;
        self.electron.evaluation_tolerance = value;
        Ok(())
    }

    pub fn set_atomic_relaxation(&mut self, on: bool) {
        self.electron.atomic_relaxation = on;
    }

    /// Set the relaxation data file for an element.
    pub fn set_relaxation_data(&mut self, element: &str, path: &str) {
        self.relaxation_data.insert(element.to_string(), path.to_string());
    }

    pub fn set_relaxation_data_paths(&mut self, paths: HashMap<String, String>) {
        self.relaxation_data.extend(paths);
    }

    pub fn get_relaxation_data(&self, element: &str) -> Option<String> {
        self.relaxation_data.get(element).cloned()
    }

    /// Restore the default electron properties.
    pub fn reset(&mut self) {
        self.electron = ElectronProperties::default();
    }

    /// Restore the defaults and forget every data path.
    pub fn clear(&mut self) {
        self.reset();
        self.relaxation_data.clear();
    }
}
