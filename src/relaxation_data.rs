// Electron-photon relaxation data container read from JSON
use crate::error::{CollisionError, Result};
use crate::reaction_type::Subshell;
use crate::utilities::{is_sorted_ascending, is_strictly_ascending};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// Global cache so every factory sharing a data file sees the same tables
static RELAXATION_DATA_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<ElectronPhotonRelaxationData>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A tabulated cross section and the grid index at which it starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCrossSection {
    pub cross_section: Vec<f64>,
    #[serde(default)]
    pub threshold_index: usize,
}

impl ThresholdCrossSection {
    pub fn new(cross_section: Vec<f64>, threshold_index: usize) -> Self {
        ThresholdCrossSection {
            cross_section,
            threshold_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cross_section.is_empty()
    }

    /// Value at grid point `index` (zero below the threshold).
    pub fn value_at_grid_index(&self, index: usize) -> f64 {
        if index < self.threshold_index {
            return 0.0;
        }
        self.cross_section
            .get(index - self.threshold_index)
            .copied()
            .unwrap_or(0.0)
    }

    fn validate(&self, name: &str, grid_len: usize) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if self.threshold_index + self.cross_section.len() > grid_len {
            return Err(CollisionError::InvalidCrossSection(format!(
                "{}: {} values from threshold index {} overrun a grid of {} points",
                name,
                self.cross_section.len(),
                self.threshold_index,
                grid_len
            )));
        }
        if let Some(bad) = self.cross_section.iter().find(|v| !(**v >= 0.0) || !v.is_finite()) {
            return Err(CollisionError::InvalidCrossSection(format!(
                "{}: values must be finite and non-negative, found {}",
                name, bad
            )));
        }
        Ok(())
    }
}

/// A tabulated 1D table `(grid, values)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub grid: Vec<f64>,
    pub values: Vec<f64>,
}

impl Table {
    pub fn new(grid: Vec<f64>, values: Vec<f64>) -> Self {
        Table { grid, values }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.is_empty() && self.values.is_empty() {
            return Ok(());
        }
        if self.grid.len() != self.values.len() || self.grid.len() < 2 {
            return Err(CollisionError::MissingData(format!(
                "{}: table needs at least 2 matching points ({} grid, {} values)",
                name,
                self.grid.len(),
                self.values.len()
            )));
        }
        if !is_sorted_ascending(&self.grid) {
            return Err(CollisionError::InvalidGrid(format!("{}: grid must be ascending", name)));
        }
        Ok(())
    }
}

/// Secondary energy tables, one per incoming energy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyLossTables {
    pub energy_grid: Vec<f64>,
    pub secondary_energies: Vec<Vec<f64>>,
    pub pdf: Vec<Vec<f64>>,
}

impl EnergyLossTables {
    pub fn new(energy_grid: Vec<f64>, secondary_energies: Vec<Vec<f64>>, pdf: Vec<Vec<f64>>) -> Self {
        EnergyLossTables {
            energy_grid,
            secondary_energies,
            pdf,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.energy_grid.is_empty()
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if !is_strictly_ascending(&self.energy_grid) {
            return Err(CollisionError::InvalidGrid(format!(
                "{}: incoming energies must be strictly ascending",
                name
            )));
        }
        let n = self.energy_grid.len();
        if self.secondary_energies.len() != n || self.pdf.len() != n {
            return Err(CollisionError::MissingData(format!(
                "{}: {} energy tables and {} PDF tables for {} incoming energies",
                name,
                self.secondary_energies.len(),
                self.pdf.len(),
                n
            )));
        }
        for (i, (energies, pdf)) in self.secondary_energies.iter().zip(&self.pdf).enumerate() {
            if energies.len() != pdf.len() || energies.len() < 2 || !is_sorted_ascending(energies) {
                return Err(CollisionError::InvalidDistribution(format!(
                    "{}: table {} must hold at least 2 sorted energies with matching PDF values",
                    name, i
                )));
            }
        }
        Ok(())
    }
}

/// Electro-ionization data for one subshell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectroionizationSubshellData {
    pub subshell: Subshell,
    pub binding_energy: f64,
    pub cross_section: ThresholdCrossSection,
    /// Knock-on electron energy tables
    pub knock_on: EnergyLossTables,
}

/// Impulse approximation incoherent data for one subshell. The occupation
/// number is tabulated against the electron momentum projection in units of
/// `m_e c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointIncoherentSubshellData {
    pub subshell: Subshell,
    pub binding_energy: f64,
    pub cross_section: ThresholdCrossSection,
    pub occupation_number: Table,
}

fn check_subshell(name: &str, subshell: Subshell, binding_energy: f64) -> Result<()> {
    if !subshell.is_physical() {
        return Err(CollisionError::UnmappedSubshell(format!("{} ({})", subshell, name)));
    }
    if !(binding_energy >= 0.0) || !binding_energy.is_finite() {
        return Err(CollisionError::InvalidDistribution(format!(
            "{} {}: binding energy must be finite and non-negative, got {}",
            name, subshell, binding_energy
        )));
    }
    Ok(())
}

/// Atomic data for electron, positron and adjoint photon collisions.
///
/// Per-energy elastic tables are stored as vectors indexed like
/// `elastic_angular_energy_grid`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectronPhotonRelaxationData {
    pub atomic_number: u32,

    pub electron_energy_grid: Vec<f64>,
    #[serde(default)]
    pub cutoff_elastic_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub screened_rutherford_elastic_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub total_elastic_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub atomic_excitation_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub positron_annihilation_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub atomic_excitation_energy_loss: Table,
    #[serde(default)]
    pub electroionization_subshells: Vec<ElectroionizationSubshellData>,
    #[serde(default)]
    pub bremsstrahlung_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub bremsstrahlung_photon_energy: EnergyLossTables,

    #[serde(default = "default_cutoff_angle_cosine")]
    pub cutoff_angle_cosine: f64,
    #[serde(default)]
    pub elastic_angular_energy_grid: Vec<f64>,
    #[serde(default)]
    pub cutoff_elastic_angles: Vec<Vec<f64>>,
    #[serde(default)]
    pub cutoff_elastic_pdf: Vec<Vec<f64>>,
    #[serde(default)]
    pub moment_preserving_discrete_angles: Vec<Vec<f64>>,
    #[serde(default)]
    pub moment_preserving_weights: Vec<Vec<f64>>,
    #[serde(default)]
    pub moment_preserving_cross_section_reductions: Vec<f64>,

    #[serde(default)]
    pub adjoint_photon_energy_grid: Vec<f64>,
    #[serde(default)]
    pub adjoint_coherent_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub forward_total_cross_section: ThresholdCrossSection,
    /// Squared atomic form factor against squared momentum transfer (cm^-2)
    #[serde(default)]
    pub adjoint_coherent_form_factor_squared: Table,
    /// Free electron (Klein-Nishina) incoherent cross section
    #[serde(default)]
    pub adjoint_incoherent_cross_section: ThresholdCrossSection,
    #[serde(default)]
    pub adjoint_incoherent_subshells: Vec<AdjointIncoherentSubshellData>,
    #[serde(default)]
    pub adjoint_pair_production_energy_distribution: Table,
    #[serde(default)]
    pub adjoint_pair_production_norm_constant: Table,
    #[serde(default)]
    pub adjoint_triplet_production_energy_distribution: Table,
    #[serde(default)]
    pub adjoint_triplet_production_norm_constant: Table,
}

fn default_cutoff_angle_cosine() -> f64 {
    1.0
}

impl ElectronPhotonRelaxationData {
    /// Read and validate a JSON data file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let data: ElectronPhotonRelaxationData = serde_json::from_str(&text)?;
        data.validate()?;
        Ok(data)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check that every table is consistent with the grid it lives on.
    pub fn validate(&self) -> Result<()> {
        check_grid("electron energy grid", &self.electron_energy_grid)?;
        let n = self.electron_energy_grid.len();
        self.cutoff_elastic_cross_section.validate("cutoff elastic", n)?;
        self.screened_rutherford_elastic_cross_section
            .validate("screened Rutherford elastic", n)?;
        self.total_elastic_cross_section.validate("total elastic", n)?;
        self.atomic_excitation_cross_section.validate("atomic excitation", n)?;
        self.positron_annihilation_cross_section.validate("positron annihilation", n)?;
        self.atomic_excitation_energy_loss.validate("atomic excitation energy loss")?;
        for shell in &self.electroionization_subshells {
            check_subshell("electro-ionization", shell.subshell, shell.binding_energy)?;
            shell.cross_section.validate("electro-ionization", n)?;
            shell.knock_on.validate("electro-ionization knock-on")?;
        }
        self.bremsstrahlung_cross_section.validate("bremsstrahlung", n)?;
        self.bremsstrahlung_photon_energy.validate("bremsstrahlung photon energy")?;

        if !(-1.0..=1.0).contains(&self.cutoff_angle_cosine) {
            return Err(CollisionError::InvalidDistribution(format!(
                "cutoff angle cosine must be in [-1, 1], got {}",
                self.cutoff_angle_cosine
            )));
        }
        self.validate_elastic_tables()?;

        if !self.adjoint_photon_energy_grid.is_empty() {
            check_grid("adjoint photon energy grid", &self.adjoint_photon_energy_grid)?;
        }
        let m = self.adjoint_photon_energy_grid.len();
        self.adjoint_coherent_cross_section.validate("adjoint coherent", m)?;
        self.forward_total_cross_section.validate("forward total", m)?;
        self.adjoint_coherent_form_factor_squared
            .validate("adjoint coherent form factor squared")?;
        self.adjoint_incoherent_cross_section.validate("adjoint incoherent", m)?;
        for shell in &self.adjoint_incoherent_subshells {
            check_subshell("adjoint incoherent", shell.subshell, shell.binding_energy)?;
            shell.cross_section.validate("adjoint subshell incoherent", m)?;
            shell.occupation_number.validate("adjoint occupation number")?;
        }
        self.adjoint_pair_production_energy_distribution
            .validate("adjoint pair production energy distribution")?;
        self.adjoint_pair_production_norm_constant
            .validate("adjoint pair production norm constant")?;
        self.adjoint_triplet_production_energy_distribution
            .validate("adjoint triplet production energy distribution")?;
        self.adjoint_triplet_production_norm_constant
            .validate("adjoint triplet production norm constant")?;
        Ok(())
    }

    fn validate_elastic_tables(&self) -> Result<()> {
        let n = self.elastic_angular_energy_grid.len();
        if n == 0 {
            return Ok(());
        }
        if !is_strictly_ascending(&self.elastic_angular_energy_grid) {
            return Err(CollisionError::InvalidGrid(
                "elastic angular energy grid must be strictly ascending".to_string(),
            ));
        }
        let per_energy = [
            ("cutoff elastic angles", self.cutoff_elastic_angles.len()),
            ("cutoff elastic PDF", self.cutoff_elastic_pdf.len()),
        ];
        for (name, len) in per_energy {
            if len != n {
                return Err(CollisionError::MissingData(format!(
                    "{} has {} tables for {} angular energies",
                    name, len, n
                )));
            }
        }
        for (i, (angles, pdf)) in self.cutoff_elastic_angles.iter().zip(&self.cutoff_elastic_pdf).enumerate() {
            if angles.len() != pdf.len() || angles.len() < 2 || !is_sorted_ascending(angles) {
                return Err(CollisionError::InvalidDistribution(format!(
                    "cutoff elastic table {} must hold at least 2 sorted angles with matching PDF values",
                    i
                )));
            }
        }
        if self.has_moment_preserving_data() {
            if self.moment_preserving_discrete_angles.len() != n
                || self.moment_preserving_weights.len() != n
                || self.moment_preserving_cross_section_reductions.len() != n
            {
                return Err(CollisionError::MissingData(format!(
                    "moment preserving data must have one entry per angular energy ({})",
                    n
                )));
            }
            for (i, (angles, weights)) in self
                .moment_preserving_discrete_angles
                .iter()
                .zip(&self.moment_preserving_weights)
                .enumerate()
            {
                if angles.is_empty() || angles.len() != weights.len() {
                    return Err(CollisionError::InvalidDistribution(format!(
                        "moment preserving table {} has {} angles and {} weights",
                        i,
                        angles.len(),
                        weights.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn has_moment_preserving_data(&self) -> bool {
        !self.moment_preserving_discrete_angles.is_empty()
    }

    pub fn has_elastic_angular_data(&self) -> bool {
        !self.elastic_angular_energy_grid.is_empty()
    }

    /// Electro-ionization data for `subshell`, if tabulated.
    pub fn electroionization_subshell(&self, subshell: Subshell) -> Option<&ElectroionizationSubshellData> {
        self.electroionization_subshells.iter().find(|s| s.subshell == subshell)
    }

    pub fn adjoint_incoherent_subshell(&self, subshell: Subshell) -> Option<&AdjointIncoherentSubshellData> {
        self.adjoint_incoherent_subshells.iter().find(|s| s.subshell == subshell)
    }

    pub fn has_adjoint_photon_data(&self) -> bool {
        !self.adjoint_photon_energy_grid.is_empty()
    }
}

fn check_grid(name: &str, grid: &[f64]) -> Result<()> {
    if grid.len() < 2 {
        return Err(CollisionError::InvalidGrid(format!(
            "{} needs at least 2 points, found {}",
            name,
            grid.len()
        )));
    }
    if !is_strictly_ascending(grid) {
        return Err(CollisionError::InvalidGrid(format!("{} must be strictly ascending", name)));
    }
    Ok(())
}

/// Load a data file once; later calls with the same path share the cached copy.
pub fn load_relaxation_data<P: AsRef<Path>>(path: P) -> Result<Arc<ElectronPhotonRelaxationData>> {
    let key = fs::canonicalize(path.as_ref()).unwrap_or_else(|_| path.as_ref().to_path_buf());
    {
        let cache = RELAXATION_DATA_CACHE.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(data) = cache.get(&key) {
            return Ok(Arc::clone(data));
        }
    }
    let data = Arc::new(ElectronPhotonRelaxationData::from_json_file(&key)?);
    tracing::debug!(path = %key.display(), atomic_number = data.atomic_number, "loaded relaxation data");
    let mut cache = RELAXATION_DATA_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    Ok(Arc::clone(cache.entry(key).or_insert(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn minimal() -> ElectronPhotonRelaxationData {
        ElectronPhotonRelaxationData {
            atomic_number: 1,
            electron_energy_grid: vec![1e-5, 1e-3, 1e-1, 1e1],
            cutoff_elastic_cross_section: ThresholdCrossSection::new(vec![4.0, 3.0, 2.0, 1.0], 0),
            atomic_excitation_cross_section: ThresholdCrossSection::new(vec![1.0, 2.0], 2),
            cutoff_angle_cosine: 1.0,
            elastic_angular_energy_grid: vec![1e-5, 1e1],
            cutoff_elastic_angles: vec![vec![-1.0, 0.999999]; 2],
            cutoff_elastic_pdf: vec![vec![0.5, 0.5]; 2],
            ..Default::default()
        }
    }

    #[test]
    fn test_threshold_lookup() {
        let cs = ThresholdCrossSection::new(vec![1.0, 2.0], 2);
        assert_eq!(cs.value_at_grid_index(1), 0.0);
        assert_eq!(cs.value_at_grid_index(3), 2.0);
        assert_eq!(cs.value_at_grid_index(7), 0.0);
    }

    #[test]
    fn test_validate_catches_overrun() {
        let mut data = minimal();
        assert!(data.validate().is_ok());
        data.atomic_excitation_cross_section.threshold_index = 3;
        assert!(matches!(data.validate(), Err(CollisionError::InvalidCrossSection(_))));
    }

    #[test]
    fn test_validate_catches_missing_tables() {
        let mut data = minimal();
        data.cutoff_elastic_pdf.pop();
        assert!(matches!(data.validate(), Err(CollisionError::MissingData(_))));

        let mut data = minimal();
        data.electron_energy_grid = vec![1.0, 1.0, 2.0, 3.0];
        assert!(matches!(data.validate(), Err(CollisionError::InvalidGrid(_))));
    }

    #[test]
    fn test_validate_subshell_tables() {
        let mut data = minimal();
        data.electroionization_subshells.push(ElectroionizationSubshellData {
            subshell: Subshell::K,
            binding_energy: 1.5e-3,
            cross_section: ThresholdCrossSection::new(vec![1.0, 2.0], 2),
            knock_on: EnergyLossTables::new(
                vec![1e-1, 1e1],
                vec![vec![1e-6, 4e-2], vec![1e-6, 5.0]],
                vec![vec![2.0, 1.0], vec![2.0, 1.0]],
            ),
        });
        assert!(data.validate().is_ok());
        assert!(data.electroionization_subshell(Subshell::K).is_some());
        assert!(data.electroionization_subshell(Subshell::L1).is_none());

        data.electroionization_subshells[0].knock_on.pdf.pop();
        assert!(matches!(data.validate(), Err(CollisionError::MissingData(_))));

        let mut data = minimal();
        data.electroionization_subshells.push(ElectroionizationSubshellData {
            subshell: Subshell::Invalid,
            binding_energy: 1.0,
            cross_section: ThresholdCrossSection::default(),
            knock_on: EnergyLossTables::default(),
        });
        assert!(matches!(data.validate(), Err(CollisionError::UnmappedSubshell(_))));

        let mut data = minimal();
        data.adjoint_photon_energy_grid = vec![1e-3, 1.0];
        data.adjoint_incoherent_subshells.push(AdjointIncoherentSubshellData {
            subshell: Subshell::K,
            binding_energy: -1.0,
            cross_section: ThresholdCrossSection::new(vec![1.0], 1),
            occupation_number: Table::new(vec![-1.0, 1.0], vec![0.0, 1.0]),
        });
        assert!(matches!(data.validate(), Err(CollisionError::InvalidDistribution(_))));
    }

    #[test]
    fn test_json_file_round_trip_and_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.json");
        minimal().to_json_file(&path).unwrap();

        let loaded = ElectronPhotonRelaxationData::from_json_file(&path).unwrap();
        assert_eq!(loaded.atomic_number, 1);
        assert_eq!(loaded.cutoff_elastic_cross_section.cross_section, vec![4.0, 3.0, 2.0, 1.0]);

        let first = load_relaxation_data(&path).unwrap();
        let second = load_relaxation_data(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("minimal.json");
        fs::write(&path, r#"{"atomic_number": 6, "electron_energy_grid": [1e-3, 1.0]}"#).unwrap();
        let data = ElectronPhotonRelaxationData::from_json_file(&path).unwrap();
        assert_eq!(data.cutoff_angle_cosine, 1.0);
        assert!(!data.has_elastic_angular_data());
        assert!(data.total_elastic_cross_section.is_empty());
    }
}
