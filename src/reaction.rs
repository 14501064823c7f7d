use crate::bank::ParticleBank;
use crate::error::{CollisionError, Result};
use crate::grid_searcher::HashBasedGridSearcher;
use crate::interpolation::Interpolation;
use crate::particle::Particle;
use crate::reaction_type::{ReactionType, Subshell};
use crate::utilities::is_sorted_ascending;
use rand::RngCore;
use std::sync::Arc;

/// Public contract shared by every electroatomic, positronatomic and adjoint
/// photoatomic reaction.
///
/// Cross-section queries never fail: energies below the threshold or outside
/// the tabulated grid give 0.0.
pub trait AtomicReaction: Send + Sync {
    /// Cross section at `energy` (MeV).
    fn cross_section(&self, energy: f64) -> f64;

    /// Cross section when the caller already knows the grid bin of `energy`.
    fn cross_section_in_bin(&self, energy: f64, bin_index: usize) -> f64;

    fn threshold_energy(&self) -> f64;

    fn max_energy(&self) -> f64;

    fn is_energy_within_energy_grid(&self, energy: f64) -> bool;

    fn reaction_type(&self) -> ReactionType;

    /// Differential cross section with respect to the reaction's secondary
    /// variable (scattering angle cosine, outgoing energy, ...).
    fn differential_cross_section(&self, incoming_energy: f64, secondary_variable: f64) -> f64;

    fn number_of_emitted_electrons(&self, _energy: f64) -> u32 {
        0
    }

    fn number_of_emitted_photons(&self, _energy: f64) -> u32 {
        0
    }

    /// Collide `particle` with the atom, banking any secondaries. Returns the
    /// subshell that was interacted with (`Subshell::Invalid` if none).
    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell;
}

/// Tabulated cross section on a shared energy grid.
///
/// The cross section starts at `threshold_index` of the grid: value `i` of
/// the cross-section array belongs to grid point `threshold_index + i`, and
/// the cross section is zero below the threshold. When `processed` is set,
/// both the grid and the cross section are stored in the interpolation
/// policy's processed coordinates (e.g. `ln(E)`, `ln(sigma)`).
#[derive(Debug, Clone)]
pub struct StandardReaction {
    energy_grid: Arc<Vec<f64>>,
    cross_section: Arc<Vec<f64>>,
    threshold_index: usize,
    max_index: usize,
    grid_searcher: Arc<HashBasedGridSearcher>,
    interpolation: Interpolation,
    processed: bool,
}

impl StandardReaction {
    /// Build a reaction with its own grid searcher.
    pub fn new(
        energy_grid: Arc<Vec<f64>>,
        cross_section: Arc<Vec<f64>>,
        threshold_index: usize,
        interpolation: Interpolation,
    ) -> Result<Self> {
        let grid_searcher = Arc::new(HashBasedGridSearcher::new(energy_grid.clone())?);
        Self::with_searcher(energy_grid, cross_section, threshold_index, grid_searcher, interpolation)
    }

    /// Build a reaction that shares an existing grid searcher.
    pub fn with_searcher(
        energy_grid: Arc<Vec<f64>>,
        cross_section: Arc<Vec<f64>>,
        threshold_index: usize,
        grid_searcher: Arc<HashBasedGridSearcher>,
        interpolation: Interpolation,
    ) -> Result<Self> {
        validate_layout(&energy_grid, &cross_section, threshold_index)?;
        if !Arc::ptr_eq(grid_searcher.grid(), &energy_grid) && **grid_searcher.grid() != *energy_grid {
            return Err(CollisionError::InvalidGrid(
                "grid searcher was built over a different energy grid".to_string(),
            ));
        }
        if let Some(bad) = cross_section.iter().find(|v| !(**v >= 0.0) || !v.is_finite()) {
            return Err(CollisionError::InvalidCrossSection(format!(
                "cross section values must be finite and non-negative, found {}",
                bad
            )));
        }
        let threshold_energy = energy_grid[threshold_index];
        if interpolation.is_indep_log() && !(threshold_energy >= 0.0) {
            return Err(CollisionError::InvalidGrid(format!(
                "{} interpolation needs non-negative energies, threshold is {}",
                interpolation, threshold_energy
            )));
        }

        Ok(StandardReaction {
            max_index: threshold_index + cross_section.len() - 1,
            energy_grid,
            cross_section,
            threshold_index,
            grid_searcher,
            interpolation,
            processed: false,
        })
    }

    /// Build a reaction that stores its grid and cross section in processed
    /// coordinates. The raw values are transformed once here.
    pub fn processed(
        energy_grid: &[f64],
        cross_section: &[f64],
        threshold_index: usize,
        interpolation: Interpolation,
    ) -> Result<Self> {
        validate_layout(energy_grid, cross_section, threshold_index)?;
        if let Some(bad) = energy_grid[threshold_index..]
            .iter()
            .find(|e| !interpolation.is_indep_var_in_valid_range(**e))
        {
            return Err(CollisionError::InvalidGrid(format!(
                "energy {} cannot be processed with {} interpolation",
                bad, interpolation
            )));
        }
        if let Some(bad) = cross_section.iter().find(|v| !(**v >= 0.0)) {
            return Err(CollisionError::InvalidCrossSection(format!(
                "cross section values must be non-negative, found {}",
                bad
            )));
        }
        // Points below the threshold are never interpolated. Leading points
        // that cannot be processed take the first valid processed energy so
        // the grid stays non-decreasing.
        let first_valid = energy_grid
            .iter()
            .position(|e| interpolation.is_indep_var_in_valid_range(*e))
            .unwrap_or(threshold_index);
        let floor = interpolation.process_indep_var(energy_grid[first_valid]);
        let processed_grid: Vec<f64> = energy_grid
            .iter()
            .enumerate()
            .map(|(i, &e)| {
                if i < first_valid {
                    floor
                } else {
                    interpolation.process_indep_var(e)
                }
            })
            .collect();
        let processed_cs: Vec<f64> = cross_section
            .iter()
            .map(|&v| interpolation.process_dep_var(v))
            .collect();

        let processed_grid = Arc::new(processed_grid);
        let grid_searcher = Arc::new(HashBasedGridSearcher::with_hash_bins(
            processed_grid.clone(),
            HashBasedGridSearcher::default_hash_bins(energy_grid.len()),
            true,
        )?);

        Ok(StandardReaction {
            max_index: threshold_index + processed_cs.len() - 1,
            energy_grid: processed_grid,
            cross_section: Arc::new(processed_cs),
            threshold_index,
            grid_searcher,
            interpolation,
            processed: true,
        })
    }

    pub fn threshold_index(&self) -> usize {
        self.threshold_index
    }

    pub fn energy_grid(&self) -> &Arc<Vec<f64>> {
        &self.energy_grid
    }

    pub fn cross_section_values(&self) -> &Arc<Vec<f64>> {
        &self.cross_section
    }

    pub fn grid_searcher(&self) -> &Arc<HashBasedGridSearcher> {
        &self.grid_searcher
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Grid coordinate of a raw energy.
    fn grid_coordinate(&self, energy: f64) -> f64 {
        if self.processed {
            self.interpolation.process_indep_var(energy)
        } else {
            energy
        }
    }

    fn raw_cross_section(&self, index: usize) -> f64 {
        let value = self.cross_section[index];
        if self.processed {
            self.interpolation.recover_processed_dep_var(value)
        } else {
            value
        }
    }

    fn raw_energy(&self, index: usize) -> f64 {
        let value = self.energy_grid[index];
        if self.processed {
            self.interpolation.recover_processed_indep_var(value)
        } else {
            value
        }
    }

    pub fn threshold_energy(&self) -> f64 {
        self.raw_energy(self.threshold_index)
    }

    pub fn max_energy(&self) -> f64 {
        self.raw_energy(self.max_index)
    }

    pub fn is_energy_within_energy_grid(&self, energy: f64) -> bool {
        let x = self.grid_coordinate(energy);
        !x.is_nan() && self.grid_searcher.is_value_within_grid_bounds(x)
    }

    /// Cross section at `energy`; zero below the threshold and outside the grid.
    pub fn cross_section(&self, energy: f64) -> f64 {
        let x = self.grid_coordinate(energy);
        if !(x >= self.energy_grid[self.threshold_index]) || x > self.energy_grid[self.max_index] {
            return 0.0;
        }
        match self.grid_searcher.find_lower_bin_index(x) {
            Ok(bin) => self.cross_section_in_bin(energy, bin.max(self.threshold_index)),
            Err(_) => 0.0,
        }
    }

    /// Cross section at `energy` inside grid bin `bin_index`.
    ///
    /// Requires `grid[bin_index] <= energy <= grid[bin_index + 1]`.
    pub fn cross_section_in_bin(&self, energy: f64, bin_index: usize) -> f64 {
        let value = if bin_index > self.threshold_index && bin_index < self.max_index {
            let cs_index = bin_index - self.threshold_index;
            self.interpolate_bin(energy, bin_index, cs_index, self.interpolation)
        } else if bin_index == self.threshold_index {
            self.first_bin_cross_section(energy)
        } else {
            0.0
        };
        value.max(0.0)
    }

    /// The first bin above the threshold may start from a zero cross section
    /// (or a zero energy), which the log policies cannot handle.
    fn first_bin_cross_section(&self, energy: f64) -> f64 {
        if self.threshold_index == self.max_index {
            // A single tabulated point only defines the value at the threshold
            return if energy == self.threshold_energy() {
                self.raw_cross_section(0)
            } else {
                0.0
            };
        }
        let mut policy = self.interpolation;
        if self.raw_cross_section(0) == 0.0 {
            policy = policy.with_linear_dep();
        }
        if self.threshold_index == 0 && self.raw_energy(0) == 0.0 {
            policy = policy.with_linear_indep();
        }
        self.interpolate_bin(energy, self.threshold_index, 0, policy)
    }

    fn interpolate_bin(&self, energy: f64, bin_index: usize, cs_index: usize, policy: Interpolation) -> f64 {
        if self.processed && policy == self.interpolation {
            let (px0, px1) = (self.energy_grid[bin_index], self.energy_grid[bin_index + 1]);
            let (py0, py1) = (self.cross_section[cs_index], self.cross_section[cs_index + 1]);
            if py0.is_finite() && py1.is_finite() {
                return policy.interpolate_from_processed(px0, px1, energy, py0, py1);
            }
        }
        policy.interpolate(
            self.raw_energy(bin_index),
            self.raw_energy(bin_index + 1),
            energy,
            self.raw_cross_section(cs_index),
            self.raw_cross_section(cs_index + 1),
        )
    }
}

fn validate_layout(energy_grid: &[f64], cross_section: &[f64], threshold_index: usize) -> Result<()> {
    if energy_grid.len() < 2 {
        return Err(CollisionError::InvalidGrid(format!(
            "energy grid needs at least 2 points, got {}",
            energy_grid.len()
        )));
    }
    if !is_sorted_ascending(energy_grid) {
        return Err(CollisionError::InvalidGrid(
            "energy grid must be sorted ascending".to_string(),
        ));
    }
    if threshold_index >= energy_grid.len() {
        return Err(CollisionError::InvalidCrossSection(format!(
            "threshold index {} is outside of a grid with {} points",
            threshold_index,
            energy_grid.len()
        )));
    }
    if cross_section.is_empty() {
        return Err(CollisionError::InvalidCrossSection(
            "cross section is empty".to_string(),
        ));
    }
    if cross_section.len() + threshold_index > energy_grid.len() {
        return Err(CollisionError::InvalidCrossSection(format!(
            "{} cross section values starting at index {} overrun a grid with {} points",
            cross_section.len(),
            threshold_index,
            energy_grid.len()
        )));
    }
    Ok(())
}
