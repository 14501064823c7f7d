// Elastic electroatomic and positronatomic reactions
use crate::bank::ParticleBank;
use crate::elastic_scattering::{CutoffElasticScattering, ElectronScatteringDistribution, ScreenedRutherfordScattering};
use crate::error::{CollisionError, Result};
use crate::grid_searcher::HashBasedGridSearcher;
use crate::interpolation::Interpolation;
use crate::particle::Particle;
use crate::reaction::{AtomicReaction, StandardReaction};
use crate::reaction_type::{ReactionType, Subshell};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::warn;

/// A tabulated elastic cross section paired with its angular distribution.
#[derive(Debug, Clone)]
pub struct ElasticReaction<D: ElectronScatteringDistribution> {
    base: StandardReaction,
    distribution: Arc<D>,
    reaction_type: ReactionType,
}

impl<D: ElectronScatteringDistribution> ElasticReaction<D> {
    pub fn new(base: StandardReaction, distribution: Arc<D>, reaction_type: impl Into<ReactionType>) -> Self {
        ElasticReaction {
            base,
            distribution,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }

    pub fn distribution(&self) -> &Arc<D> {
        &self.distribution
    }
}

impl<D: ElectronScatteringDistribution> AtomicReaction for ElasticReaction<D> {
    fn cross_section(&self, energy: f64) -> f64 {
        self.base.cross_section(energy)
    }

    fn cross_section_in_bin(&self, energy: f64, bin_index: usize) -> f64 {
        self.base.cross_section_in_bin(energy, bin_index)
    }

    fn threshold_energy(&self) -> f64 {
        self.base.threshold_energy()
    }

    fn max_energy(&self) -> f64 {
        self.base.max_energy()
    }

    fn is_energy_within_energy_grid(&self, energy: f64) -> bool {
        self.base.is_energy_within_energy_grid(energy)
    }

    fn reaction_type(&self) -> ReactionType {
        self.reaction_type
    }

    fn differential_cross_section(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.base.cross_section(incoming_energy) * self.distribution.evaluate_pdf(incoming_energy, mu)
    }

    /// A failed sample leaves the particle untouched and is not counted as a collision.
    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        match self.distribution.scatter(particle, bank, rng) {
            Ok(subshell) => {
                particle.collision_number += 1;
                subshell
            }
            Err(err) => {
                warn!(reaction = %self.reaction_type, energy = particle.energy, "elastic scatter skipped: {}", err);
                Subshell::Invalid
            }
        }
    }
}

/// Total elastic reaction that samples the tabulated cutoff part or the
/// analytic screened Rutherford peak by the cutoff-to-total ratio.
#[derive(Debug, Clone)]
pub struct DecoupledElasticReaction {
    total: StandardReaction,
    /// Cutoff over total on the total grid, starting at its threshold
    sampling_ratios: Vec<f64>,
    tabular: Arc<CutoffElasticScattering>,
    analytic: Arc<ScreenedRutherfordScattering>,
    reaction_type: ReactionType,
}

impl DecoupledElasticReaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        energy_grid: Arc<Vec<f64>>,
        total_cross_section: Arc<Vec<f64>>,
        total_threshold_index: usize,
        cutoff_cross_section: &[f64],
        cutoff_threshold_index: usize,
        grid_searcher: Arc<HashBasedGridSearcher>,
        tabular: Arc<CutoffElasticScattering>,
        analytic: Arc<ScreenedRutherfordScattering>,
        reaction_type: impl Into<ReactionType>,
    ) -> Result<Self> {
        if cutoff_threshold_index + cutoff_cross_section.len() > energy_grid.len() {
            return Err(CollisionError::InvalidCrossSection(format!(
                "cutoff cross section ({} values from index {}) overruns the energy grid ({} points)",
                cutoff_cross_section.len(),
                cutoff_threshold_index,
                energy_grid.len()
            )));
        }
        let total = StandardReaction::with_searcher(
            energy_grid,
            total_cross_section.clone(),
            total_threshold_index,
            grid_searcher,
            Interpolation::LogLog,
        )?;
        let cutoff_at = |grid_index: usize| {
            grid_index
                .checked_sub(cutoff_threshold_index)
                .and_then(|i| cutoff_cross_section.get(i))
                .copied()
                .unwrap_or(0.0)
        };

        let mut clamped = 0usize;
        let sampling_ratios = total_cross_section
            .iter()
            .enumerate()
            .map(|(i, &total_cs)| {
                let ratio = if total_cs > 0.0 {
                    cutoff_at(total_threshold_index + i) / total_cs
                } else {
                    0.0
                };
                if !(0.0..=1.0).contains(&ratio) {
                    clamped += 1;
                }
                ratio.clamp(0.0, 1.0)
            })
            .collect();
        if clamped > 0 {
            warn!(points = clamped, "cutoff elastic cross section exceeds the total; sampling ratios clamped");
        }

        Ok(DecoupledElasticReaction {
            total,
            sampling_ratios,
            tabular,
            analytic,
            reaction_type: reaction_type.into(),
        })
    }

    /// Probability that a collision at `energy` samples the tabulated part.
    pub fn sampling_ratio(&self, energy: f64) -> f64 {
        if !self.total.is_energy_within_energy_grid(energy) || energy < self.total.threshold_energy() {
            return 0.0;
        }
        let grid = self.total.energy_grid();
        let threshold = self.total.threshold_index();
        let bin = match self.total.grid_searcher().find_lower_bin_index(energy) {
            Ok(bin) => bin.max(threshold),
            Err(_) => return 0.0,
        };
        let k = bin - threshold;
        if k + 1 >= self.sampling_ratios.len() {
            return self.sampling_ratios[self.sampling_ratios.len() - 1];
        }
        Interpolation::LinLin
            .interpolate(grid[bin], grid[bin + 1], energy, self.sampling_ratios[k], self.sampling_ratios[k + 1])
            .clamp(0.0, 1.0)
    }

    pub fn tabular_distribution(&self) -> &Arc<CutoffElasticScattering> {
        &self.tabular
    }

    pub fn analytic_distribution(&self) -> &Arc<ScreenedRutherfordScattering> {
        &self.analytic
    }
}

impl AtomicReaction for DecoupledElasticReaction {
    fn cross_section(&self, energy: f64) -> f64 {
        self.total.cross_section(energy)
    }

    fn cross_section_in_bin(&self, energy: f64, bin_index: usize) -> f64 {
        self.total.cross_section_in_bin(energy, bin_index)
    }

    fn threshold_energy(&self) -> f64 {
        self.total.threshold_energy()
    }

    fn max_energy(&self) -> f64 {
        self.total.max_energy()
    }

    fn is_energy_within_energy_grid(&self, energy: f64) -> bool {
        self.total.is_energy_within_energy_grid(energy)
    }

    fn reaction_type(&self) -> ReactionType {
        self.reaction_type
    }

    fn differential_cross_section(&self, incoming_energy: f64, mu: f64) -> f64 {
        let ratio = self.sampling_ratio(incoming_energy);
        let pdf = ratio * self.tabular.evaluate_pdf(incoming_energy, mu)
            + (1.0 - ratio) * self.analytic.evaluate_pdf(incoming_energy, mu);
        self.total.cross_section(incoming_energy) * pdf
    }

    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        let result = if rng.gen::<f64>() < self.sampling_ratio(particle.energy) {
            self.tabular.scatter(particle, bank, rng)
        } else {
            self.analytic.scatter(particle, bank, rng)
        };
        match result {
            Ok(subshell) => {
                particle.collision_number += 1;
                subshell
            }
            Err(err) => {
                warn!(reaction = %self.reaction_type, energy = particle.energy, "elastic scatter skipped: {}", err);
                Subshell::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::TabularDistribution;
    use crate::elastic_bivariate::{ElasticBivariateDistribution, TwoDGridPolicy, DEFAULT_FUZZY_BOUND_TOL};
    use crate::elastic_traits::{ElasticTraits, MU_PEAK};
    use crate::interpolation::TwoDInterpolation;
    use crate::reaction_type::ElectroatomicReactionType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cutoff_scattering() -> Arc<CutoffElasticScattering> {
        let table = Arc::new(TabularDistribution::new(vec![-1.0, MU_PEAK], vec![1.0, 1.0], Interpolation::LinLin).unwrap());
        let full = Arc::new(
            ElasticBivariateDistribution::new(
                vec![1e-5, 1e5],
                vec![table.clone(), table],
                TwoDInterpolation::LogLogLog,
                TwoDGridPolicy::UnitBaseCorrelated,
                MU_PEAK,
                DEFAULT_FUZZY_BOUND_TOL,
                1e-7,
            )
            .unwrap(),
        );
        Arc::new(CutoffElasticScattering::new(full, None, 1.0).unwrap())
    }

    fn decoupled() -> DecoupledElasticReaction {
        let grid = Arc::new(vec![1e-5, 1e-3, 1e-1, 1e1]);
        let searcher = Arc::new(HashBasedGridSearcher::new(grid.clone()).unwrap());
        DecoupledElasticReaction::new(
            grid,
            Arc::new(vec![4.0, 2.0, 1.0]),
            1,
            &[5.0, 2.0, 2.0, 0.5],
            0,
            searcher,
            cutoff_scattering(),
            Arc::new(ScreenedRutherfordScattering::new(ElasticTraits::new(1))),
            ElectroatomicReactionType::DecoupledElastic,
        )
        .unwrap()
    }

    #[test]
    fn test_sampling_ratio_bounds() {
        let reaction = decoupled();
        assert_eq!(reaction.sampling_ratio(1e-5), 0.0);
        assert_eq!(reaction.sampling_ratio(1e-3), 0.5);
        assert_eq!(reaction.sampling_ratio(1e-1), 1.0);
        assert_eq!(reaction.sampling_ratio(1e1), 0.5);
        assert_eq!(reaction.sampling_ratio(1e2), 0.0);
        for i in 0..100 {
            let energy = 1e-3 * 10f64.powf(i as f64 * 0.04);
            let ratio = reaction.sampling_ratio(energy);
            assert!((0.0..=1.0).contains(&ratio), "ratio {} at {}", ratio, energy);
        }
    }

    #[test]
    fn test_decoupled_react_uses_both_branches() {
        let reaction = decoupled();
        let mut rng = StdRng::seed_from_u64(1);
        let mut bank = ParticleBank::new();
        let (mut peak, mut tabular) = (0, 0);
        for _ in 0..400 {
            let mut electron = Particle::electron(1e-3);
            let subshell = reaction.react(&mut electron, &mut bank, &mut rng);
            assert_eq!(subshell, Subshell::Invalid);
            assert_eq!(electron.collision_number, 1);
            if electron.direction[2] > MU_PEAK - 1e-9 {
                peak += 1;
            } else {
                tabular += 1;
            }
        }
        assert!(peak > 120 && tabular > 120, "peak {} tabular {}", peak, tabular);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_differential_cross_section() {
        let grid = Arc::new(vec![1e-5, 1e5]);
        let base = StandardReaction::new(grid, Arc::new(vec![2.0, 2.0]), 0, Interpolation::LogLog).unwrap();
        let reaction = ElasticReaction::new(base, cutoff_scattering(), ElectroatomicReactionType::CutoffElastic);
        let expected = 2.0 / (1.0 + MU_PEAK);
        assert!((reaction.differential_cross_section(1.0, 0.0) - expected).abs() < 1e-12);
        assert_eq!(reaction.differential_cross_section(1.0, 0.9999995), 0.0);
        assert_eq!(
            reaction.reaction_type(),
            ReactionType::Electroatomic(ElectroatomicReactionType::CutoffElastic)
        );
    }

    #[test]
    fn test_failed_scatter_is_not_a_collision() {
        let grid = Arc::new(vec![1e-7, 1e5]);
        let base = StandardReaction::new(grid, Arc::new(vec![2.0, 2.0]), 0, Interpolation::LogLog).unwrap();
        let reaction = ElasticReaction::new(base, cutoff_scattering(), ElectroatomicReactionType::CutoffElastic);
        let mut rng = StdRng::seed_from_u64(2);
        let mut bank = ParticleBank::new();

        // Below the angular energy grid
        let mut electron = Particle::electron(1e-6);
        assert_eq!(reaction.react(&mut electron, &mut bank, &mut rng), Subshell::Invalid);
        assert_eq!(electron.collision_number, 0);
        assert_eq!(electron.energy, 1e-6);
        assert_eq!(electron.direction, [0.0, 0.0, 1.0]);

        let mut electron = Particle::electron(1.0);
        reaction.react(&mut electron, &mut bank, &mut rng);
        assert_eq!(electron.collision_number, 1);
    }

    #[test]
    fn test_rejects_overrunning_cutoff() {
        let grid = Arc::new(vec![1.0, 2.0]);
        let searcher = Arc::new(HashBasedGridSearcher::new(grid.clone()).unwrap());
        let result = DecoupledElasticReaction::new(
            grid,
            Arc::new(vec![1.0, 1.0]),
            0,
            &[1.0, 1.0],
            1,
            searcher,
            cutoff_scattering(),
            Arc::new(ScreenedRutherfordScattering::new(ElasticTraits::new(1))),
            ElectroatomicReactionType::DecoupledElastic,
        );
        assert!(result.is_err());
    }
}
