// Elastic electron/positron scattering distributions
use crate::bank::ParticleBank;
use crate::distribution::{AngularDistribution, DiscreteDistribution, TabularDistribution};
use crate::elastic_bivariate::{Bracket, ElasticBivariateDistribution, TwoDGridPolicy};
use crate::elastic_distribution::{CoupledElasticDistribution, HybridElasticDistribution};
use crate::elastic_traits::{
    sample_screened_rutherford, screened_rutherford_cdf, screened_rutherford_pdf, ElasticTraits, MU_PEAK,
};
use crate::error::{CollisionError, Result};
use crate::particle::Particle;
use crate::reaction_type::Subshell;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

/// Angular scattering law of an elastic reaction.
pub trait ElectronScatteringDistribution: Debug + Send + Sync {
    fn evaluate(&self, incoming_energy: f64, mu: f64) -> f64;
    fn evaluate_pdf(&self, incoming_energy: f64, mu: f64) -> f64;
    fn evaluate_cdf(&self, incoming_energy: f64, mu: f64) -> f64;

    /// Sample the outgoing energy and scattering angle cosine.
    fn sample(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)>;

    /// Scatter `particle` in place. Elastic scattering never banks secondaries.
    fn scatter(&self, particle: &mut Particle, _bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Result<Subshell> {
        let (energy, mu) = self.sample(particle.energy, rng)?;
        let phi = 2.0 * PI * rng.gen::<f64>();
        particle.energy = energy;
        particle.rotate_direction(mu, phi);
        Ok(Subshell::Invalid)
    }
}

/// How the coupled distribution mixes the tabulated and analytic regions
/// between two angular energies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoupledElasticSamplingMethod {
    OneDUnion,
    TwoDUnion,
    SimplifiedUnion,
    ModifiedTwoDUnion,
}

const SAMPLING_METHOD_NAMES: [(CoupledElasticSamplingMethod, &str, &str); 4] = [
    (CoupledElasticSamplingMethod::OneDUnion, "One D Union", "OneDUnion"),
    (CoupledElasticSamplingMethod::TwoDUnion, "Two D Union", "TwoDUnion"),
    (CoupledElasticSamplingMethod::SimplifiedUnion, "Simplified Union", "SimplifiedUnion"),
    (CoupledElasticSamplingMethod::ModifiedTwoDUnion, "Modified Two D Union", "ModifiedTwoDUnion"),
];

impl CoupledElasticSamplingMethod {
    pub fn name(self) -> &'static str {
        SAMPLING_METHOD_NAMES
            .iter()
            .find(|(method, _, _)| *method == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for CoupledElasticSamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CoupledElasticSamplingMethod {
    type Err = CollisionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        SAMPLING_METHOD_NAMES
            .iter()
            .find(|(_, name, alias)| trimmed.eq_ignore_ascii_case(name) || trimmed.eq_ignore_ascii_case(alias))
            .map(|(method, _, _)| *method)
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "coupled elastic sampling method",
                name: s.to_string(),
            })
    }
}

/// Tabulated elastic scattering below a cutoff angle cosine.
#[derive(Debug, Clone)]
pub struct CutoffElasticScattering {
    full: Arc<ElasticBivariateDistribution<TabularDistribution>>,
    partial: Option<Arc<ElasticBivariateDistribution<TabularDistribution>>>,
    cutoff_angle_cosine: f64,
}

impl CutoffElasticScattering {
    /// `full` runs up to `MU_PEAK`; `partial` is the same data restricted to
    /// `[-1, cutoff_angle_cosine]` and is required when the cutoff is below the peak.
    pub fn new(
        full: Arc<ElasticBivariateDistribution<TabularDistribution>>,
        partial: Option<Arc<ElasticBivariateDistribution<TabularDistribution>>>,
        cutoff_angle_cosine: f64,
    ) -> Result<Self> {
        if !(-1.0..=1.0).contains(&cutoff_angle_cosine) {
            return Err(CollisionError::InvalidDistribution(format!(
                "cutoff angle cosine must be in [-1, 1], got {}",
                cutoff_angle_cosine
            )));
        }
        if cutoff_angle_cosine < MU_PEAK && partial.is_none() {
            return Err(CollisionError::MissingData(format!(
                "a restricted distribution is needed for cutoff angle cosine {}",
                cutoff_angle_cosine
            )));
        }
        Ok(CutoffElasticScattering {
            full,
            partial: if cutoff_angle_cosine < MU_PEAK { partial } else { None },
            cutoff_angle_cosine: cutoff_angle_cosine.min(MU_PEAK),
        })
    }

    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }

    /// Fraction of the cutoff cross section scattering below the cutoff angle.
    pub fn cutoff_cross_section_ratio(&self, energy: f64) -> f64 {
        if self.partial.is_none() {
            return 1.0;
        }
        self.full.evaluate_cdf(energy, self.cutoff_angle_cosine).clamp(0.0, 1.0)
    }

    fn active(&self) -> &ElasticBivariateDistribution<TabularDistribution> {
        self.partial.as_deref().unwrap_or(&self.full)
    }
}

impl ElectronScatteringDistribution for CutoffElasticScattering {
    fn evaluate(&self, incoming_energy: f64, mu: f64) -> f64 {
        if mu > self.cutoff_angle_cosine {
            return 0.0;
        }
        self.full.evaluate(incoming_energy, mu)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        if mu > self.cutoff_angle_cosine {
            return 0.0;
        }
        self.active().evaluate_pdf(incoming_energy, mu)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        if mu >= self.cutoff_angle_cosine {
            return if incoming_energy >= self.full.lower_bound_of_primary()
                && incoming_energy <= self.full.upper_bound_of_primary()
            {
                1.0
            } else {
                0.0
            };
        }
        self.active().evaluate_cdf(incoming_energy, mu)
    }

    fn sample(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)> {
        let mu = self.active().sample_secondary_conditional(incoming_energy, rng)?;
        Ok((incoming_energy, mu.min(self.cutoff_angle_cosine)))
    }
}

/// Analytic screened Rutherford peak on `[MU_PEAK, 1]`.
#[derive(Debug, Clone)]
pub struct ScreenedRutherfordScattering {
    traits: ElasticTraits,
}

impl ScreenedRutherfordScattering {
    pub fn new(traits: ElasticTraits) -> Self {
        ScreenedRutherfordScattering { traits }
    }

    pub fn traits(&self) -> &ElasticTraits {
        &self.traits
    }
}

impl ElectronScatteringDistribution for ScreenedRutherfordScattering {
    fn evaluate(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.evaluate_pdf(incoming_energy, mu)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        screened_rutherford_pdf(self.traits.moliere_screening_constant(incoming_energy), mu)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        screened_rutherford_cdf(self.traits.moliere_screening_constant(incoming_energy), mu)
    }

    fn sample(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)> {
        let eta = self.traits.moliere_screening_constant(incoming_energy);
        Ok((incoming_energy, sample_screened_rutherford(eta, rng.gen::<f64>())))
    }
}

/// Full elastic distribution: tabulated cutoff region plus the analytic peak.
#[derive(Debug, Clone)]
pub struct CoupledElasticScattering {
    distribution: Arc<ElasticBivariateDistribution<CoupledElasticDistribution>>,
    cutoff_cross_section_ratios: Arc<TabularDistribution>,
    traits: ElasticTraits,
    sampling_method: CoupledElasticSamplingMethod,
}

impl CoupledElasticScattering {
    pub fn new(
        distribution: Arc<ElasticBivariateDistribution<CoupledElasticDistribution>>,
        cutoff_cross_section_ratios: Arc<TabularDistribution>,
        traits: ElasticTraits,
        sampling_method: CoupledElasticSamplingMethod,
    ) -> Result<Self> {
        check_sampling_combination(
            sampling_method,
            distribution.interpolation().is_cosine_log(),
            distribution.grid_policy(),
        )?;
        Ok(CoupledElasticScattering {
            distribution,
            cutoff_cross_section_ratios,
            traits,
            sampling_method,
        })
    }

    pub fn sampling_method(&self) -> CoupledElasticSamplingMethod {
        self.sampling_method
    }

    /// Interpolated cutoff-to-total cross-section ratio.
    pub fn cutoff_cross_section_ratio(&self, energy: f64) -> f64 {
        let ratios = &self.cutoff_cross_section_ratios;
        let clamped = energy.clamp(ratios.lower_bound(), ratios.upper_bound());
        ratios.evaluate(clamped).clamp(0.0, 1.0)
    }

    fn sample_one_d_union(&self, energy: f64, rng: &mut dyn RngCore) -> Result<f64> {
        let index = match self.distribution.bracket(energy)? {
            Bracket::Single(i) => i,
            Bracket::Between { lower, weight } => {
                if rng.gen::<f64>() < weight {
                    lower + 1
                } else {
                    lower
                }
            }
        };
        Ok(self.distribution.distributions()[index].sample_with_random_number(rng.gen::<f64>()))
    }

    fn sample_cutoff_region(&self, energy: f64, random_number: f64, rng: &mut dyn RngCore) -> Result<f64> {
        let bin_random = rng.gen::<f64>();
        self.distribution
            .sample_with(energy, random_number, Some(bin_random), |d, r| d.sample_cutoff(r))
    }
}

/// Modified 2D union sampling cannot pair a log-cosine 2D interpolation
/// with the direct grid policy.
pub fn check_sampling_combination(
    method: CoupledElasticSamplingMethod,
    cosine_log_interpolation: bool,
    grid_policy: TwoDGridPolicy,
) -> Result<()> {
    if method == CoupledElasticSamplingMethod::ModifiedTwoDUnion
        && cosine_log_interpolation
        && grid_policy == TwoDGridPolicy::Direct
    {
        return Err(CollisionError::UnsupportedCombination(format!(
            "{} sampling cannot be used with a log-cosine 2D interpolation and the {} grid policy",
            method, grid_policy
        )));
    }
    Ok(())
}

impl ElectronScatteringDistribution for CoupledElasticScattering {
    fn evaluate(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate(incoming_energy, mu)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate_pdf(incoming_energy, mu)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate_cdf(incoming_energy, mu)
    }

    fn sample(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)> {
        self.distribution.bracket(incoming_energy)?;
        let mu = match self.sampling_method {
            CoupledElasticSamplingMethod::OneDUnion => self.sample_one_d_union(incoming_energy, rng)?,
            CoupledElasticSamplingMethod::TwoDUnion => {
                self.distribution.sample_secondary_conditional(incoming_energy, rng)?
            }
            CoupledElasticSamplingMethod::SimplifiedUnion => {
                let ratio = self.cutoff_cross_section_ratio(incoming_energy);
                if rng.gen::<f64>() < ratio {
                    let random_number = rng.gen::<f64>();
                    self.sample_cutoff_region(incoming_energy, random_number, rng)?
                } else {
                    let eta = self.traits.moliere_screening_constant(incoming_energy);
                    sample_screened_rutherford(eta, rng.gen::<f64>())
                }
            }
            CoupledElasticSamplingMethod::ModifiedTwoDUnion => {
                let ratio = self.cutoff_cross_section_ratio(incoming_energy);
                let random_number = rng.gen::<f64>();
                if random_number <= ratio && ratio > 0.0 {
                    self.sample_cutoff_region(incoming_energy, random_number / ratio, rng)?
                } else {
                    let eta = self.traits.moliere_screening_constant(incoming_energy);
                    let scaled = if ratio < 1.0 { (random_number - ratio) / (1.0 - ratio) } else { 0.0 };
                    sample_screened_rutherford(eta, scaled)
                }
            }
        };
        Ok((incoming_energy, mu))
    }
}

/// Tabulated scattering below a cutoff plus moment-preserving discrete angles above it.
#[derive(Debug, Clone)]
pub struct HybridElasticScattering {
    distribution: Arc<ElasticBivariateDistribution<HybridElasticDistribution>>,
    cutoff_angle_cosine: f64,
}

impl HybridElasticScattering {
    pub fn new(
        distribution: Arc<ElasticBivariateDistribution<HybridElasticDistribution>>,
        cutoff_angle_cosine: f64,
    ) -> Self {
        HybridElasticScattering {
            distribution,
            cutoff_angle_cosine,
        }
    }

    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }

    fn interpolated_ratio(&self, bracket: Bracket) -> f64 {
        let dists = self.distribution.distributions();
        match bracket {
            Bracket::Single(i) => dists[i].cutoff_cross_section_ratio(),
            Bracket::Between { lower, weight } => {
                let r0 = dists[lower].cutoff_cross_section_ratio();
                let r1 = dists[lower + 1].cutoff_cross_section_ratio();
                r0 + weight * (r1 - r0)
            }
        }
    }
}

impl ElectronScatteringDistribution for HybridElasticScattering {
    fn evaluate(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate(incoming_energy, mu)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate_pdf(incoming_energy, mu)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate_cdf(incoming_energy, mu)
    }

    fn sample(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)> {
        let bracket = self.distribution.bracket(incoming_energy)?;
        let ratio = self.interpolated_ratio(bracket);
        let random_number = rng.gen::<f64>();
        let bin_random = rng.gen::<f64>();

        let mu = if random_number <= ratio && ratio > 0.0 {
            self.distribution
                .sample_with(incoming_energy, random_number / ratio, Some(bin_random), |d, r| {
                    d.sample_cutoff(r)
                })?
                .min(self.cutoff_angle_cosine)
        } else {
            // Discrete angles are never interpolated between energies
            let index = match bracket {
                Bracket::Single(i) => i,
                Bracket::Between { lower, weight } => {
                    if bin_random < weight {
                        lower + 1
                    } else {
                        lower
                    }
                }
            };
            let scaled = if ratio < 1.0 { (random_number - ratio) / (1.0 - ratio) } else { 0.0 };
            self.distribution.distributions()[index]
                .discrete()
                .sample_with_random_number(scaled)
        };
        Ok((incoming_energy, mu))
    }
}

/// Discrete-angle elastic scattering above the cutoff angle.
#[derive(Debug, Clone)]
pub struct MomentPreservingElasticScattering {
    distribution: Arc<ElasticBivariateDistribution<DiscreteDistribution>>,
    cutoff_angle_cosine: f64,
}

impl MomentPreservingElasticScattering {
    pub fn new(
        distribution: Arc<ElasticBivariateDistribution<DiscreteDistribution>>,
        cutoff_angle_cosine: f64,
    ) -> Self {
        MomentPreservingElasticScattering {
            distribution,
            cutoff_angle_cosine,
        }
    }

    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }
}

impl ElectronScatteringDistribution for MomentPreservingElasticScattering {
    fn evaluate(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate(incoming_energy, mu)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate_pdf(incoming_energy, mu)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, mu: f64) -> f64 {
        self.distribution.evaluate_cdf(incoming_energy, mu)
    }

    fn sample(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)> {
        let index = match self.distribution.bracket(incoming_energy)? {
            Bracket::Single(i) => i,
            Bracket::Between { lower, weight } => {
                if rng.gen::<f64>() < weight {
                    lower + 1
                } else {
                    lower
                }
            }
        };
        let mu = self.distribution.distributions()[index].sample_with_random_number(rng.gen::<f64>());
        Ok((incoming_energy, mu))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elastic_bivariate::DEFAULT_FUZZY_BOUND_TOL;
    use crate::interpolation::{Interpolation, TwoDInterpolation};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn coupled_bivariate(
        interpolation: TwoDInterpolation,
        policy: TwoDGridPolicy,
    ) -> Arc<ElasticBivariateDistribution<CoupledElasticDistribution>> {
        let traits = ElasticTraits::new(13);
        let energies = vec![1e-2, 1.0];
        let dists = energies
            .iter()
            .map(|&e| {
                Arc::new(
                    CoupledElasticDistribution::new(
                        vec![-1.0, 0.0, MU_PEAK],
                        vec![0.1, 0.2, 0.7],
                        traits.moliere_screening_constant(e),
                        0.9,
                        Interpolation::LinLin,
                    )
                    .unwrap(),
                )
            })
            .collect();
        Arc::new(
            ElasticBivariateDistribution::new(energies, dists, interpolation, policy, 1.0, DEFAULT_FUZZY_BOUND_TOL, 1e-7)
                .unwrap(),
        )
    }

    fn ratios() -> Arc<TabularDistribution> {
        Arc::new(TabularDistribution::new(vec![1e-2, 1.0], vec![0.9, 0.9], Interpolation::LinLin).unwrap())
    }

    #[test]
    fn test_sampling_method_names() {
        for (method, name, alias) in SAMPLING_METHOD_NAMES {
            assert_eq!(name.parse::<CoupledElasticSamplingMethod>().unwrap(), method);
            assert_eq!(alias.parse::<CoupledElasticSamplingMethod>().unwrap(), method);
        }
        assert!("Union".parse::<CoupledElasticSamplingMethod>().is_err());
    }

    #[test]
    fn test_modified_union_rejects_direct_cosine_log() {
        let dist = coupled_bivariate(TwoDInterpolation::LogLogCosLog, TwoDGridPolicy::Direct);
        let result = CoupledElasticScattering::new(
            dist,
            ratios(),
            ElasticTraits::new(13),
            CoupledElasticSamplingMethod::ModifiedTwoDUnion,
        );
        assert!(matches!(result, Err(CollisionError::UnsupportedCombination(_))));

        let dist = coupled_bivariate(TwoDInterpolation::LogLogCosLog, TwoDGridPolicy::Correlated);
        assert!(CoupledElasticScattering::new(
            dist,
            ratios(),
            ElasticTraits::new(13),
            CoupledElasticSamplingMethod::ModifiedTwoDUnion,
        )
        .is_ok());
    }

    #[test]
    fn test_coupled_sampling_methods_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for method in [
            CoupledElasticSamplingMethod::OneDUnion,
            CoupledElasticSamplingMethod::TwoDUnion,
            CoupledElasticSamplingMethod::SimplifiedUnion,
            CoupledElasticSamplingMethod::ModifiedTwoDUnion,
        ] {
            let scattering = CoupledElasticScattering::new(
                coupled_bivariate(TwoDInterpolation::LogLogLog, TwoDGridPolicy::UnitBaseCorrelated),
                ratios(),
                ElasticTraits::new(13),
                method,
            )
            .unwrap();
            let mut peak = 0;
            for _ in 0..2000 {
                let (energy, mu) = scattering.sample(0.1, &mut rng).unwrap();
                assert_eq!(energy, 0.1);
                assert!((-1.0..=1.0).contains(&mu), "{} gave {}", method, mu);
                if mu > MU_PEAK {
                    peak += 1;
                }
            }
            // Roughly 10% of collisions land in the analytic peak
            assert!(peak > 120 && peak < 300, "{} peak count {}", method, peak);
            assert!(scattering.sample(1e-3, &mut rng).is_err());
        }
    }

    #[test]
    fn test_screened_rutherford_scattering() {
        let scattering = ScreenedRutherfordScattering::new(ElasticTraits::new(79));
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let (_, mu) = scattering.sample(1.0, &mut rng).unwrap();
            assert!(mu >= MU_PEAK && mu <= 1.0);
        }
        assert_eq!(scattering.evaluate_pdf(1.0, 0.5), 0.0);
        assert_eq!(scattering.evaluate_cdf(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_scatter_keeps_unit_direction_and_energy() {
        let scattering = ScreenedRutherfordScattering::new(ElasticTraits::new(6));
        let mut rng = StdRng::seed_from_u64(9);
        let mut electron = Particle::electron(0.5);
        let mut bank = ParticleBank::new();
        let subshell = scattering.scatter(&mut electron, &mut bank, &mut rng).unwrap();
        assert_eq!(subshell, Subshell::Invalid);
        assert_eq!(electron.energy, 0.5);
        assert!(bank.is_empty());
        let norm: f64 = electron.direction.iter().map(|d| d * d).sum();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(electron.direction[2] >= MU_PEAK - 1e-12);
    }

    #[test]
    fn test_cutoff_scattering_restricted_sampling() {
        let table = |mu: Vec<f64>, pdf: Vec<f64>| Arc::new(TabularDistribution::new(mu, pdf, Interpolation::LinLin).unwrap());
        let full = Arc::new(
            ElasticBivariateDistribution::new(
                vec![1e-3, 1.0],
                vec![table(vec![-1.0, 0.5, MU_PEAK], vec![1.0, 1.0, 1.0]); 2],
                TwoDInterpolation::LinLinLin,
                TwoDGridPolicy::Direct,
                MU_PEAK,
                DEFAULT_FUZZY_BOUND_TOL,
                1e-7,
            )
            .unwrap(),
        );
        let partial = Arc::new(
            ElasticBivariateDistribution::new(
                vec![1e-3, 1.0],
                vec![table(vec![-1.0, 0.5], vec![1.0, 1.0]); 2],
                TwoDInterpolation::LinLinLin,
                TwoDGridPolicy::Direct,
                0.5,
                DEFAULT_FUZZY_BOUND_TOL,
                1e-7,
            )
            .unwrap(),
        );
        assert!(CutoffElasticScattering::new(full.clone(), None, 0.5).is_err());
        let scattering = CutoffElasticScattering::new(full, Some(partial), 0.5).unwrap();
        let expected = 1.5 / (2.0 - 1e-6);
        assert!((scattering.cutoff_cross_section_ratio(0.1) - expected).abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..500 {
            let (_, mu) = scattering.sample(0.1, &mut rng).unwrap();
            assert!(mu <= 0.5);
        }
        assert_eq!(scattering.evaluate(0.1, 0.7), 0.0);
        assert_eq!(scattering.evaluate_cdf(0.1, 0.5), 1.0);
    }
}
