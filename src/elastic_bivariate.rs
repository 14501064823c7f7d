// Energy-dependent angular distributions built from per-energy 1D tables
use crate::distribution::AngularDistribution;
use crate::error::{CollisionError, Result};
use crate::interpolation::{Interpolation, TwoDInterpolation};
use crate::utilities::{is_strictly_ascending, lower_bound_index};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Tolerance used to snap primary values onto grid points.
pub const DEFAULT_FUZZY_BOUND_TOL: f64 = 1e-6;

const MAX_CORRELATED_ITERATIONS: usize = 500;

/// How samples and evaluations between two incoming energies are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwoDGridPolicy {
    /// Pick one of the bracketing tables stochastically and use it directly.
    Direct,
    /// Pick a table stochastically, then map its unit-base coordinate onto the
    /// interpolated secondary bounds.
    UnitBase,
    /// Sample both tables with one random number and interpolate the samples.
    Correlated,
    /// Correlated sampling in unit-base coordinates.
    UnitBaseCorrelated,
}

const GRID_POLICY_NAMES: [(TwoDGridPolicy, &str, &str); 4] = [
    (TwoDGridPolicy::Direct, "Direct", "Direct"),
    (TwoDGridPolicy::UnitBase, "Unit-base", "UnitBase"),
    (TwoDGridPolicy::Correlated, "Correlated", "Correlated"),
    (TwoDGridPolicy::UnitBaseCorrelated, "Unit-base Correlated", "UnitBaseCorrelated"),
];

impl TwoDGridPolicy {
    pub fn name(self) -> &'static str {
        GRID_POLICY_NAMES
            .iter()
            .find(|(policy, _, _)| *policy == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("Unknown")
    }

    pub fn is_unit_base(self) -> bool {
        matches!(self, TwoDGridPolicy::UnitBase | TwoDGridPolicy::UnitBaseCorrelated)
    }

    pub fn is_correlated(self) -> bool {
        matches!(self, TwoDGridPolicy::Correlated | TwoDGridPolicy::UnitBaseCorrelated)
    }
}

impl fmt::Display for TwoDGridPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TwoDGridPolicy {
    type Err = CollisionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        GRID_POLICY_NAMES
            .iter()
            .find(|(_, name, alias)| trimmed.eq_ignore_ascii_case(name) || trimmed.eq_ignore_ascii_case(alias))
            .map(|(policy, _, _)| *policy)
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "2D grid policy",
                name: s.to_string(),
            })
    }
}

/// Where an incoming energy falls on the primary grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket {
    /// Use a single table (grid point or above the last energy).
    Single(usize),
    /// Between `lower` and `lower + 1`; `weight` is the processed fraction.
    Between { lower: usize, weight: f64 },
}

#[derive(Clone, Copy)]
enum EvaluationKind {
    Value,
    Pdf,
    Cdf,
}

/// Angle cosine distribution conditioned on incoming energy.
#[derive(Debug, Clone)]
pub struct ElasticBivariateDistribution<D: AngularDistribution> {
    energies: Vec<f64>,
    distributions: Vec<Arc<D>>,
    interpolation: TwoDInterpolation,
    grid_policy: TwoDGridPolicy,
    upper_bound_of_secondary: f64,
    fuzzy_bound_tolerance: f64,
    evaluation_tolerance: f64,
}

impl<D: AngularDistribution> ElasticBivariateDistribution<D> {
    pub fn new(
        energies: Vec<f64>,
        distributions: Vec<Arc<D>>,
        interpolation: TwoDInterpolation,
        grid_policy: TwoDGridPolicy,
        upper_bound_of_secondary: f64,
        fuzzy_bound_tolerance: f64,
        evaluation_tolerance: f64,
    ) -> Result<Self> {
        if energies.is_empty() || energies.len() != distributions.len() {
            return Err(CollisionError::InvalidDistribution(format!(
                "bivariate distribution needs one table per energy ({} energies, {} tables)",
                energies.len(),
                distributions.len()
            )));
        }
        if !is_strictly_ascending(&energies) {
            return Err(CollisionError::InvalidDistribution(
                "primary energies must be strictly ascending".to_string(),
            ));
        }
        if interpolation.zx().is_indep_log() && !(energies[0] > 0.0) {
            return Err(CollisionError::InvalidDistribution(format!(
                "{} interpolation needs positive energies",
                interpolation
            )));
        }
        if !(evaluation_tolerance > 0.0 && evaluation_tolerance < 1.0) {
            return Err(CollisionError::InvalidDistribution(format!(
                "evaluation tolerance must be in (0, 1), got {}",
                evaluation_tolerance
            )));
        }

        Ok(ElasticBivariateDistribution {
            energies,
            distributions,
            interpolation,
            grid_policy,
            upper_bound_of_secondary,
            fuzzy_bound_tolerance,
            evaluation_tolerance,
        })
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn distributions(&self) -> &[Arc<D>] {
        &self.distributions
    }

    pub fn interpolation(&self) -> TwoDInterpolation {
        self.interpolation
    }

    pub fn grid_policy(&self) -> TwoDGridPolicy {
        self.grid_policy
    }

    pub fn evaluation_tolerance(&self) -> f64 {
        self.evaluation_tolerance
    }

    pub fn lower_bound_of_primary(&self) -> f64 {
        self.energies[0]
    }

    pub fn upper_bound_of_primary(&self) -> f64 {
        self.energies[self.energies.len() - 1]
    }

    pub fn upper_bound_of_secondary(&self) -> f64 {
        self.upper_bound_of_secondary
    }

    pub fn lower_bound_of_secondary(&self, energy: f64) -> f64 {
        match self.bracket(energy) {
            Ok(Bracket::Single(i)) => self.distributions[i].lower_bound(),
            Ok(Bracket::Between { lower, .. }) => self.distributions[lower]
                .lower_bound()
                .min(self.distributions[lower + 1].lower_bound()),
            Err(_) => -1.0,
        }
    }

    /// Locate `energy` on the primary grid. Energies above the grid use the
    /// last table; energies below it are an error.
    pub fn bracket(&self, energy: f64) -> Result<Bracket> {
        let first = self.lower_bound_of_primary();
        let last = self.upper_bound_of_primary();
        if energy < first || energy.is_nan() {
            return Err(CollisionError::OutOfRange {
                value: energy,
                min: first,
                max: last,
            });
        }
        if energy >= last {
            return Ok(Bracket::Single(self.energies.len() - 1));
        }
        let lower = lower_bound_index(&self.energies, energy);
        if energy == self.energies[lower] {
            return Ok(Bracket::Single(lower));
        }
        let weight = self
            .interpolation
            .primary_weight(self.energies[lower], self.energies[lower + 1], energy);
        Ok(Bracket::Between { lower, weight })
    }

    /// Bracket used by the evaluation methods, which return zero outside the grid.
    fn evaluation_bracket(&self, energy: f64) -> Option<Bracket> {
        if energy > self.upper_bound_of_primary() {
            return None;
        }
        self.bracket(energy).ok()
    }

    pub fn evaluate(&self, energy: f64, mu: f64) -> f64 {
        self.evaluate_impl(energy, mu, EvaluationKind::Value)
    }

    pub fn evaluate_pdf(&self, energy: f64, mu: f64) -> f64 {
        self.evaluate_impl(energy, mu, EvaluationKind::Pdf)
    }

    pub fn evaluate_cdf(&self, energy: f64, mu: f64) -> f64 {
        self.evaluate_impl(energy, mu, EvaluationKind::Cdf)
    }

    fn evaluate_impl(&self, energy: f64, mu: f64, kind: EvaluationKind) -> f64 {
        let eval = |d: &D, x: f64| match kind {
            EvaluationKind::Value => d.evaluate(x),
            EvaluationKind::Pdf => d.evaluate_pdf(x),
            EvaluationKind::Cdf => d.evaluate_cdf(x),
        };
        let (lower, weight) = match self.evaluation_bracket(energy) {
            None => return 0.0,
            Some(Bracket::Single(i)) => return eval(&self.distributions[i], mu),
            Some(Bracket::Between { lower, weight }) => (lower, weight),
        };
        let (e0, e1) = (self.energies[lower], self.energies[lower + 1]);
        let (d0, d1) = (&self.distributions[lower], &self.distributions[lower + 1]);

        match self.grid_policy {
            TwoDGridPolicy::Direct => self
                .interpolation
                .interpolate_primary(e0, e1, energy, eval(d0, mu), eval(d1, mu)),
            TwoDGridPolicy::UnitBase => match self.unit_base_points(lower, energy, mu) {
                Some(((mu0, scale0), (mu1, scale1))) => {
                    let (v0, v1) = match kind {
                        EvaluationKind::Cdf => (eval(d0, mu0), eval(d1, mu1)),
                        _ => (eval(d0, mu0) * scale0, eval(d1, mu1) * scale1),
                    };
                    self.interpolation.interpolate_primary(e0, e1, energy, v0, v1)
                }
                None => self
                    .interpolation
                    .interpolate_primary(e0, e1, energy, eval(d0, mu), eval(d1, mu)),
            },
            TwoDGridPolicy::Correlated | TwoDGridPolicy::UnitBaseCorrelated => {
                let xi = self.correlated_cdf(lower, weight, energy, mu);
                match kind {
                    EvaluationKind::Cdf => xi,
                    _ => {
                        let sample = |d: &D| d.sample_with_random_number(xi);
                        let v0 = eval(d0, sample(d0));
                        let v1 = eval(d1, sample(d1));
                        if v0 > 0.0 && v1 > 0.0 {
                            // Density of a correlated mixture of two inverse CDFs
                            v0 * v1 / ((1.0 - weight) * v1 + weight * v0)
                        } else {
                            self.interpolation.interpolate_primary(e0, e1, energy, v0, v1)
                        }
                    }
                }
            }
        }
    }

    /// Map `mu` at the interpolated bounds onto each bracketing table. Returns
    /// the mapped cosines and the grid length ratios, or `None` when the
    /// unit-base transform is undefined (e.g. a log-cosine grid ending at 1).
    fn unit_base_points(&self, lower: usize, energy: f64, mu: f64) -> Option<((f64, f64), (f64, f64))> {
        let zy = self.interpolation.zy();
        let (e0, e1) = (self.energies[lower], self.energies[lower + 1]);
        let bounds0 = self.secondary_bounds(lower);
        let bounds1 = self.secondary_bounds(lower + 1);
        let min = self.interpolation.interpolate_secondary(e0, e1, energy, bounds0.0, bounds1.0);
        let max = self.interpolation.interpolate_secondary(e0, e1, energy, bounds0.1, bounds1.1);
        let length = usable_length(zy, min, max)?;
        let length0 = usable_length(zy, bounds0.0, bounds0.1)?;
        let length1 = usable_length(zy, bounds1.0, bounds1.1)?;
        let eta = zy.calculate_unit_base_indep_var(mu, min, length);
        let mu0 = zy.calculate_indep_var(eta, bounds0.0, length0);
        let mu1 = zy.calculate_indep_var(eta, bounds1.0, length1);
        Some(((mu0, length0 / length), (mu1, length1 / length)))
    }

    fn secondary_bounds(&self, index: usize) -> (f64, f64) {
        let d = &self.distributions[index];
        (d.lower_bound(), d.upper_bound().min(self.upper_bound_of_secondary))
    }

    /// Random number that a correlated sample needs to reach `mu`.
    fn correlated_cdf(&self, lower: usize, weight: f64, energy: f64, mu: f64) -> f64 {
        let sample = |xi: f64| {
            self.combine_correlated(lower, weight, energy, |d| d.sample_with_random_number(xi))
        };
        if mu <= sample(0.0) {
            return 0.0;
        }
        if mu >= sample(1.0) {
            return 1.0;
        }
        let tolerance = self.evaluation_tolerance * (1.0 - mu).abs().max(f64::EPSILON);
        let (mut low, mut high) = (0.0, 1.0);
        for _ in 0..MAX_CORRELATED_ITERATIONS {
            let mid = 0.5 * (low + high);
            let value = sample(mid);
            if (value - mu).abs() <= tolerance || high - low <= f64::EPSILON {
                return mid;
            }
            if value < mu {
                low = mid;
            } else {
                high = mid;
            }
        }
        0.5 * (low + high)
    }

    /// Combine per-table samples the way a correlated policy does.
    fn combine_correlated<F>(&self, lower: usize, weight: f64, energy: f64, sampler: F) -> f64
    where
        F: Fn(&D) -> f64,
    {
        let (e0, e1) = (self.energies[lower], self.energies[lower + 1]);
        let (d0, d1) = (&self.distributions[lower], &self.distributions[lower + 1]);
        let (mu0, mu1) = (sampler(d0), sampler(d1));
        if self.grid_policy == TwoDGridPolicy::UnitBaseCorrelated {
            if let Some(mu) = self.unit_base_correlated(lower, weight, energy, (mu0, mu1)) {
                return mu;
            }
        }
        self.interpolation.interpolate_secondary(e0, e1, energy, mu0, mu1)
    }

    fn unit_base_correlated(&self, lower: usize, weight: f64, energy: f64, samples: (f64, f64)) -> Option<f64> {
        let zy = self.interpolation.zy();
        let (e0, e1) = (self.energies[lower], self.energies[lower + 1]);
        let bounds0 = self.secondary_bounds(lower);
        let bounds1 = self.secondary_bounds(lower + 1);
        let length0 = usable_length(zy, bounds0.0, bounds0.1)?;
        let length1 = usable_length(zy, bounds1.0, bounds1.1)?;
        let eta0 = zy.calculate_unit_base_indep_var(samples.0, bounds0.0, length0);
        let eta1 = zy.calculate_unit_base_indep_var(samples.1, bounds1.0, length1);
        let eta = eta0 + weight * (eta1 - eta0);
        let min = self.interpolation.interpolate_secondary(e0, e1, energy, bounds0.0, bounds1.0);
        let max = self.interpolation.interpolate_secondary(e0, e1, energy, bounds0.1, bounds1.1);
        let length = usable_length(zy, min, max)?;
        Some(zy.calculate_indep_var(eta, min, length).clamp(min, max))
    }

    /// Sample an angle cosine at `energy`.
    pub fn sample_secondary_conditional(&self, energy: f64, rng: &mut dyn RngCore) -> Result<f64> {
        let xi = rng.gen::<f64>();
        let bin_random = rng.gen::<f64>();
        self.sample_with(energy, xi, Some(bin_random), |d, r| d.sample_with_random_number(r))
    }

    /// Sample with a single random number. Stochastic policies use the nearer table.
    pub fn sample_secondary_conditional_with_random_number(&self, energy: f64, random_number: f64) -> Result<f64> {
        self.sample_with(energy, random_number, None, |d, r| d.sample_with_random_number(r))
    }

    /// Sample an angle cosine no larger than `max_mu`.
    pub fn sample_secondary_conditional_in_subrange(
        &self,
        energy: f64,
        rng: &mut dyn RngCore,
        max_mu: f64,
    ) -> Result<f64> {
        let xi = rng.gen::<f64>();
        let bin_random = rng.gen::<f64>();
        self.sample_with(energy, xi, Some(bin_random), |d, r| d.sample_in_subrange(r, max_mu))
    }

    pub fn sample_secondary_conditional_with_random_number_in_subrange(
        &self,
        energy: f64,
        random_number: f64,
        max_mu: f64,
    ) -> Result<f64> {
        self.sample_with(energy, random_number, None, |d, r| d.sample_in_subrange(r, max_mu))
    }

    /// Apply the grid policy with a caller-supplied per-table sampler.
    ///
    /// `bin_random` selects the table for the stochastic policies; `None`
    /// selects the table nearer in processed energy.
    pub fn sample_with<F>(&self, energy: f64, random_number: f64, bin_random: Option<f64>, sampler: F) -> Result<f64>
    where
        F: Fn(&D, f64) -> f64,
    {
        let (lower, weight) = match self.bracket(energy)? {
            Bracket::Single(i) => return Ok(sampler(&self.distributions[i], random_number)),
            Bracket::Between { lower, weight } => (lower, weight),
        };
        let pick_upper = match bin_random {
            Some(r) => r < weight,
            None => weight >= 0.5,
        };
        let picked = if pick_upper { lower + 1 } else { lower };

        let mu = match self.grid_policy {
            TwoDGridPolicy::Direct => sampler(&self.distributions[picked], random_number),
            TwoDGridPolicy::UnitBase => {
                let sample = sampler(&self.distributions[picked], random_number);
                self.map_unit_base_sample(lower, energy, picked, sample).unwrap_or(sample)
            }
            TwoDGridPolicy::Correlated | TwoDGridPolicy::UnitBaseCorrelated => {
                self.combine_correlated(lower, weight, energy, |d| sampler(d, random_number))
            }
        };
        Ok(mu)
    }

    fn map_unit_base_sample(&self, lower: usize, energy: f64, picked: usize, sample: f64) -> Option<f64> {
        let zy = self.interpolation.zy();
        let (e0, e1) = (self.energies[lower], self.energies[lower + 1]);
        let bounds0 = self.secondary_bounds(lower);
        let bounds1 = self.secondary_bounds(lower + 1);
        let picked_bounds = self.secondary_bounds(picked);
        let picked_length = usable_length(zy, picked_bounds.0, picked_bounds.1)?;
        let eta = zy.calculate_unit_base_indep_var(sample, picked_bounds.0, picked_length);
        let min = self.interpolation.interpolate_secondary(e0, e1, energy, bounds0.0, bounds1.0);
        let max = self.interpolation.interpolate_secondary(e0, e1, energy, bounds0.1, bounds1.1);
        let length = usable_length(zy, min, max)?;
        Some(zy.calculate_indep_var(eta, min, length).clamp(min, max))
    }

    /// True when `energy` lies within `fuzzy_bound_tolerance` of a grid point.
    pub fn is_on_grid_point(&self, energy: f64) -> bool {
        let i = lower_bound_index(&self.energies, energy);
        let near = |e: f64| (energy - e).abs() <= self.fuzzy_bound_tolerance * e.abs();
        near(self.energies[i]) || (i + 1 < self.energies.len() && near(self.energies[i + 1]))
    }
}

fn usable_length(zy: Interpolation, min: f64, max: f64) -> Option<f64> {
    if !zy.is_indep_var_in_valid_range(min) || !zy.is_indep_var_in_valid_range(max) {
        return None;
    }
    let length = zy.calculate_unit_base_grid_length(min, max);
    if length.is_finite() && length > 0.0 {
        Some(length)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::TabularDistribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn linear_tables(policy: TwoDGridPolicy) -> ElasticBivariateDistribution<TabularDistribution> {
        // Uniform at 1 MeV, linearly forward-peaked at 10 MeV
        let d0 = TabularDistribution::new(vec![-1.0, 1.0], vec![0.5, 0.5], Interpolation::LinLin).unwrap();
        let d1 = TabularDistribution::new(vec![-1.0, 1.0], vec![0.0, 1.0], Interpolation::LinLin).unwrap();
        ElasticBivariateDistribution::new(
            vec![1.0, 10.0],
            vec![Arc::new(d0), Arc::new(d1)],
            TwoDInterpolation::LinLinLin,
            policy,
            1.0,
            DEFAULT_FUZZY_BOUND_TOL,
            1e-7,
        )
        .unwrap()
    }

    #[test]
    fn test_grid_policy_names() {
        for policy in [
            TwoDGridPolicy::Direct,
            TwoDGridPolicy::UnitBase,
            TwoDGridPolicy::Correlated,
            TwoDGridPolicy::UnitBaseCorrelated,
        ] {
            assert_eq!(policy.name().parse::<TwoDGridPolicy>().unwrap(), policy);
        }
        assert_eq!("UnitBaseCorrelated".parse::<TwoDGridPolicy>().unwrap(), TwoDGridPolicy::UnitBaseCorrelated);
        assert!("Stochastic".parse::<TwoDGridPolicy>().is_err());
    }

    #[test]
    fn test_evaluate_at_grid_points_and_outside() {
        let dist = linear_tables(TwoDGridPolicy::Direct);
        assert_eq!(dist.evaluate_pdf(1.0, 0.0), 0.5);
        assert_eq!(dist.evaluate_pdf(10.0, 1.0), 1.0);
        assert_eq!(dist.evaluate_pdf(0.5, 0.0), 0.0);
        assert_eq!(dist.evaluate_cdf(20.0, 0.0), 0.0);
    }

    #[test]
    fn test_direct_evaluation_interpolates() {
        let dist = linear_tables(TwoDGridPolicy::Direct);
        // Halfway in energy: (0.5 + 0.5)/2 at mu = 0
        assert!((dist.evaluate_pdf(5.5, 0.0) - 0.5).abs() < 1e-12);
        assert!((dist.evaluate_pdf(5.5, 1.0) - 0.75).abs() < 1e-12);
        assert!((dist.evaluate_cdf(5.5, 0.0) - 0.5 * (0.5 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_unit_base_matches_direct_for_shared_bounds() {
        let direct = linear_tables(TwoDGridPolicy::Direct);
        let unit_base = linear_tables(TwoDGridPolicy::UnitBase);
        for &mu in &[-0.9, -0.2, 0.4, 0.95] {
            assert!((direct.evaluate_pdf(3.0, mu) - unit_base.evaluate_pdf(3.0, mu)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_correlated_cdf_inverts_sampling() {
        let dist = linear_tables(TwoDGridPolicy::Correlated);
        for &xi in &[0.1, 0.5, 0.8] {
            let mu = dist.sample_secondary_conditional_with_random_number(4.0, xi).unwrap();
            assert!((dist.evaluate_cdf(4.0, mu) - xi).abs() < 1e-6);
        }
        assert!(dist.evaluate_pdf(4.0, 0.3) > 0.0);
    }

    #[test]
    fn test_sampling_bounds_and_errors() {
        let mut rng = StdRng::seed_from_u64(11);
        for policy in [
            TwoDGridPolicy::Direct,
            TwoDGridPolicy::UnitBase,
            TwoDGridPolicy::Correlated,
            TwoDGridPolicy::UnitBaseCorrelated,
        ] {
            let dist = linear_tables(policy);
            for _ in 0..200 {
                let mu = dist.sample_secondary_conditional(3.0, &mut rng).unwrap();
                assert!((-1.0..=1.0).contains(&mu), "{} gave {}", policy, mu);
                let mu = dist.sample_secondary_conditional_in_subrange(3.0, &mut rng, 0.2).unwrap();
                assert!(mu <= 0.2 + 1e-12, "{} gave {}", policy, mu);
            }
            assert!(dist.sample_secondary_conditional(0.5, &mut rng).is_err());
            // Above the grid the last table is used
            let mu = dist.sample_secondary_conditional_with_random_number(50.0, 0.25).unwrap();
            assert!((mu - 0.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_direct_sampling_picks_the_nearer_table() {
        let dist = linear_tables(TwoDGridPolicy::Direct);
        let low = dist.sample_secondary_conditional_with_random_number(2.0, 0.25).unwrap();
        assert!((low + 0.5).abs() < 1e-12);
        let high = dist.sample_secondary_conditional_with_random_number(9.0, 0.25).unwrap();
        assert!((high - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_grids() {
        let d = Arc::new(TabularDistribution::new(vec![-1.0, 1.0], vec![1.0, 1.0], Interpolation::LinLin).unwrap());
        assert!(ElasticBivariateDistribution::new(
            vec![2.0, 1.0],
            vec![d.clone(), d.clone()],
            TwoDInterpolation::LinLinLin,
            TwoDGridPolicy::Direct,
            1.0,
            1e-6,
            1e-7
        )
        .is_err());
        assert!(ElasticBivariateDistribution::new(
            vec![0.0, 1.0],
            vec![d.clone(), d.clone()],
            TwoDInterpolation::LogLogLog,
            TwoDGridPolicy::Direct,
            1.0,
            1e-6,
            1e-7
        )
        .is_err());
        assert!(ElasticBivariateDistribution::new(
            vec![1.0],
            vec![d.clone(), d],
            TwoDInterpolation::LinLinLin,
            TwoDGridPolicy::Direct,
            1.0,
            1e-6,
            1e-7
        )
        .is_err());
    }
}
