// Adjoint photoatomic reactions
use crate::bank::ParticleBank;
use crate::distribution::{AngularDistribution, TabularDistribution};
use crate::error::{CollisionError, Result};
use crate::incoherent_adjoint::THOMSON_MULTIPLIER;
use crate::particle::{Particle, ParticleType, ELECTRON_REST_MASS_ENERGY};
use crate::reaction::{AtomicReaction, StandardReaction};
use crate::reaction_type::{ReactionType, Subshell};
use crate::utilities::is_sorted_ascending;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, UnitSphere};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::warn;

/// Energy at which the adjoint pair production line sits (2 m_e c^2).
pub const PAIR_PRODUCTION_LINE_ENERGY: f64 = 2.0 * ELECTRON_REST_MASS_ENERGY;

/// Energy at which the adjoint triplet production line sits (4 m_e c^2).
pub const TRIPLET_PRODUCTION_LINE_ENERGY: f64 = 4.0 * ELECTRON_REST_MASS_ENERGY;

/// A reaction that only contributes its cross section. Used for the forward
/// total cross section needed by adjoint weighting.
#[derive(Debug, Clone)]
pub struct VoidAdjointPhotoatomicReaction {
    base: StandardReaction,
    reaction_type: ReactionType,
}

impl VoidAdjointPhotoatomicReaction {
    pub fn new(base: StandardReaction, reaction_type: impl Into<ReactionType>) -> Self {
        VoidAdjointPhotoatomicReaction {
            base,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }
}

impl AtomicReaction for VoidAdjointPhotoatomicReaction {
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

    fn differential_cross_section(&self, _incoming_energy: f64, _secondary_variable: f64) -> f64 {
        0.0
    }

    fn react(&self, _particle: &mut Particle, _bank: &mut ParticleBank, _rng: &mut dyn RngCore) -> Subshell {
        Subshell::Invalid
    }
}

/// Thomson angular pdf `3/8 (1 + mu^2)` on `[-1, 1]`.
pub fn thomson_pdf(mu: f64) -> f64 {
    if !(-1.0..=1.0).contains(&mu) {
        return 0.0;
    }
    0.375 * (1.0 + mu * mu)
}

pub fn thomson_cdf(mu: f64) -> f64 {
    let mu = mu.clamp(-1.0, 1.0);
    0.125 * (mu * mu * mu + 3.0 * mu + 4.0)
}

/// Invert the Thomson CDF. `mu^3 + 3 mu + (4 - 8 xi) = 0` has a single real
/// root, found with Cardano's formula.
pub fn sample_thomson(random_number: f64) -> f64 {
    let q = 4.0 - 8.0 * random_number.clamp(0.0, 1.0);
    let root = (0.25 * q * q + 1.0).sqrt();
    ((-0.5 * q + root).cbrt() + (-0.5 * q - root).cbrt()).clamp(-1.0, 1.0)
}

/// Planck constant times the speed of light in MeV cm.
pub const PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT: f64 = 1.23984193e-10;

const MAX_FORM_FACTOR_TRIALS: usize = 10_000;
const FORM_FACTOR_PANELS_PER_BIN: usize = 8;

/// Squared momentum transfer `x^2` (cm^-2) for a photon of `energy`
/// scattering through `mu`.
pub fn squared_momentum_transfer(energy: f64, mu: f64) -> f64 {
    let e = energy / PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT;
    0.5 * e * e * (1.0 - mu)
}

/// Coherent scattering weighted by the squared atomic form factor.
///
/// The form factor is tabulated against squared momentum transfer. Sampling
/// draws `x^2` from `F^2` restricted to the reachable range and accepts the
/// implied cosine with the Thomson factor `(1 + mu^2) / 2`.
#[derive(Debug, Clone)]
pub struct FormFactorCoherentScattering {
    form_factor_squared: TabularDistribution,
}

impl FormFactorCoherentScattering {
    pub fn new(form_factor_squared: TabularDistribution) -> Result<Self> {
        if form_factor_squared.lower_bound() != 0.0 {
            return Err(CollisionError::InvalidDistribution(format!(
                "squared form factor must start at zero momentum, starts at {}",
                form_factor_squared.lower_bound()
            )));
        }
        Ok(FormFactorCoherentScattering { form_factor_squared })
    }

    pub fn form_factor_squared(&self) -> &TabularDistribution {
        &self.form_factor_squared
    }

    /// Differential cross section in the scattering angle cosine (b).
    pub fn evaluate(&self, energy: f64, mu: f64) -> f64 {
        if !(-1.0..=1.0).contains(&mu) {
            return 0.0;
        }
        let form_factor = self.form_factor_squared.evaluate(squared_momentum_transfer(energy, mu));
        THOMSON_MULTIPLIER * (1.0 + mu * mu) * form_factor
    }

    /// Cross section integrated over all cosines. Integrates in `x^2`
    /// bin by bin so the form factor kinks fall on panel edges.
    pub fn integrated_cross_section(&self, energy: f64) -> f64 {
        let max_squared_momentum = squared_momentum_transfer(energy, -1.0);
        if !(max_squared_momentum > 0.0) {
            return 0.0;
        }
        let grid = self.form_factor_squared.x();
        let mut edges: Vec<f64> = grid.iter().copied().take_while(|&x| x < max_squared_momentum).collect();
        edges.push(max_squared_momentum.min(self.form_factor_squared.upper_bound()));
        let to_mu = |x: f64| 1.0 - 2.0 * x / max_squared_momentum;
        let n = FORM_FACTOR_PANELS_PER_BIN;
        let integral: f64 = edges
            .windows(2)
            .map(|bin| {
                let h = (bin[1] - bin[0]) / n as f64;
                let sum: f64 = (0..=n)
                    .map(|i| {
                        let weight = if i == 0 || i == n {
                            1.0
                        } else if i % 2 == 1 {
                            4.0
                        } else {
                            2.0
                        };
                        weight * self.evaluate(energy, to_mu(bin[0] + i as f64 * h))
                    })
                    .sum();
                sum * h / 3.0
            })
            .sum();
        integral * 2.0 / max_squared_momentum
    }

    pub fn evaluate_pdf(&self, energy: f64, mu: f64) -> f64 {
        let value = self.evaluate(energy, mu);
        if value > 0.0 {
            value / self.integrated_cross_section(energy)
        } else {
            0.0
        }
    }

    pub fn sample(&self, energy: f64, rng: &mut dyn RngCore) -> Result<f64> {
        let max_squared_momentum = squared_momentum_transfer(energy, -1.0);
        if !(max_squared_momentum > 0.0) {
            return Err(CollisionError::OutOfRange {
                value: energy,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        for _ in 0..MAX_FORM_FACTOR_TRIALS {
            let squared_momentum = self
                .form_factor_squared
                .sample_in_subrange(rng.gen::<f64>(), max_squared_momentum);
            let mu = (1.0 - 2.0 * squared_momentum / max_squared_momentum).clamp(-1.0, 1.0);
            if rng.gen::<f64>() <= 0.5 * (1.0 + mu * mu) {
                return Ok(mu);
            }
        }
        Err(CollisionError::InvalidDistribution(format!(
            "form factor sampling at {} MeV exceeded {} trials",
            energy, MAX_FORM_FACTOR_TRIALS
        )))
    }
}

/// Coherent (Rayleigh) adjoint scattering: energy is unchanged. The direction
/// follows the Thomson distribution, or the form-factor weighted one when a
/// form factor is attached.
#[derive(Debug, Clone)]
pub struct CoherentAdjointReaction {
    base: StandardReaction,
    form_factor: Option<Arc<FormFactorCoherentScattering>>,
    reaction_type: ReactionType,
}

impl CoherentAdjointReaction {
    pub fn new(base: StandardReaction, reaction_type: impl Into<ReactionType>) -> Self {
        CoherentAdjointReaction {
            base,
            form_factor: None,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn with_form_factor(
        base: StandardReaction,
        form_factor: Arc<FormFactorCoherentScattering>,
        reaction_type: impl Into<ReactionType>,
    ) -> Self {
        CoherentAdjointReaction {
            base,
            form_factor: Some(form_factor),
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }

    pub fn form_factor(&self) -> Option<&Arc<FormFactorCoherentScattering>> {
        self.form_factor.as_ref()
    }
}

impl AtomicReaction for CoherentAdjointReaction {
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
        let pdf = match &self.form_factor {
            Some(form_factor) => form_factor.evaluate_pdf(incoming_energy, mu),
            None => thomson_pdf(mu),
        };
        self.base.cross_section(incoming_energy) * pdf
    }

    fn react(&self, particle: &mut Particle, _bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        let mu = match &self.form_factor {
            Some(form_factor) => match form_factor.sample(particle.energy, rng) {
                Ok(mu) => mu,
                Err(err) => {
                    warn!(reaction = %self.reaction_type, energy = particle.energy, "coherent scatter skipped: {}", err);
                    return Subshell::Invalid;
                }
            },
            None => sample_thomson(rng.gen::<f64>()),
        };
        particle.collision_number += 1;
        particle.rotate_direction(mu, 2.0 * PI * rng.gen::<f64>());
        Subshell::Invalid
    }
}

/// An adjoint reaction that only happens at one line energy.
///
/// An adjoint photon sitting exactly at the line energy is sent to an energy
/// sampled from the tabulated outgoing energy distribution, isotropically.
/// Non-probe particles also bank a probe at every critical line energy the
/// distribution covers.
#[derive(Debug, Clone)]
pub struct LineEnergyAdjointReaction {
    line_energy: f64,
    cross_section: f64,
    energy_distribution: Arc<TabularDistribution>,
    critical_line_energies: Arc<Vec<f64>>,
    reaction_type: ReactionType,
}

impl LineEnergyAdjointReaction {
    pub fn new(
        line_energy: f64,
        cross_section: f64,
        energy_distribution: Arc<TabularDistribution>,
        reaction_type: impl Into<ReactionType>,
    ) -> Result<Self> {
        if !(line_energy > 0.0) {
            return Err(CollisionError::InvalidGrid(format!(
                "line energy must be positive, got {}",
                line_energy
            )));
        }
        if !(cross_section >= 0.0) || !cross_section.is_finite() {
            return Err(CollisionError::InvalidCrossSection(format!(
                "line energy cross section must be finite and non-negative, got {}",
                cross_section
            )));
        }
        if energy_distribution.lower_bound() < line_energy {
            return Err(CollisionError::InvalidDistribution(format!(
                "outgoing energies start at {} below the line energy {}",
                energy_distribution.lower_bound(),
                line_energy
            )));
        }
        Ok(LineEnergyAdjointReaction {
            line_energy,
            cross_section,
            energy_distribution,
            critical_line_energies: Arc::new(Vec::new()),
            reaction_type: reaction_type.into(),
        })
    }

    pub fn set_critical_line_energies(&mut self, energies: Arc<Vec<f64>>) -> Result<()> {
        if !is_sorted_ascending(&energies) {
            return Err(CollisionError::InvalidGrid(
                "critical line energies must be sorted ascending".to_string(),
            ));
        }
        self.critical_line_energies = energies;
        Ok(())
    }

    pub fn critical_line_energies(&self) -> &[f64] {
        &self.critical_line_energies
    }

    pub fn line_energy(&self) -> f64 {
        self.line_energy
    }

    pub fn energy_distribution(&self) -> &Arc<TabularDistribution> {
        &self.energy_distribution
    }

    fn create_probes(&self, particle: &Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) {
        let lower = self.energy_distribution.lower_bound();
        let upper = self.energy_distribution.upper_bound();
        for &energy in self.critical_line_energies.iter().filter(|e| **e >= lower && **e <= upper) {
            let direction: [f64; 3] = UnitSphere.sample(rng);
            let mut probe = particle.spawn(ParticleType::AdjointPhoton, direction, energy);
            probe.weight *= self.energy_distribution.evaluate_pdf(energy);
            probe.probe = true;
            bank.push(probe);
        }
    }
}

impl AtomicReaction for LineEnergyAdjointReaction {
    fn cross_section(&self, energy: f64) -> f64 {
        if energy == self.line_energy {
            self.cross_section
        } else {
            0.0
        }
    }

    fn cross_section_in_bin(&self, energy: f64, _bin_index: usize) -> f64 {
        self.cross_section(energy)
    }

    fn threshold_energy(&self) -> f64 {
        self.line_energy
    }

    fn max_energy(&self) -> f64 {
        self.line_energy
    }

    fn is_energy_within_energy_grid(&self, energy: f64) -> bool {
        energy == self.line_energy
    }

    fn reaction_type(&self) -> ReactionType {
        self.reaction_type
    }

    fn differential_cross_section(&self, incoming_energy: f64, outgoing_energy: f64) -> f64 {
        self.cross_section(incoming_energy) * self.energy_distribution.evaluate_pdf(outgoing_energy)
    }

    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        particle.collision_number += 1;
        if !particle.probe {
            self.create_probes(particle, bank, rng);
        }
        particle.energy = self.energy_distribution.sample(rng);
        let direction: [f64; 3] = UnitSphere.sample(rng);
        particle.direction = direction;
        Subshell::Invalid
    }
}
