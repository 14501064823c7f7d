// Incoherent (Compton) adjoint photon scattering
use crate::bank::ParticleBank;
use crate::error::{CollisionError, Result};
use crate::interpolation::Interpolation;
use crate::particle::{Particle, ParticleType, ELECTRON_REST_MASS_ENERGY};
use crate::reaction::{AtomicReaction, StandardReaction};
use crate::reaction_type::{ReactionType, Subshell};
use crate::relaxation_data::Table;
use crate::utilities::{bin_index, is_sorted_ascending};
use rand::{Rng, RngCore};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::warn;

/// Classical electron radius in cm.
pub const CLASSICAL_ELECTRON_RADIUS: f64 = 2.8179403227e-13;

/// `pi r_e^2` in barns.
pub const THOMSON_MULTIPLIER: f64 = PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS * 1e24;

const MAX_SAMPLING_TRIALS: usize = 10_000;

// Simpson intervals used when the integrated cross section is needed for a pdf
const INTEGRATION_INTERVALS: usize = 512;

/// Energy a forward photon had before scattering through `mu` into `energy`.
pub fn adjoint_compton_line_energy(energy: f64, mu: f64) -> f64 {
    let denominator = ELECTRON_REST_MASS_ENERGY - energy * (1.0 - mu);
    if denominator > 0.0 {
        ELECTRON_REST_MASS_ENERGY * energy / denominator
    } else {
        f64::INFINITY
    }
}

/// Smallest reachable scattering cosine with no cap on the outgoing energy.
pub fn absolute_min_scattering_angle_cosine(energy: f64) -> f64 {
    if energy <= 0.5 * ELECTRON_REST_MASS_ENERGY {
        -1.0
    } else {
        1.0 - ELECTRON_REST_MASS_ENERGY / energy
    }
}

/// Smallest scattering cosine whose outgoing energy stays at or below `max_energy`.
pub fn min_scattering_angle_cosine(energy: f64, max_energy: f64) -> f64 {
    if energy >= max_energy {
        return 1.0;
    }
    let mu = 1.0 - ELECTRON_REST_MASS_ENERGY * (1.0 / energy - 1.0 / max_energy);
    mu.max(absolute_min_scattering_angle_cosine(energy))
}

pub fn absolute_min_inverse_energy_gain_ratio(energy: f64) -> f64 {
    (1.0 - 2.0 * energy / ELECTRON_REST_MASS_ENERGY).max(0.0)
}

/// Smallest `energy / outgoing_energy` with the outgoing energy capped at `max_energy`.
pub fn min_inverse_energy_gain_ratio(energy: f64, max_energy: f64) -> f64 {
    if energy >= max_energy {
        return 1.0;
    }
    (energy / max_energy).max(absolute_min_inverse_energy_gain_ratio(energy))
}

/// Largest electron momentum projection (units of `m_e c`) that lets a
/// photon of `incoming_energy` knock a bound electron out while scattering
/// through `mu`.
pub fn max_electron_momentum_projection(incoming_energy: f64, binding_energy: f64, mu: f64) -> f64 {
    let transfer = incoming_energy * (incoming_energy - binding_energy) * (1.0 - mu);
    let numerator = transfer - ELECTRON_REST_MASS_ENERGY * binding_energy;
    let denominator = ELECTRON_REST_MASS_ENERGY * (2.0 * transfer + binding_energy * binding_energy).sqrt();
    if denominator > 0.0 {
        numerator / denominator
    } else {
        -1.0
    }
}

/// Cumulative occupation number of a subshell against electron momentum
/// projection, held constant past the table ends.
#[derive(Debug, Clone)]
pub struct OccupationNumber {
    table: Table,
}

impl OccupationNumber {
    pub fn new(table: Table) -> Result<Self> {
        if table.grid.len() < 2 || table.grid.len() != table.values.len() || !is_sorted_ascending(&table.grid) {
            return Err(CollisionError::InvalidDistribution(
                "occupation number needs at least 2 sorted momentum points".to_string(),
            ));
        }
        if let Some(bad) = table.values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(CollisionError::InvalidDistribution(format!(
                "occupation numbers must lie in [0, 1], found {}",
                bad
            )));
        }
        Ok(OccupationNumber { table })
    }

    pub fn evaluate(&self, momentum: f64) -> f64 {
        let grid = &self.table.grid;
        let values = &self.table.values;
        if momentum <= grid[0] {
            return values[0];
        }
        if momentum >= grid[grid.len() - 1] {
            return values[values.len() - 1];
        }
        let i = bin_index(grid, momentum);
        Interpolation::LinLin.interpolate(grid[i], grid[i + 1], momentum, values[i], values[i + 1])
    }
}

/// Electron binding treatment.
#[derive(Debug, Clone)]
pub enum IncoherentAdjointModel {
    /// Free electrons at rest.
    KleinNishina,
    /// A single bound subshell in the impulse approximation.
    Subshell {
        subshell: Subshell,
        binding_energy: f64,
        occupation_number: Arc<OccupationNumber>,
    },
}

/// Adjoint incoherent scattering up to a maximum energy.
///
/// The adjoint photon gains energy: the outgoing energy lies on the adjoint
/// Compton line and never exceeds `max_energy`. Angles are sampled with the
/// two-branch rejection scheme on the inverse energy gain ratio; the subshell
/// model then rejects on the occupation number.
#[derive(Debug, Clone)]
pub struct IncoherentAdjointScattering {
    max_energy: f64,
    model: IncoherentAdjointModel,
}

impl IncoherentAdjointScattering {
    pub fn new(max_energy: f64, model: IncoherentAdjointModel) -> Result<Self> {
        if !(max_energy > 0.0) || !max_energy.is_finite() {
            return Err(CollisionError::InvalidDistribution(format!(
                "max energy must be finite and positive, got {}",
                max_energy
            )));
        }
        if let IncoherentAdjointModel::Subshell { binding_energy, .. } = &model {
            let binding_energy = *binding_energy;
            if !(binding_energy >= 0.0) || binding_energy >= max_energy {
                return Err(CollisionError::InvalidDistribution(format!(
                    "binding energy {} must be non-negative and below the max energy {}",
                    binding_energy, max_energy
                )));
            }
        }
        Ok(IncoherentAdjointScattering { max_energy, model })
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    pub fn model(&self) -> &IncoherentAdjointModel {
        &self.model
    }

    pub fn subshell(&self) -> Subshell {
        match &self.model {
            IncoherentAdjointModel::KleinNishina => Subshell::Invalid,
            IncoherentAdjointModel::Subshell { subshell, .. } => *subshell,
        }
    }

    fn binding_energy(&self) -> f64 {
        match &self.model {
            IncoherentAdjointModel::KleinNishina => 0.0,
            IncoherentAdjointModel::Subshell { binding_energy, .. } => *binding_energy,
        }
    }

    /// Probability that the bound electron can absorb the momentum transfer;
    /// always 1 for free electrons.
    fn binding_factor(&self, outgoing_energy: f64, energy: f64, mu: f64) -> f64 {
        match &self.model {
            IncoherentAdjointModel::KleinNishina => 1.0,
            IncoherentAdjointModel::Subshell {
                binding_energy,
                occupation_number,
                ..
            } => {
                if outgoing_energy - energy < *binding_energy {
                    return 0.0;
                }
                occupation_number.evaluate(max_electron_momentum_projection(outgoing_energy, *binding_energy, mu))
            }
        }
    }

    /// Cross section differential in the scattering angle cosine (b).
    pub fn evaluate(&self, energy: f64, mu: f64) -> f64 {
        if !(energy > 0.0) || mu > 1.0 || mu < min_scattering_angle_cosine(energy, self.max_energy) {
            return 0.0;
        }
        let outgoing_energy = adjoint_compton_line_energy(energy, mu);
        if !outgoing_energy.is_finite() {
            return 0.0;
        }
        let klein_nishina =
            THOMSON_MULTIPLIER * (outgoing_energy / energy + energy / outgoing_energy - 1.0 + mu * mu);
        klein_nishina * self.binding_factor(outgoing_energy, energy, mu)
    }

    /// Cross section integrated over the reachable cosines (Simpson's rule).
    pub fn integrated_cross_section(&self, energy: f64) -> f64 {
        let lower = min_scattering_angle_cosine(energy, self.max_energy);
        if !(lower < 1.0) {
            return 0.0;
        }
        let n = INTEGRATION_INTERVALS;
        let h = (1.0 - lower) / n as f64;
        let sum: f64 = (0..=n)
            .map(|i| {
                let weight = if i == 0 || i == n {
                    1.0
                } else if i % 2 == 1 {
                    4.0
                } else {
                    2.0
                };
                weight * self.evaluate(energy, lower + i as f64 * h)
            })
            .sum();
        sum * h / 3.0
    }

    pub fn evaluate_pdf(&self, energy: f64, mu: f64) -> f64 {
        let value = self.evaluate(energy, mu);
        if value > 0.0 {
            value / self.integrated_cross_section(energy)
        } else {
            0.0
        }
    }

    /// Energy of interest reachable from `energy` in one scatter.
    pub fn is_energy_in_scattering_window(&self, energy_of_interest: f64, energy: f64) -> bool {
        if energy_of_interest > self.max_energy || energy > energy_of_interest {
            return false;
        }
        let lower_boundary = energy_of_interest / (1.0 + 2.0 * energy_of_interest / ELECTRON_REST_MASS_ENERGY);
        energy >= lower_boundary
    }

    /// Sample `(outgoing_energy, mu)` for an adjoint photon of `energy`.
    pub fn sample(&self, energy: f64, rng: &mut dyn RngCore) -> Result<(f64, f64)> {
        if !(energy > 0.0) || energy + self.binding_energy() >= self.max_energy {
            return Err(CollisionError::OutOfRange {
                value: energy,
                min: 0.0,
                max: self.max_energy - self.binding_energy(),
            });
        }
        let alpha = energy / ELECTRON_REST_MASS_ENERGY;
        let min_ratio = min_inverse_energy_gain_ratio(energy, self.max_energy);
        let branch_value = (1.0 - min_ratio) / (1.0 + min_ratio);
        let min_mu = min_scattering_angle_cosine(energy, self.max_energy);

        for _ in 0..MAX_SAMPLING_TRIALS {
            let branch = rng.gen::<f64>();
            let ratio = min_ratio + rng.gen::<f64>() * (1.0 - min_ratio);
            let rejection = rng.gen::<f64>();
            let mu = 1.0 - (1.0 - ratio) / alpha;
            let accepted = if branch <= branch_value {
                rejection <= min_ratio / (1.0 - min_ratio) * (1.0 / ratio - 1.0)
            } else {
                rejection <= 0.5 * (mu * mu + ratio)
            };
            if !accepted {
                continue;
            }
            let mu = mu.clamp(min_mu, 1.0);
            let outgoing_energy = energy / ratio;
            if let IncoherentAdjointModel::Subshell { .. } = self.model {
                if rng.gen::<f64>() >= self.binding_factor(outgoing_energy, energy, mu) {
                    continue;
                }
            }
            return Ok((outgoing_energy, mu));
        }
        Err(CollisionError::InvalidDistribution(format!(
            "incoherent adjoint sampling at {} MeV exceeded {} trials",
            energy, MAX_SAMPLING_TRIALS
        )))
    }

    /// A probe at `energy_of_interest` weighted by the pdf in outgoing
    /// energy, or `None` when the energy cannot be reached.
    pub fn create_probe(&self, particle: &Particle, energy_of_interest: f64, rng: &mut dyn RngCore) -> Option<Particle> {
        if !self.is_energy_in_scattering_window(energy_of_interest, particle.energy) {
            return None;
        }
        let mu = (1.0 - ELECTRON_REST_MASS_ENERGY * (1.0 / particle.energy - 1.0 / energy_of_interest)).clamp(-1.0, 1.0);
        // d(mu)/d(E') on the adjoint Compton line
        let jacobian = ELECTRON_REST_MASS_ENERGY / (energy_of_interest * energy_of_interest);
        let weight_multiplier = self.evaluate_pdf(particle.energy, mu) * jacobian;
        if !(weight_multiplier > 0.0) {
            return None;
        }
        let mut probe = particle.spawn(ParticleType::AdjointPhoton, particle.direction, energy_of_interest);
        probe.rotate_direction(mu, 2.0 * PI * rng.gen::<f64>());
        probe.weight *= weight_multiplier;
        probe.probe = true;
        Some(probe)
    }
}

/// Incoherent adjoint reaction (free electron or one subshell).
#[derive(Debug, Clone)]
pub struct IncoherentAdjointReaction {
    base: StandardReaction,
    scattering: Arc<IncoherentAdjointScattering>,
    critical_line_energies: Arc<Vec<f64>>,
    reaction_type: ReactionType,
}

impl IncoherentAdjointReaction {
    pub fn new(
        base: StandardReaction,
        scattering: Arc<IncoherentAdjointScattering>,
        reaction_type: impl Into<ReactionType>,
    ) -> Self {
        IncoherentAdjointReaction {
            base,
            scattering,
            critical_line_energies: Arc::new(Vec::new()),
            reaction_type: reaction_type.into(),
        }
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

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }

    pub fn scattering(&self) -> &Arc<IncoherentAdjointScattering> {
        &self.scattering
    }
}

impl AtomicReaction for IncoherentAdjointReaction {
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
        self.base.cross_section(incoming_energy) * self.scattering.evaluate_pdf(incoming_energy, mu)
    }

    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        let (outgoing_energy, mu) = match self.scattering.sample(particle.energy, rng) {
            Ok(sample) => sample,
            Err(err) => {
                warn!(reaction = %self.reaction_type, energy = particle.energy, "incoherent scatter skipped: {}", err);
                return Subshell::Invalid;
            }
        };
        if !particle.probe {
            for &energy in self.critical_line_energies.iter() {
                if let Some(probe) = self.scattering.create_probe(particle, energy, rng) {
                    bank.push(probe);
                }
            }
        }
        particle.collision_number += 1;
        particle.energy = outgoing_energy;
        particle.rotate_direction(mu, 2.0 * PI * rng.gen::<f64>());
        self.scattering.subshell()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction_type::AdjointPhotoatomicReactionType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn free(max_energy: f64) -> IncoherentAdjointScattering {
        IncoherentAdjointScattering::new(max_energy, IncoherentAdjointModel::KleinNishina).unwrap()
    }

    fn k_shell(max_energy: f64) -> IncoherentAdjointScattering {
        let occupation = OccupationNumber::new(Table::new(vec![-1.0, 0.0, 1.0], vec![0.0, 0.5, 1.0])).unwrap();
        IncoherentAdjointScattering::new(
            max_energy,
            IncoherentAdjointModel::Subshell {
                subshell: Subshell::K,
                binding_energy: 1e-2,
                occupation_number: Arc::new(occupation),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_kinematics() {
        assert!((adjoint_compton_line_energy(0.1, -1.0) - 0.16430890706337203).abs() < 1e-12);
        assert!((adjoint_compton_line_energy(0.1, 1.0) - 0.1).abs() < 1e-15);
        assert_eq!(absolute_min_scattering_angle_cosine(0.1), -1.0);
        assert!((absolute_min_scattering_angle_cosine(1.0) - 0.48900109).abs() < 1e-8);
        assert!((min_scattering_angle_cosine(0.09, 0.1) - 0.4322234333333336).abs() < 1e-9);
        assert!((min_scattering_angle_cosine(0.3, 10.0) + 0.652229809).abs() < 1e-9);
        assert_eq!(min_scattering_angle_cosine(0.1, 0.1), 1.0);
        assert!((absolute_min_inverse_energy_gain_ratio(0.1) - 0.6086097326508975).abs() < 1e-9);
        assert!((min_inverse_energy_gain_ratio(0.01, 0.1) - 0.9608609732650898).abs() < 1e-9);
        assert!((min_inverse_energy_gain_ratio(0.09, 0.1) - 0.9).abs() < 1e-12);
        assert_eq!(min_inverse_energy_gain_ratio(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_samples_stay_on_compton_line() {
        let scattering = free(20.0);
        let mut rng = StdRng::seed_from_u64(31);
        for energy in [0.01, 0.1, 1.0, 10.0] {
            let min_mu = min_scattering_angle_cosine(energy, 20.0);
            for _ in 0..200 {
                let (outgoing, mu) = scattering.sample(energy, &mut rng).unwrap();
                assert!(mu >= min_mu && mu <= 1.0);
                assert!(outgoing >= energy && outgoing <= 20.0 * (1.0 + 1e-12));
                let line = adjoint_compton_line_energy(energy, mu);
                assert!((line - outgoing).abs() / outgoing < 1e-9);
            }
        }
    }

    #[test]
    fn test_pdf_integrates_to_one() {
        let scattering = free(20.0);
        let energy = 0.5;
        let lower = min_scattering_angle_cosine(energy, 20.0);
        let n = 4000;
        let h = (1.0 - lower) / n as f64;
        let area: f64 = (0..n)
            .map(|i| scattering.evaluate_pdf(energy, lower + (i as f64 + 0.5) * h) * h)
            .sum();
        assert!((area - 1.0).abs() < 1e-4, "area {}", area);
        assert_eq!(scattering.evaluate(energy, lower - 1e-3), 0.0);
    }

    #[test]
    fn test_subshell_respects_binding_energy() {
        let scattering = k_shell(20.0);
        let mut rng = StdRng::seed_from_u64(32);
        for _ in 0..200 {
            let (outgoing, _) = scattering.sample(0.2, &mut rng).unwrap();
            assert!(outgoing - 0.2 >= 1e-2);
        }
        // Forward scattering transfers no energy and cannot free a bound electron
        assert_eq!(scattering.evaluate(0.2, 1.0), 0.0);
        assert!(scattering.evaluate(0.2, 0.0) < free(20.0).evaluate(0.2, 0.0));
        assert_eq!(scattering.subshell(), Subshell::K);
        assert!(scattering.sample(19.995, &mut rng).is_err());
    }

    #[test]
    fn test_scattering_window() {
        let scattering = free(20.0);
        assert!(scattering.is_energy_in_scattering_window(1.0, 0.5));
        assert!(!scattering.is_energy_in_scattering_window(1.0, 1.5));
        assert!(!scattering.is_energy_in_scattering_window(1.0, 0.1));
        assert!(!scattering.is_energy_in_scattering_window(30.0, 25.0));
    }

    #[test]
    fn test_reaction_banks_critical_line_photons() {
        let base = StandardReaction::new(
            Arc::new(vec![1e-3, 1.0, 20.0]),
            Arc::new(vec![1.0, 0.5, 0.2]),
            0,
            Interpolation::LinLin,
        )
        .unwrap();
        let mut reaction = IncoherentAdjointReaction::new(
            base,
            Arc::new(free(20.0)),
            AdjointPhotoatomicReactionType::TotalIncoherent,
        );
        reaction
            .set_critical_line_energies(Arc::new(vec![ELECTRON_REST_MASS_ENERGY, 5.0]))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(33);
        let mut bank = ParticleBank::new();
        let mut photon = Particle::adjoint_photon(0.3);

        assert_eq!(reaction.react(&mut photon, &mut bank, &mut rng), Subshell::Invalid);
        assert_eq!(photon.collision_number, 1);
        assert!(photon.energy >= 0.3);
        // 5 MeV needs at least 5 / (1 + 2 * 5 / m_e) = 0.243 MeV, 0.511 MeV is in range too
        assert_eq!(bank.len(), 2);
        while let Some(line_photon) = bank.pop() {
            assert!(line_photon.probe);
            assert!(line_photon.weight > 0.0);
        }

        let mut line_photon = Particle::adjoint_photon(0.3);
        line_photon.probe = true;
        reaction.react(&mut line_photon, &mut bank, &mut rng);
        assert!(bank.is_empty());
    }
}
