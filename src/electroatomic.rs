// Inelastic electroatomic and positronatomic reactions
use crate::bank::ParticleBank;
use crate::energy_loss::{BremsstrahlungScattering, ElectroionizationSubshellScattering};
use crate::error::{CollisionError, Result};
use crate::interpolation::Interpolation;
use crate::particle::{Particle, ParticleType, ELECTRON_REST_MASS_ENERGY};
use crate::reaction::{AtomicReaction, StandardReaction};
use crate::reaction_type::{ReactionType, Subshell};
use crate::relaxation_data::Table;
use crate::utilities::{bin_index, is_sorted_ascending};
use rand::RngCore;
use rand_distr::{Distribution, UnitSphere};
use std::sync::Arc;
use tracing::warn;

/// Atomic excitation: the electron keeps its direction and loses a tabulated
/// amount of energy.
#[derive(Debug, Clone)]
pub struct AtomicExcitationReaction {
    base: StandardReaction,
    energy_loss: Table,
    reaction_type: ReactionType,
}

impl AtomicExcitationReaction {
    pub fn new(base: StandardReaction, energy_loss: Table, reaction_type: impl Into<ReactionType>) -> Result<Self> {
        if energy_loss.grid.len() < 2 || energy_loss.grid.len() != energy_loss.values.len() {
            return Err(CollisionError::MissingData(format!(
                "atomic excitation energy loss needs at least 2 matching points ({} grid, {} values)",
                energy_loss.grid.len(),
                energy_loss.values.len()
            )));
        }
        if !is_sorted_ascending(&energy_loss.grid) {
            return Err(CollisionError::InvalidGrid(
                "atomic excitation energy loss grid must be ascending".to_string(),
            ));
        }
        Ok(AtomicExcitationReaction {
            base,
            energy_loss,
            reaction_type: reaction_type.into(),
        })
    }

    /// Energy lost at `energy`, held constant past either end of the table.
    pub fn energy_loss(&self, energy: f64) -> f64 {
        let grid = &self.energy_loss.grid;
        let values = &self.energy_loss.values;
        if energy <= grid[0] {
            return values[0];
        }
        if energy >= grid[grid.len() - 1] {
            return values[values.len() - 1];
        }
        let i = bin_index(grid, energy);
        Interpolation::LinLin.interpolate(grid[i], grid[i + 1], energy, values[i], values[i + 1])
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }
}

impl AtomicReaction for AtomicExcitationReaction {
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

    /// The outgoing energy is fixed, so only that energy has a nonzero value.
    fn differential_cross_section(&self, incoming_energy: f64, outgoing_energy: f64) -> f64 {
        if outgoing_energy == incoming_energy - self.energy_loss(incoming_energy) {
            self.base.cross_section(incoming_energy)
        } else {
            0.0
        }
    }

    fn react(&self, particle: &mut Particle, _bank: &mut ParticleBank, _rng: &mut dyn RngCore) -> Subshell {
        particle.collision_number += 1;
        let outgoing_energy = particle.energy - self.energy_loss(particle.energy);
        if outgoing_energy <= 0.0 {
            particle.energy = 0.0;
            particle.kill();
        } else {
            particle.energy = outgoing_energy;
        }
        Subshell::Invalid
    }
}

/// Terminates the history. Used for the total absorption reaction.
#[derive(Debug, Clone)]
pub struct AbsorptionReaction {
    base: StandardReaction,
    reaction_type: ReactionType,
}

impl AbsorptionReaction {
    pub fn new(base: StandardReaction, reaction_type: impl Into<ReactionType>) -> Self {
        AbsorptionReaction {
            base,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }
}

impl AtomicReaction for AbsorptionReaction {
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

    fn react(&self, particle: &mut Particle, _bank: &mut ParticleBank, _rng: &mut dyn RngCore) -> Subshell {
        particle.collision_number += 1;
        particle.kill();
        Subshell::Invalid
    }
}

/// Positron annihilation at rest into two back-to-back photons.
#[derive(Debug, Clone)]
pub struct PositronAnnihilationReaction {
    base: StandardReaction,
    reaction_type: ReactionType,
}

impl PositronAnnihilationReaction {
    pub fn new(base: StandardReaction, reaction_type: impl Into<ReactionType>) -> Self {
        PositronAnnihilationReaction {
            base,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }
}

impl AtomicReaction for PositronAnnihilationReaction {
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

    fn number_of_emitted_photons(&self, _energy: f64) -> u32 {
        2
    }

    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        particle.collision_number += 1;
        let [u, v, w]: [f64; 3] = UnitSphere.sample(rng);
        bank.push(particle.spawn(ParticleType::Photon, [u, v, w], ELECTRON_REST_MASS_ENERGY));
        bank.push(particle.spawn(ParticleType::Photon, [-u, -v, -w], ELECTRON_REST_MASS_ENERGY));
        particle.kill();
        Subshell::Invalid
    }
}

/// Electro-ionization (or positron-ionization) of one subshell. A knock-on
/// electron is banked and the subshell is reported.
#[derive(Debug, Clone)]
pub struct SubshellIonizationReaction {
    base: StandardReaction,
    scattering: Arc<ElectroionizationSubshellScattering>,
    subshell: Subshell,
    reaction_type: ReactionType,
}

impl SubshellIonizationReaction {
    pub fn new(
        base: StandardReaction,
        scattering: Arc<ElectroionizationSubshellScattering>,
        subshell: Subshell,
        reaction_type: impl Into<ReactionType>,
    ) -> Self {
        SubshellIonizationReaction {
            base,
            scattering,
            subshell,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }

    pub fn subshell(&self) -> Subshell {
        self.subshell
    }

    pub fn scattering(&self) -> &Arc<ElectroionizationSubshellScattering> {
        &self.scattering
    }
}

impl AtomicReaction for SubshellIonizationReaction {
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

    /// Differential in the knock-on energy.
    fn differential_cross_section(&self, incoming_energy: f64, knock_on_energy: f64) -> f64 {
        self.base.cross_section(incoming_energy) * self.scattering.evaluate_pdf(incoming_energy, knock_on_energy)
    }

    fn number_of_emitted_electrons(&self, _energy: f64) -> u32 {
        1
    }

    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        let result = match particle.particle_type {
            ParticleType::Positron => self.scattering.scatter_positron(particle, bank, rng),
            _ => self.scattering.scatter_electron(particle, bank, rng),
        };
        match result {
            Ok(()) => {
                particle.collision_number += 1;
                self.subshell
            }
            Err(err) => {
                warn!(reaction = %self.reaction_type, energy = particle.energy, "ionization skipped: {}", err);
                Subshell::Invalid
            }
        }
    }
}

/// Bremsstrahlung photon emission.
#[derive(Debug, Clone)]
pub struct BremsstrahlungReaction {
    base: StandardReaction,
    scattering: Arc<BremsstrahlungScattering>,
    reaction_type: ReactionType,
}

impl BremsstrahlungReaction {
    pub fn new(
        base: StandardReaction,
        scattering: Arc<BremsstrahlungScattering>,
        reaction_type: impl Into<ReactionType>,
    ) -> Self {
        BremsstrahlungReaction {
            base,
            scattering,
            reaction_type: reaction_type.into(),
        }
    }

    pub fn base(&self) -> &StandardReaction {
        &self.base
    }

    pub fn scattering(&self) -> &Arc<BremsstrahlungScattering> {
        &self.scattering
    }
}

impl AtomicReaction for BremsstrahlungReaction {
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

    /// Differential in the photon energy.
    fn differential_cross_section(&self, incoming_energy: f64, photon_energy: f64) -> f64 {
        self.base.cross_section(incoming_energy) * self.scattering.evaluate_pdf(incoming_energy, photon_energy)
    }

    fn number_of_emitted_photons(&self, _energy: f64) -> u32 {
        1
    }

    fn react(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Subshell {
        match self.scattering.scatter(particle, bank, rng) {
            Ok(()) => particle.collision_number += 1,
            Err(err) => {
                warn!(reaction = %self.reaction_type, energy = particle.energy, "bremsstrahlung skipped: {}", err);
            }
        }
        Subshell::Invalid
    }
}
