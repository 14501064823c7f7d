// Reaction factories: turn relaxation data into ready-to-use reactions
use crate::adjoint_photoatomic::{
    CoherentAdjointReaction, FormFactorCoherentScattering, LineEnergyAdjointReaction, VoidAdjointPhotoatomicReaction,
    PAIR_PRODUCTION_LINE_ENERGY, TRIPLET_PRODUCTION_LINE_ENERGY,
};
use crate::config::{Config, ElasticElectronDistributionType, ElectronProperties};
use crate::distribution::TabularDistribution;
use crate::elastic_factory::{
    calculate_moment_preserving_cross_sections, calculate_reduced_cutoff_cross_sections,
    create_coupled_elastic_distribution, create_cutoff_elastic_distribution, create_full_cutoff_distribution,
    create_hybrid_elastic_distribution, create_moment_preserving_elastic_distribution,
    create_screened_rutherford_elastic_distribution, cutoff_subrange,
};
use crate::elastic_reaction::{DecoupledElasticReaction, ElasticReaction};
use crate::elastic_scattering::{
    CoupledElasticScattering, CutoffElasticScattering, HybridElasticScattering, MomentPreservingElasticScattering,
    ScreenedRutherfordScattering,
};
use crate::elastic_traits::MU_PEAK;
use crate::electroatomic::{
    AbsorptionReaction, AtomicExcitationReaction, BremsstrahlungReaction, PositronAnnihilationReaction,
    SubshellIonizationReaction,
};
use crate::energy_loss::{
    create_energy_loss_distribution, BremsstrahlungScattering, ElectroionizationSubshellScattering,
    EnergyLossDistribution,
};
use crate::error::{CollisionError, Result};
use crate::grid_searcher::HashBasedGridSearcher;
use crate::incoherent_adjoint::{
    IncoherentAdjointModel, IncoherentAdjointReaction, IncoherentAdjointScattering, OccupationNumber,
};
use crate::interpolation::Interpolation;
use crate::reaction::{AtomicReaction, StandardReaction};
use crate::reaction_type::{
    AdjointPhotoatomicReactionType, ElectroatomicReactionType, PositronatomicReactionType, ReactionType, Subshell,
};
use crate::relaxation_data::{EnergyLossTables, ElectronPhotonRelaxationData, Table, ThresholdCrossSection};
use crate::utilities::{bin_index, lower_bound_index};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Which particle the electroatomic factory builds reactions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleFamily {
    Electron,
    Positron,
}

/// Positron counterpart of an electroatomic reaction type.
pub fn positronatomic_type(reaction: ElectroatomicReactionType) -> PositronatomicReactionType {
    use ElectroatomicReactionType as E;
    use PositronatomicReactionType as P;
    match reaction {
        E::Total => P::Total,
        E::TotalAbsorption => P::TotalAbsorption,
        E::CoupledElastic => P::CoupledElastic,
        E::HybridElastic => P::HybridElastic,
        E::DecoupledElastic => P::DecoupledElastic,
        E::CutoffElastic => P::CutoffElastic,
        E::ScreenedRutherfordElastic => P::ScreenedRutherfordElastic,
        E::MomentPreservingElastic => P::MomentPreservingElastic,
        E::Bremsstrahlung => P::Bremsstrahlung,
        E::PositronAnnihilation => P::PositronAnnihilation,
        E::AtomicExcitation => P::AtomicExcitation,
        E::TotalElectroionization => P::TotalPositronionization,
        E::SubshellElectroionization(subshell) => P::SubshellPositronionization(subshell),
    }
}

/// Builds electroatomic (or positronatomic) reactions that share one energy
/// grid and grid searcher. Elastic cross sections are interpolated log-log.
#[derive(Debug, Clone)]
pub struct ElectroatomicReactionFactory {
    data: Arc<ElectronPhotonRelaxationData>,
    properties: ElectronProperties,
    family: ParticleFamily,
    energy_grid: Arc<Vec<f64>>,
    grid_searcher: Arc<HashBasedGridSearcher>,
}

impl ElectroatomicReactionFactory {
    pub fn new(
        data: Arc<ElectronPhotonRelaxationData>,
        properties: ElectronProperties,
        family: ParticleFamily,
    ) -> Result<Self> {
        properties.validate()?;
        let energy_grid = Arc::new(data.electron_energy_grid.clone());
        let grid_searcher = Arc::new(HashBasedGridSearcher::new(energy_grid.clone())?);
        debug!(
            atomic_number = data.atomic_number,
            family = ?family,
            grid_points = energy_grid.len(),
            "created electroatomic reaction factory"
        );
        Ok(ElectroatomicReactionFactory {
            data,
            properties,
            family,
            energy_grid,
            grid_searcher,
        })
    }

    /// Factory using the electron properties of the global configuration.
    pub fn from_global_config(data: Arc<ElectronPhotonRelaxationData>, family: ParticleFamily) -> Result<Self> {
        let properties = Config::global().electron_properties().clone();
        Self::new(data, properties, family)
    }

    pub fn properties(&self) -> &ElectronProperties {
        &self.properties
    }

    pub fn family(&self) -> ParticleFamily {
        self.family
    }

    pub fn energy_grid(&self) -> &Arc<Vec<f64>> {
        &self.energy_grid
    }

    pub fn grid_searcher(&self) -> &Arc<HashBasedGridSearcher> {
        &self.grid_searcher
    }

    fn reaction_type(&self, reaction: ElectroatomicReactionType) -> ReactionType {
        match self.family {
            ParticleFamily::Electron => reaction.into(),
            ParticleFamily::Positron => positronatomic_type(reaction).into(),
        }
    }

    fn standard_reaction(
        &self,
        name: &str,
        cross_section: Vec<f64>,
        threshold_index: usize,
        interpolation: Interpolation,
    ) -> Result<StandardReaction> {
        if cross_section.is_empty() {
            return Err(CollisionError::MissingData(format!(
                "Z={} has no {} cross section",
                self.data.atomic_number, name
            )));
        }
        StandardReaction::with_searcher(
            self.energy_grid.clone(),
            Arc::new(cross_section),
            threshold_index,
            self.grid_searcher.clone(),
            interpolation,
        )
    }

    fn tabulated_reaction(
        &self,
        name: &str,
        cross_section: &ThresholdCrossSection,
        interpolation: Interpolation,
    ) -> Result<StandardReaction> {
        self.standard_reaction(
            name,
            cross_section.cross_section.clone(),
            cross_section.threshold_index,
            interpolation,
        )
    }

    /// Cutoff elastic reaction. Below `MU_PEAK` the cross section only counts
    /// scattering below the cutoff angle.
    pub fn create_cutoff_elastic_reaction(&self) -> Result<ElasticReaction<CutoffElasticScattering>> {
        let cutoff = self.properties.elastic_cutoff_angle_cosine;
        let cutoff_cs = &self.data.cutoff_elastic_cross_section;
        let distribution = Arc::new(create_cutoff_elastic_distribution(&self.data, &self.properties)?);
        let base = if cutoff < MU_PEAK {
            let full = create_full_cutoff_distribution(&self.data, &self.properties)?;
            let reduced = calculate_reduced_cutoff_cross_sections(&self.data, &full, cutoff);
            self.standard_reaction(
                "cutoff elastic",
                reduced
                    .get(cutoff_cs.threshold_index..cutoff_cs.threshold_index + cutoff_cs.cross_section.len())
                    .map(<[f64]>::to_vec)
                    .unwrap_or_default(),
                cutoff_cs.threshold_index,
                Interpolation::LogLog,
            )?
        } else {
            self.tabulated_reaction("cutoff elastic", cutoff_cs, Interpolation::LogLog)?
        };
        info!(atomic_number = self.data.atomic_number, cutoff, "created cutoff elastic reaction");
        Ok(ElasticReaction::new(
            base,
            distribution,
            self.reaction_type(ElectroatomicReactionType::CutoffElastic),
        ))
    }

    pub fn create_screened_rutherford_elastic_reaction(
        &self,
    ) -> Result<ElasticReaction<ScreenedRutherfordScattering>> {
        let base = self.tabulated_reaction(
            "screened Rutherford elastic",
            &self.data.screened_rutherford_elastic_cross_section,
            Interpolation::LogLog,
        )?;
        let distribution = Arc::new(create_screened_rutherford_elastic_distribution(&self.data));
        Ok(ElasticReaction::new(
            base,
            distribution,
            self.reaction_type(ElectroatomicReactionType::ScreenedRutherfordElastic),
        ))
    }

    pub fn create_coupled_elastic_reaction(&self) -> Result<ElasticReaction<CoupledElasticScattering>> {
        let base = self.tabulated_reaction(
            "total elastic",
            &self.data.total_elastic_cross_section,
            Interpolation::LogLog,
        )?;
        let distribution = Arc::new(create_coupled_elastic_distribution(&self.data, &self.properties)?);
        Ok(ElasticReaction::new(
            base,
            distribution,
            self.reaction_type(ElectroatomicReactionType::CoupledElastic),
        ))
    }

    /// Total elastic reaction sampling the full cutoff table or the analytic
    /// peak by the cutoff-to-total cross-section ratio.
    pub fn create_decoupled_elastic_reaction(&self) -> Result<DecoupledElasticReaction> {
        let total = &self.data.total_elastic_cross_section;
        let cutoff = &self.data.cutoff_elastic_cross_section;
        if total.is_empty() || cutoff.is_empty() {
            return Err(CollisionError::MissingData(format!(
                "Z={} needs cutoff and total elastic cross sections",
                self.data.atomic_number
            )));
        }
        let full_properties = ElectronProperties {
            elastic_cutoff_angle_cosine: 1.0,
            ..self.properties.clone()
        };
        let tabular = Arc::new(create_cutoff_elastic_distribution(&self.data, &full_properties)?);
        let analytic = Arc::new(create_screened_rutherford_elastic_distribution(&self.data));
        info!(
            atomic_number = self.data.atomic_number,
            grid_policy = %self.properties.two_d_grid_policy,
            "created decoupled elastic reaction"
        );
        DecoupledElasticReaction::new(
            self.energy_grid.clone(),
            Arc::new(total.cross_section.clone()),
            total.threshold_index,
            &cutoff.cross_section,
            cutoff.threshold_index,
            self.grid_searcher.clone(),
            tabular,
            analytic,
            self.reaction_type(ElectroatomicReactionType::DecoupledElastic),
        )
    }

    /// Hybrid elastic reaction. Its cross section is the reduced cutoff cross
    /// section plus the moment-preserving one, starting at the lower of the
    /// two thresholds.
    pub fn create_hybrid_elastic_reaction(&self) -> Result<ElasticReaction<HybridElasticScattering>> {
        let cutoff = self.properties.elastic_cutoff_angle_cosine;
        let distribution = Arc::new(create_hybrid_elastic_distribution(&self.data, &self.properties)?);
        let full = create_full_cutoff_distribution(&self.data, &self.properties)?;
        let reduced = calculate_reduced_cutoff_cross_sections(&self.data, &full, cutoff);
        let (mp, mp_threshold) = calculate_moment_preserving_cross_sections(&self.data, &full, cutoff)?;

        let threshold_index = self.data.cutoff_elastic_cross_section.threshold_index.min(mp_threshold);
        let combined: Vec<f64> = (threshold_index..self.energy_grid.len())
            .map(|i| {
                let mp_value = if i >= mp_threshold { mp[i - mp_threshold] } else { 0.0 };
                reduced[i] + mp_value
            })
            .collect();
        let base = self.standard_reaction("hybrid elastic", combined, threshold_index, Interpolation::LogLog)?;
        Ok(ElasticReaction::new(
            base,
            distribution,
            self.reaction_type(ElectroatomicReactionType::HybridElastic),
        ))
    }

    pub fn create_moment_preserving_elastic_reaction(
        &self,
    ) -> Result<ElasticReaction<MomentPreservingElasticScattering>> {
        let cutoff = self.properties.elastic_cutoff_angle_cosine;
        let full = create_full_cutoff_distribution(&self.data, &self.properties)?;
        let (cross_section, threshold_index) = calculate_moment_preserving_cross_sections(&self.data, &full, cutoff)?;
        let base = self.standard_reaction(
            "moment preserving elastic",
            cross_section,
            threshold_index,
            Interpolation::LogLog,
        )?;
        let distribution = Arc::new(create_moment_preserving_elastic_distribution(&self.data, &self.properties)?);
        Ok(ElasticReaction::new(
            base,
            distribution,
            self.reaction_type(ElectroatomicReactionType::MomentPreservingElastic),
        ))
    }

    /// Elastic reaction for `mode`.
    pub fn create_elastic_reaction(&self, mode: ElasticElectronDistributionType) -> Result<Box<dyn AtomicReaction>> {
        info!(atomic_number = self.data.atomic_number, mode = %mode, "creating elastic reaction");
        Ok(match mode {
            ElasticElectronDistributionType::Coupled => Box::new(self.create_coupled_elastic_reaction()?),
            ElasticElectronDistributionType::Decoupled => Box::new(self.create_decoupled_elastic_reaction()?),
            ElasticElectronDistributionType::Hybrid => Box::new(self.create_hybrid_elastic_reaction()?),
            ElasticElectronDistributionType::Cutoff => Box::new(self.create_cutoff_elastic_reaction()?),
            ElasticElectronDistributionType::ScreenedRutherford => {
                Box::new(self.create_screened_rutherford_elastic_reaction()?)
            }
        })
    }

    /// Elastic reaction for the configured elastic distribution mode.
    pub fn create_configured_elastic_reaction(&self) -> Result<Box<dyn AtomicReaction>> {
        self.create_elastic_reaction(self.properties.elastic_distribution_mode)
    }

    pub fn create_atomic_excitation_reaction(&self) -> Result<AtomicExcitationReaction> {
        let base = self.tabulated_reaction(
            "atomic excitation",
            &self.data.atomic_excitation_cross_section,
            Interpolation::LogLog,
        )?;
        AtomicExcitationReaction::new(
            base,
            self.data.atomic_excitation_energy_loss.clone(),
            self.reaction_type(ElectroatomicReactionType::AtomicExcitation),
        )
    }

    pub fn create_positron_annihilation_reaction(&self) -> Result<PositronAnnihilationReaction> {
        if self.family != ParticleFamily::Positron {
            return Err(CollisionError::UnsupportedCombination(
                "positron annihilation needs a positron reaction factory".to_string(),
            ));
        }
        let base = self.tabulated_reaction(
            "positron annihilation",
            &self.data.positron_annihilation_cross_section,
            Interpolation::LogLog,
        )?;
        Ok(PositronAnnihilationReaction::new(
            base,
            self.reaction_type(ElectroatomicReactionType::PositronAnnihilation),
        ))
    }

    fn energy_loss_distribution(&self, tables: &EnergyLossTables) -> Result<EnergyLossDistribution> {
        create_energy_loss_distribution(
            tables,
            self.properties.two_d_interpolation,
            self.properties.two_d_grid_policy,
            self.properties.evaluation_tolerance,
        )
    }

    /// Electro-ionization (or positron-ionization) of one subshell. The
    /// cross section is interpolated lin-lin since it vanishes at threshold.
    pub fn create_subshell_ionization_reaction(&self, subshell: Subshell) -> Result<SubshellIonizationReaction> {
        let shell = self.data.electroionization_subshell(subshell).ok_or_else(|| {
            CollisionError::MissingData(format!(
                "Z={} has no {} subshell electro-ionization data",
                self.data.atomic_number, subshell
            ))
        })?;
        let base = self.tabulated_reaction(
            &format!("{} subshell electro-ionization", subshell),
            &shell.cross_section,
            Interpolation::LinLin,
        )?;
        let distribution = self.energy_loss_distribution(&shell.knock_on)?;
        let scattering = ElectroionizationSubshellScattering::new(Arc::new(distribution), shell.binding_energy)?;
        let reaction_type = self.reaction_type(ElectroatomicReactionType::SubshellElectroionization(subshell));
        debug!(
            atomic_number = self.data.atomic_number,
            reaction = %reaction_type,
            binding_energy = shell.binding_energy,
            "created subshell ionization reaction"
        );
        Ok(SubshellIonizationReaction::new(
            base,
            Arc::new(scattering),
            subshell,
            reaction_type,
        ))
    }

    /// One ionization reaction per tabulated subshell, in data order.
    pub fn create_subshell_ionization_reactions(&self) -> Result<Vec<SubshellIonizationReaction>> {
        self.data
            .electroionization_subshells
            .iter()
            .map(|shell| self.create_subshell_ionization_reaction(shell.subshell))
            .collect()
    }

    pub fn create_bremsstrahlung_reaction(&self) -> Result<BremsstrahlungReaction> {
        let base = self.tabulated_reaction(
            "bremsstrahlung",
            &self.data.bremsstrahlung_cross_section,
            Interpolation::LinLin,
        )?;
        let distribution = self.energy_loss_distribution(&self.data.bremsstrahlung_photon_energy)?;
        Ok(BremsstrahlungReaction::new(
            base,
            Arc::new(BremsstrahlungScattering::new(Arc::new(distribution))),
            self.reaction_type(ElectroatomicReactionType::Bremsstrahlung),
        ))
    }

    /// Absorption reaction whose cross section is the sum of `reactions` at
    /// every grid point, starting at the first nonzero sum.
    pub fn create_total_absorption_reaction(&self, reactions: &[&dyn AtomicReaction]) -> Result<AbsorptionReaction> {
        let summed: Vec<f64> = self
            .energy_grid
            .iter()
            .map(|&energy| reactions.iter().map(|r| r.cross_section(energy)).sum())
            .collect();
        let threshold_index = summed.iter().position(|v| *v > 0.0).ok_or_else(|| {
            CollisionError::MissingData(format!(
                "Z={} total absorption cross section is zero everywhere",
                self.data.atomic_number
            ))
        })?;
        let base = self.standard_reaction(
            "total absorption",
            summed[threshold_index..].to_vec(),
            threshold_index,
            Interpolation::LinLin,
        )?;
        debug!(
            atomic_number = self.data.atomic_number,
            reactions = reactions.len(),
            threshold_index,
            "created total absorption reaction"
        );
        Ok(AbsorptionReaction::new(
            base,
            self.reaction_type(ElectroatomicReactionType::TotalAbsorption),
        ))
    }
}

/// Adjoint photon energy grid truncated at `max_energy`, which becomes the
/// last grid point.
pub fn create_union_energy_grid(data: &ElectronPhotonRelaxationData, max_energy: f64) -> Result<Vec<f64>> {
    let grid = &data.adjoint_photon_energy_grid;
    if grid.len() < 2 {
        return Err(CollisionError::MissingData(format!(
            "Z={} has no adjoint photon energy grid",
            data.atomic_number
        )));
    }
    let (first, last) = (grid[0], grid[grid.len() - 1]);
    if !(max_energy > first && max_energy <= last) {
        return Err(CollisionError::OutOfRange {
            value: max_energy,
            min: first,
            max: last,
        });
    }
    if max_energy == last {
        return Ok(grid.clone());
    }
    let lower = lower_bound_index(grid, max_energy);
    let mut truncated = grid[..=lower].to_vec();
    if truncated[lower] < max_energy {
        truncated.push(max_energy);
    }
    Ok(truncated)
}

/// Cross section on a full grid truncated at `max_energy`, with the value at
/// `max_energy` interpolated lin-lin. Lines up with [`create_union_energy_grid`].
pub fn slice_cross_section(full_energy_grid: &[f64], full_cross_section: &[f64], max_energy: f64) -> Result<Vec<f64>> {
    if full_energy_grid.len() < 2 || full_energy_grid.len() != full_cross_section.len() {
        return Err(CollisionError::InvalidCrossSection(format!(
            "cannot slice {} cross section values on a grid of {} points",
            full_cross_section.len(),
            full_energy_grid.len()
        )));
    }
    let (first, last) = (full_energy_grid[0], full_energy_grid[full_energy_grid.len() - 1]);
    if !(max_energy > first && max_energy <= last) {
        return Err(CollisionError::OutOfRange {
            value: max_energy,
            min: first,
            max: last,
        });
    }
    if max_energy == last {
        return Ok(full_cross_section.to_vec());
    }
    let lower = lower_bound_index(full_energy_grid, max_energy);
    let mut sliced = full_cross_section[..=lower].to_vec();
    if full_energy_grid[lower] < max_energy {
        let i = bin_index(full_energy_grid, max_energy);
        sliced.push(Interpolation::LinLin.interpolate(
            full_energy_grid[i],
            full_energy_grid[i + 1],
            max_energy,
            full_cross_section[i],
            full_cross_section[i + 1],
        ));
    }
    Ok(sliced)
}

/// Builds adjoint photoatomic reactions on the union grid truncated at a
/// maximum energy. Cross sections are interpolated lin-lin.
#[derive(Debug, Clone)]
pub struct AdjointPhotoatomicReactionFactory {
    data: Arc<ElectronPhotonRelaxationData>,
    energy_grid: Arc<Vec<f64>>,
    grid_searcher: Arc<HashBasedGridSearcher>,
    critical_line_energies: Arc<Vec<f64>>,
}

impl AdjointPhotoatomicReactionFactory {
    pub fn new(data: Arc<ElectronPhotonRelaxationData>, max_energy: f64) -> Result<Self> {
        let energy_grid = Arc::new(create_union_energy_grid(&data, max_energy)?);
        let grid_searcher = Arc::new(HashBasedGridSearcher::new(energy_grid.clone())?);
        debug!(
            atomic_number = data.atomic_number,
            max_energy,
            grid_points = energy_grid.len(),
            "created adjoint photoatomic reaction factory"
        );
        Ok(AdjointPhotoatomicReactionFactory {
            data,
            energy_grid,
            grid_searcher,
            critical_line_energies: Arc::new(Vec::new()),
        })
    }

    /// Critical line energies handed to the line energy reactions.
    pub fn with_critical_line_energies(mut self, energies: Arc<Vec<f64>>) -> Self {
        self.critical_line_energies = energies;
        self
    }

    pub fn energy_grid(&self) -> &Arc<Vec<f64>> {
        &self.energy_grid
    }

    pub fn grid_searcher(&self) -> &Arc<HashBasedGridSearcher> {
        &self.grid_searcher
    }

    pub fn max_energy(&self) -> f64 {
        self.energy_grid[self.energy_grid.len() - 1]
    }

    fn sliced_reaction(&self, name: &str, cross_section: &ThresholdCrossSection) -> Result<StandardReaction> {
        let full_grid = &self.data.adjoint_photon_energy_grid;
        if cross_section.is_empty() {
            return Err(CollisionError::MissingData(format!(
                "Z={} has no {} cross section",
                self.data.atomic_number, name
            )));
        }
        let full: Vec<f64> = (0..full_grid.len()).map(|i| cross_section.value_at_grid_index(i)).collect();
        let sliced = slice_cross_section(full_grid, &full, self.max_energy())?;
        let threshold_index = cross_section.threshold_index;
        if threshold_index >= sliced.len() {
            return Err(CollisionError::InvalidCrossSection(format!(
                "{} threshold index {} lies above the max energy {}",
                name,
                threshold_index,
                self.max_energy()
            )));
        }
        StandardReaction::with_searcher(
            self.energy_grid.clone(),
            Arc::new(sliced[threshold_index..].to_vec()),
            threshold_index,
            self.grid_searcher.clone(),
            Interpolation::LinLin,
        )
    }

    pub fn create_coherent_reaction(&self) -> Result<CoherentAdjointReaction> {
        let base = self.sliced_reaction("adjoint coherent", &self.data.adjoint_coherent_cross_section)?;
        Ok(CoherentAdjointReaction::new(base, AdjointPhotoatomicReactionType::Coherent))
    }

    /// Coherent reaction sampled from the squared atomic form factor.
    pub fn create_form_factor_coherent_reaction(&self) -> Result<CoherentAdjointReaction> {
        let table = &self.data.adjoint_coherent_form_factor_squared;
        if table.grid.len() < 2 {
            return Err(CollisionError::MissingData(format!(
                "Z={} has no coherent form factor",
                self.data.atomic_number
            )));
        }
        let base = self.sliced_reaction("adjoint coherent", &self.data.adjoint_coherent_cross_section)?;
        let form_factor_squared =
            TabularDistribution::new(table.grid.clone(), table.values.clone(), Interpolation::LinLin)?;
        Ok(CoherentAdjointReaction::with_form_factor(
            base,
            Arc::new(FormFactorCoherentScattering::new(form_factor_squared)?),
            AdjointPhotoatomicReactionType::Coherent,
        ))
    }

    /// Incoherent reaction on free electrons (Klein-Nishina).
    pub fn create_incoherent_reaction(&self) -> Result<IncoherentAdjointReaction> {
        let base = self.sliced_reaction("adjoint incoherent", &self.data.adjoint_incoherent_cross_section)?;
        let scattering = IncoherentAdjointScattering::new(self.max_energy(), IncoherentAdjointModel::KleinNishina)?;
        self.incoherent_reaction(base, scattering, AdjointPhotoatomicReactionType::TotalIncoherent)
    }

    /// Incoherent reaction on one bound subshell (impulse approximation).
    pub fn create_subshell_incoherent_reaction(&self, subshell: Subshell) -> Result<IncoherentAdjointReaction> {
        let shell = self.data.adjoint_incoherent_subshell(subshell).ok_or_else(|| {
            CollisionError::MissingData(format!(
                "Z={} has no {} subshell incoherent data",
                self.data.atomic_number, subshell
            ))
        })?;
        let base = self.sliced_reaction(&format!("{} subshell incoherent", subshell), &shell.cross_section)?;
        let model = IncoherentAdjointModel::Subshell {
            subshell,
            binding_energy: shell.binding_energy,
            occupation_number: Arc::new(OccupationNumber::new(shell.occupation_number.clone())?),
        };
        let scattering = IncoherentAdjointScattering::new(self.max_energy(), model)?;
        self.incoherent_reaction(base, scattering, AdjointPhotoatomicReactionType::SubshellIncoherent(subshell))
    }

    pub fn create_subshell_incoherent_reactions(&self) -> Result<Vec<IncoherentAdjointReaction>> {
        self.data
            .adjoint_incoherent_subshells
            .iter()
            .map(|shell| self.create_subshell_incoherent_reaction(shell.subshell))
            .collect()
    }

    fn incoherent_reaction(
        &self,
        base: StandardReaction,
        scattering: IncoherentAdjointScattering,
        reaction_type: AdjointPhotoatomicReactionType,
    ) -> Result<IncoherentAdjointReaction> {
        let mut reaction = IncoherentAdjointReaction::new(base, Arc::new(scattering), reaction_type);
        if !self.critical_line_energies.is_empty() {
            reaction.set_critical_line_energies(self.critical_line_energies.clone())?;
        }
        info!(
            atomic_number = self.data.atomic_number,
            reaction = %reaction_type,
            max_energy = self.max_energy(),
            "created incoherent adjoint reaction"
        );
        Ok(reaction)
    }

    pub fn create_pair_production_reaction(&self) -> Result<LineEnergyAdjointReaction> {
        self.line_energy_reaction(
            PAIR_PRODUCTION_LINE_ENERGY,
            &self.data.adjoint_pair_production_energy_distribution,
            &self.data.adjoint_pair_production_norm_constant,
            AdjointPhotoatomicReactionType::PairProduction,
        )
    }

    pub fn create_triplet_production_reaction(&self) -> Result<LineEnergyAdjointReaction> {
        self.line_energy_reaction(
            TRIPLET_PRODUCTION_LINE_ENERGY,
            &self.data.adjoint_triplet_production_energy_distribution,
            &self.data.adjoint_triplet_production_norm_constant,
            AdjointPhotoatomicReactionType::TripletProduction,
        )
    }

    /// Forward total cross section; only used for its cross section.
    pub fn create_total_forward_reaction(&self) -> Result<VoidAdjointPhotoatomicReaction> {
        let base = self.sliced_reaction("forward total", &self.data.forward_total_cross_section)?;
        Ok(VoidAdjointPhotoatomicReaction::new(base, AdjointPhotoatomicReactionType::Total))
    }

    /// The cross section is the norm constant at the max energy and the
    /// outgoing energies are truncated at the max energy.
    fn line_energy_reaction(
        &self,
        line_energy: f64,
        energy_distribution: &Table,
        norm_constant: &Table,
        reaction_type: AdjointPhotoatomicReactionType,
    ) -> Result<LineEnergyAdjointReaction> {
        if energy_distribution.grid.len() < 2 || norm_constant.grid.len() < 2 {
            return Err(CollisionError::MissingData(format!(
                "Z={} has no {} data",
                self.data.atomic_number, reaction_type
            )));
        }
        let max_energy = self.max_energy();
        if !(max_energy > energy_distribution.grid[0]) {
            return Err(CollisionError::OutOfRange {
                value: max_energy,
                min: energy_distribution.grid[0],
                max: energy_distribution.grid[energy_distribution.grid.len() - 1],
            });
        }
        let (energies, pdf) = cutoff_subrange(&energy_distribution.grid, &energy_distribution.values, max_energy);
        let distribution = Arc::new(TabularDistribution::new(energies, pdf, Interpolation::LinLin)?);

        let grid = &norm_constant.grid;
        let x = max_energy.clamp(grid[0], grid[grid.len() - 1]);
        let i = bin_index(grid, x);
        let cross_section = Interpolation::LinLin.interpolate(
            grid[i],
            grid[i + 1],
            x,
            norm_constant.values[i],
            norm_constant.values[i + 1],
        );

        let mut reaction = LineEnergyAdjointReaction::new(line_energy, cross_section, distribution, reaction_type)?;
        if !self.critical_line_energies.is_empty() {
            reaction.set_critical_line_energies(self.critical_line_energies.clone())?;
        }
        info!(
            atomic_number = self.data.atomic_number,
            reaction = %reaction_type,
            line_energy,
            cross_section,
            "created line energy adjoint reaction"
        );
        Ok(reaction)
    }
}
