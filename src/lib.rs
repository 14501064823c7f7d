// Collision physics for electrons, positrons and adjoint photons: tabulated
// cross sections, elastic angular distributions and the reactions built from them.
pub mod adjoint_photoatomic;
pub mod bank;
pub mod config;
pub mod distribution;
pub mod elastic_bivariate;
pub mod elastic_distribution;
pub mod elastic_factory;
pub mod elastic_reaction;
pub mod elastic_scattering;
pub mod elastic_traits;
pub mod electroatomic;
pub mod energy_loss;
pub mod error;
pub mod grid_searcher;
pub mod incoherent_adjoint;
pub mod interpolation;
pub mod logging;
pub mod particle;
pub mod reaction;
pub mod reaction_factory;
pub mod reaction_type;
pub mod relaxation_data;
pub mod utilities;

pub use adjoint_photoatomic::{
    CoherentAdjointReaction, FormFactorCoherentScattering, LineEnergyAdjointReaction, VoidAdjointPhotoatomicReaction,
};
pub use bank::ParticleBank;
pub use config::{Config, ElasticElectronDistributionType, ElectronProperties};
pub use distribution::{AngularDistribution, DiscreteDistribution, TabularDistribution};
pub use elastic_bivariate::{ElasticBivariateDistribution, TwoDGridPolicy};
pub use elastic_reaction::{DecoupledElasticReaction, ElasticReaction};
pub use elastic_scattering::{
    CoupledElasticSamplingMethod, CoupledElasticScattering, CutoffElasticScattering, ElectronScatteringDistribution,
    HybridElasticScattering, MomentPreservingElasticScattering, ScreenedRutherfordScattering,
};
pub use electroatomic::{
    AbsorptionReaction, AtomicExcitationReaction, BremsstrahlungReaction, PositronAnnihilationReaction,
    SubshellIonizationReaction,
};
pub use energy_loss::{BremsstrahlungScattering, ElectroionizationSubshellScattering, EnergyLossDistribution};
pub use error::{CollisionError, Result};
pub use grid_searcher::HashBasedGridSearcher;
pub use incoherent_adjoint::{IncoherentAdjointModel, IncoherentAdjointReaction, IncoherentAdjointScattering};
pub use interpolation::{Interpolation, TwoDInterpolation};
pub use logging::setup_logging;
pub use particle::{Particle, ParticleType};
pub use reaction::{AtomicReaction, StandardReaction};
pub use reaction_factory::{AdjointPhotoatomicReactionFactory, ElectroatomicReactionFactory, ParticleFamily};
pub use reaction_type::{
    AdjointPhotoatomicReactionType, ElectroatomicReactionType, PositronatomicReactionType, ReactionType, Subshell,
};
pub use relaxation_data::{load_relaxation_data, ElectronPhotonRelaxationData, EnergyLossTables};
pub use utilities::interpolate_linear;
