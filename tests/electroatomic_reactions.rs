// Integration tests: relaxation data read from JSON, reactions built by the
// electroatomic factory and sampled with seeded streams

use atomic_reactions::config::Config;
use atomic_reactions::relaxation_data::{Table, ThresholdCrossSection};
use atomic_reactions::{
    load_relaxation_data, AtomicReaction, ElasticElectronDistributionType, ElectroatomicReactionFactory,
    ElectronPhotonRelaxationData, ElectronProperties, Particle, ParticleBank, ParticleFamily, ParticleType,
    TwoDGridPolicy, TwoDInterpolation,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const MU_PEAK: f64 = 0.999999;

fn aluminium() -> ElectronPhotonRelaxationData {
    ElectronPhotonRelaxationData {
        atomic_number: 13,
        electron_energy_grid: vec![1e-5, 1e-3, 1e-1, 1e1, 1e5],
        cutoff_elastic_cross_section: ThresholdCrossSection::new(vec![4e9, 2e8, 1e6, 1e4, 1e2], 0),
        screened_rutherford_elastic_cross_section: ThresholdCrossSection::new(vec![5e7, 1e6, 3e4, 1e3], 1),
        total_elastic_cross_section: ThresholdCrossSection::new(vec![4e9, 2.5e8, 2e6, 4e4, 1.1e3], 0),
        atomic_excitation_cross_section: ThresholdCrossSection::new(vec![1e7, 3e6, 1e6, 1e5], 1),
        positron_annihilation_cross_section: ThresholdCrossSection::new(vec![1e3, 1e2, 10.0, 1.0, 0.1], 0),
        atomic_excitation_energy_loss: Table::new(vec![1e-5, 1e5], vec![1e-5, 2e-5]),
        cutoff_angle_cosine: 1.0,
        elastic_angular_energy_grid: vec![1e-5, 1e-1, 1e5],
        cutoff_elastic_angles: vec![
            vec![-1.0, 0.0, 0.9, MU_PEAK],
            vec![-1.0, 0.5, 0.9, MU_PEAK],
            vec![-1.0, 0.9, 0.99, MU_PEAK],
        ],
        cutoff_elastic_pdf: vec![
            vec![0.5, 0.5, 0.5, 0.5],
            vec![0.1, 0.3, 1.0, 2.0],
            vec![0.01, 0.1, 1.0, 10.0],
        ],
        moment_preserving_discrete_angles: vec![vec![0.95, 0.99]; 3],
        moment_preserving_weights: vec![vec![0.4, 0.6]; 3],
        moment_preserving_cross_section_reductions: vec![0.5, 0.6, 0.7],
        ..Default::default()
    }
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("Al.json");
    aluminium().to_json_file(&path).unwrap();
    path
}

fn properties(mode: ElasticElectronDistributionType, cutoff: f64) -> ElectronProperties {
    ElectronProperties {
        elastic_distribution_mode: mode,
        two_d_interpolation: TwoDInterpolation::LogLogLog,
        two_d_grid_policy: TwoDGridPolicy::UnitBaseCorrelated,
        elastic_cutoff_angle_cosine: cutoff,
        ..Default::default()
    }
}

/// Scattering angle cosines of `histories` fresh electrons.
fn scatter_cosines(reaction: &dyn AtomicReaction, energy: f64, histories: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bank = ParticleBank::new();
    (0..histories)
        .map(|_| {
            let mut electron = Particle::electron(energy);
            reaction.react(&mut electron, &mut bank, &mut rng);
            electron.direction[2]
        })
        .collect()
}

#[test]
fn test_factory_from_json_file() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path());
    let data = load_relaxation_data(&path).unwrap();
    assert_eq!(data.atomic_number, 13);

    let factory = ElectroatomicReactionFactory::new(
        data,
        properties(ElasticElectronDistributionType::Decoupled, 1.0),
        ParticleFamily::Electron,
    )
    .unwrap();
    let elastic = factory.create_decoupled_elastic_reaction().unwrap();
    assert!((elastic.cross_section(1e-1) - 2e6).abs() < 1e-3);
    assert_eq!(elastic.sampling_ratio(1e-1), 0.5);
    assert_eq!(elastic.cross_section(1e6), 0.0);
}

#[test]
fn test_same_seed_reproduces_scattering() {
    let factory = ElectroatomicReactionFactory::new(
        Arc::new(aluminium()),
        properties(ElasticElectronDistributionType::Coupled, 1.0),
        ParticleFamily::Electron,
    )
    .unwrap();
    let reaction = factory.create_configured_elastic_reaction().unwrap();
    let first = scatter_cosines(reaction.as_ref(), 1.0, 200, 99);
    let second = scatter_cosines(reaction.as_ref(), 1.0, 200, 99);
    assert_eq!(first, second);
    let other = scatter_cosines(reaction.as_ref(), 1.0, 200, 100);
    assert_ne!(first, other);
}

#[test]
fn test_decoupled_ratio_bounds() {
    let factory = ElectroatomicReactionFactory::new(
        Arc::new(aluminium()),
        properties(ElasticElectronDistributionType::Decoupled, 1.0),
        ParticleFamily::Electron,
    )
    .unwrap();
    let reaction = factory.create_decoupled_elastic_reaction().unwrap();
    let mut energy = 1e-5;
    while energy <= 1e5 {
        let ratio = reaction.sampling_ratio(energy);
        assert!((0.0..=1.0).contains(&ratio), "ratio {} at {}", ratio, energy);
        energy *= 1.7;
    }
    assert_eq!(reaction.sampling_ratio(1e-5), 1.0);
}

#[test]
fn test_cutoff_reaction_respects_cutoff_angle() {
    let factory = ElectroatomicReactionFactory::new(
        Arc::new(aluminium()),
        properties(ElasticElectronDistributionType::Cutoff, 0.9),
        ParticleFamily::Electron,
    )
    .unwrap();
    let reaction = factory.create_configured_elastic_reaction().unwrap();
    for mu in scatter_cosines(reaction.as_ref(), 2.0, 500, 5) {
        assert!(mu <= 0.9 + 1e-9, "mu {} above the cutoff", mu);
        assert!(mu >= -1.0 - 1e-9);
    }
}

#[test]
fn test_screened_rutherford_scatters_into_the_peak() {
    let factory = ElectroatomicReactionFactory::new(
        Arc::new(aluminium()),
        properties(ElasticElectronDistributionType::ScreenedRutherford, 1.0),
        ParticleFamily::Electron,
    )
    .unwrap();
    let reaction = factory.create_configured_elastic_reaction().unwrap();
    for mu in scatter_cosines(reaction.as_ref(), 1.0, 300, 6) {
        assert!(mu >= MU_PEAK - 1e-9, "mu {} below the peak", mu);
    }
}

#[test]
fn test_moment_preserving_samples_discrete_angles() {
    let factory = ElectroatomicReactionFactory::new(
        Arc::new(aluminium()),
        properties(ElasticElectronDistributionType::Hybrid, 0.9),
        ParticleFamily::Electron,
    )
    .unwrap();
    let reaction = factory.create_moment_preserving_elastic_reaction().unwrap();
    for mu in scatter_cosines(&reaction, 1e-1, 300, 8) {
        assert!((mu - 0.95).abs() < 1e-9 || (mu - 0.99).abs() < 1e-9, "mu {}", mu);
    }
}

#[test]
fn test_positron_history() {
    let factory = ElectroatomicReactionFactory::new(
        Arc::new(aluminium()),
        properties(ElasticElectronDistributionType::Decoupled, 1.0),
        ParticleFamily::Positron,
    )
    .unwrap();
    let excitation = factory.create_atomic_excitation_reaction().unwrap();
    let annihilation = factory.create_positron_annihilation_reaction().unwrap();
    assert_eq!(
        annihilation.reaction_type().to_string(),
        "Positron Annihilation Positron-atomic Reaction"
    );

    let mut rng = StdRng::seed_from_u64(21);
    let mut bank = ParticleBank::new();
    let mut positron = Particle::positron(1.0);
    excitation.react(&mut positron, &mut bank, &mut rng);
    assert!(positron.alive && positron.energy < 1.0);
    annihilation.react(&mut positron, &mut bank, &mut rng);
    assert!(!positron.alive);
    assert_eq!(bank.count_of(ParticleType::Photon), 2);
    assert_eq!(positron.collision_number, 2);
}

#[test]
fn test_factory_uses_global_config() {
    {
        let mut config = Config::global();
        config.set_two_d_grid_policy("Correlated").unwrap();
    }
    let factory = ElectroatomicReactionFactory::from_global_config(Arc::new(aluminium()), ParticleFamily::Electron).unwrap();
    assert_eq!(factory.properties().two_d_grid_policy, TwoDGridPolicy::Correlated);
    Config::global().reset();
}
