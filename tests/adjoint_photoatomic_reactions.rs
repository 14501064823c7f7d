// Integration tests: adjoint photoatomic reactions built from a JSON data file

use atomic_reactions::adjoint_photoatomic::{PAIR_PRODUCTION_LINE_ENERGY, TRIPLET_PRODUCTION_LINE_ENERGY};
use atomic_reactions::relaxation_data::{Table, ThresholdCrossSection};
use atomic_reactions::{
    load_relaxation_data, AdjointPhotoatomicReactionFactory, AngularDistribution, AtomicReaction,
    ElectronPhotonRelaxationData, Particle, ParticleBank, ParticleType,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tempfile::tempdir;

fn hydrogen() -> ElectronPhotonRelaxationData {
    ElectronPhotonRelaxationData {
        atomic_number: 1,
        electron_energy_grid: vec![1e-5, 1e5],
        adjoint_photon_energy_grid: vec![1e-3, 1.0, 10.0, 20.0],
        adjoint_coherent_cross_section: ThresholdCrossSection::new(vec![4.0, 2.0, 1.0, 0.5], 0),
        forward_total_cross_section: ThresholdCrossSection::new(vec![10.0, 6.0, 2.0], 1),
        adjoint_pair_production_energy_distribution: Table::new(
            vec![PAIR_PRODUCTION_LINE_ENERGY, 5.0, 20.0],
            vec![1.0, 0.5, 0.25],
        ),
        adjoint_pair_production_norm_constant: Table::new(vec![1.0, 20.0], vec![0.1, 2.0]),
        adjoint_triplet_production_energy_distribution: Table::new(vec![TRIPLET_PRODUCTION_LINE_ENERGY, 20.0], vec![1.0, 1.0]),
        adjoint_triplet_production_norm_constant: Table::new(vec![1.0, 20.0], vec![0.0, 1.9]),
        ..Default::default()
    }
}

fn factory() -> AdjointPhotoatomicReactionFactory {
    let dir = tempdir().unwrap();
    let path = dir.path().join("H.json");
    hydrogen().to_json_file(&path).unwrap();
    let data = load_relaxation_data(&path).unwrap();
    AdjointPhotoatomicReactionFactory::new(data, 15.0)
        .unwrap()
        .with_critical_line_energies(Arc::new(vec![1.0, 10.0]))
}

#[test]
fn test_grid_truncated_at_max_energy() {
    let factory = factory();
    assert_eq!(factory.energy_grid().as_slice(), &[1e-3, 1.0, 10.0, 15.0]);
    assert_eq!(factory.max_energy(), 15.0);

    let coherent = factory.create_coherent_reaction().unwrap();
    assert!((coherent.cross_section(15.0) - 0.75).abs() < 1e-12);
    assert!((coherent.cross_section(1.0) - 2.0).abs() < 1e-12);
    assert_eq!(coherent.cross_section(16.0), 0.0);

    let total = factory.create_total_forward_reaction().unwrap();
    assert_eq!(total.threshold_energy(), 1.0);
    assert_eq!(total.cross_section(0.5), 0.0);
}

#[test]
fn test_pair_production_line() {
    let reaction = factory().create_pair_production_reaction().unwrap();
    assert!((reaction.cross_section(PAIR_PRODUCTION_LINE_ENERGY) - 1.5).abs() < 1e-12);
    assert_eq!(reaction.cross_section(1.5), 0.0);
    assert_eq!(reaction.energy_distribution().upper_bound(), 15.0);
    assert_eq!(reaction.critical_line_energies(), &[1.0, 10.0]);

    let mut rng = StdRng::seed_from_u64(12);
    let mut bank = ParticleBank::new();
    let mut photon = Particle::adjoint_photon(PAIR_PRODUCTION_LINE_ENERGY);
    reaction.react(&mut photon, &mut bank, &mut rng);

    assert!(photon.energy >= PAIR_PRODUCTION_LINE_ENERGY && photon.energy <= 15.0);
    assert_eq!(bank.len(), 1);
    let probe = bank.pop().unwrap();
    assert!(probe.probe);
    assert_eq!(probe.particle_type, ParticleType::AdjointPhoton);
    assert_eq!(probe.energy, 10.0);
    let expected_weight = reaction.energy_distribution().evaluate_pdf(10.0);
    assert!((probe.weight - expected_weight).abs() < 1e-12);

    let mut probe = probe;
    reaction.react(&mut probe, &mut bank, &mut rng);
    assert!(bank.is_empty());
}

#[test]
fn test_triplet_production_is_reproducible() {
    let reaction = factory().create_triplet_production_reaction().unwrap();
    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut bank = ParticleBank::new();
        (0..100)
            .map(|_| {
                let mut photon = Particle::adjoint_photon(TRIPLET_PRODUCTION_LINE_ENERGY);
                reaction.react(&mut photon, &mut bank, &mut rng);
                photon.energy
            })
            .collect::<Vec<f64>>()
    };
    let energies = run(4);
    assert_eq!(energies, run(4));
    assert!(energies
        .iter()
        .all(|e| *e >= TRIPLET_PRODUCTION_LINE_ENERGY && *e <= 15.0));
}

#[test]
fn test_coherent_scattering_is_symmetric() {
    let reaction = factory().create_coherent_reaction().unwrap();
    let mut rng = StdRng::seed_from_u64(30);
    let mut bank = ParticleBank::new();
    let n = 20_000;
    let mut sum = 0.0;
    for _ in 0..n {
        let mut photon = Particle::adjoint_photon(5.0);
        reaction.react(&mut photon, &mut bank, &mut rng);
        assert_eq!(photon.energy, 5.0);
        sum += photon.direction[2];
    }
    assert!((sum / n as f64).abs() < 0.03);
    assert!(bank.is_empty());
}

#[test]
fn test_max_energy_outside_grid_rejected() {
    let data = Arc::new(hydrogen());
    assert!(AdjointPhotoatomicReactionFactory::new(data.clone(), 25.0).is_err());
    assert!(AdjointPhotoatomicReactionFactory::new(data, 1e-3).is_err());
}
