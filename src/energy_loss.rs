// Energy-loss scattering: electro-ionization knock-ons and bremsstrahlung photons
use crate::bank::ParticleBank;
use crate::distribution::{AngularDistribution, TabularDistribution};
use crate::elastic_bivariate::{ElasticBivariateDistribution, TwoDGridPolicy, DEFAULT_FUZZY_BOUND_TOL};
use crate::error::{CollisionError, Result};
use crate::interpolation::{Interpolation, TwoDInterpolation};
use crate::particle::{Particle, ParticleType, ELECTRON_REST_MASS_ENERGY};
use crate::relaxation_data::EnergyLossTables;
use rand::{Rng, RngCore};
use std::f64::consts::PI;
use std::sync::Arc;

/// Secondary energy distribution conditioned on the incoming energy.
pub type EnergyLossDistribution = ElasticBivariateDistribution<TabularDistribution>;

/// Energy tables cannot use the cosine policies; those fall back to LogLogLog.
pub fn energy_loss_interpolation(interpolation: TwoDInterpolation) -> TwoDInterpolation {
    if interpolation.zy().is_cosine() {
        TwoDInterpolation::LogLogLog
    } else {
        interpolation
    }
}

/// Build the bivariate energy distribution for a set of tables. Each table is
/// a piecewise-linear PDF over secondary energies.
pub fn create_energy_loss_distribution(
    tables: &EnergyLossTables,
    interpolation: TwoDInterpolation,
    grid_policy: TwoDGridPolicy,
    evaluation_tolerance: f64,
) -> Result<EnergyLossDistribution> {
    if tables.is_empty() {
        return Err(CollisionError::MissingData("energy loss tables are empty".to_string()));
    }
    let distributions = tables
        .secondary_energies
        .iter()
        .zip(&tables.pdf)
        .map(|(energies, pdf)| TabularDistribution::new(energies.clone(), pdf.clone(), Interpolation::LinLin).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;
    ElasticBivariateDistribution::new(
        tables.energy_grid.clone(),
        distributions,
        energy_loss_interpolation(interpolation),
        grid_policy,
        f64::INFINITY,
        DEFAULT_FUZZY_BOUND_TOL,
        evaluation_tolerance,
    )
}

fn sample_azimuth(rng: &mut dyn RngCore) -> f64 {
    2.0 * PI * rng.gen::<f64>()
}

/// Electro-ionization of one subshell.
///
/// The tables hold the knock-on energy, which is the lower of the two
/// outgoing electron energies. Below the first tabulated energy the knock-on
/// energy sampled there is scaled lin-lin between the binding energy (zero
/// knock-on energy) and the first tabulated energy.
#[derive(Debug, Clone)]
pub struct ElectroionizationSubshellScattering {
    distribution: Arc<EnergyLossDistribution>,
    binding_energy: f64,
}

impl ElectroionizationSubshellScattering {
    pub fn new(distribution: Arc<EnergyLossDistribution>, binding_energy: f64) -> Result<Self> {
        if !(binding_energy >= 0.0) || binding_energy >= distribution.lower_bound_of_primary() {
            return Err(CollisionError::InvalidDistribution(format!(
                "binding energy {} must be non-negative and below the first tabulated energy {}",
                binding_energy,
                distribution.lower_bound_of_primary()
            )));
        }
        Ok(ElectroionizationSubshellScattering {
            distribution,
            binding_energy,
        })
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    pub fn min_energy(&self) -> f64 {
        self.distribution.lower_bound_of_primary()
    }

    pub fn max_energy(&self) -> f64 {
        self.distribution.upper_bound_of_primary()
    }

    pub fn distribution(&self) -> &Arc<EnergyLossDistribution> {
        &self.distribution
    }

    /// Largest knock-on energy: half the energy left after paying the binding energy.
    pub fn max_knock_on_energy(&self, incoming_energy: f64) -> f64 {
        if incoming_energy > self.binding_energy {
            0.5 * (incoming_energy - self.binding_energy)
        } else {
            0.0
        }
    }

    /// Cosine of an outgoing electron with `outgoing_energy` relative to the
    /// incoming direction, from two-body kinematics.
    pub fn outgoing_angle(&self, incoming_energy: f64, outgoing_energy: f64) -> f64 {
        let tau = incoming_energy / ELECTRON_REST_MASS_ENERGY;
        let ratio = outgoing_energy / incoming_energy;
        (ratio * (tau + 2.0) / (ratio * tau + 2.0)).sqrt().clamp(0.0, 1.0)
    }

    fn check_energy(&self, incoming_energy: f64) -> Result<()> {
        if incoming_energy > self.binding_energy {
            Ok(())
        } else {
            Err(CollisionError::OutOfRange {
                value: incoming_energy,
                min: self.binding_energy,
                max: self.max_energy(),
            })
        }
    }

    fn sample_knock_on_impl(&self, incoming_energy: f64, random_number: f64, bin_random: Option<f64>) -> Result<f64> {
        self.check_energy(incoming_energy)?;
        let min_energy = self.min_energy();
        let sampler = |d: &TabularDistribution, r: f64| d.sample_with_random_number(r);
        let knock_on = if incoming_energy < min_energy {
            let raw = self.distribution.sample_with(min_energy, random_number, bin_random, sampler)?;
            Interpolation::LinLin.interpolate(self.binding_energy, min_energy, incoming_energy, 0.0, raw)
        } else {
            self.distribution.sample_with(incoming_energy, random_number, bin_random, sampler)?
        };
        Ok(knock_on.min(incoming_energy - self.binding_energy))
    }

    pub fn sample_knock_on(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<f64> {
        let random_number = rng.gen::<f64>();
        let bin_random = rng.gen::<f64>();
        self.sample_knock_on_impl(incoming_energy, random_number, Some(bin_random))
    }

    pub fn sample_knock_on_with_random_number(&self, incoming_energy: f64, random_number: f64) -> Result<f64> {
        self.sample_knock_on_impl(incoming_energy, random_number, None)
    }

    /// PDF of the knock-on energy. Below the first tabulated energy the
    /// scaled table is evaluated and the Jacobian of the scaling applied.
    pub fn evaluate_pdf(&self, incoming_energy: f64, knock_on_energy: f64) -> f64 {
        if incoming_energy <= self.binding_energy || knock_on_energy <= 0.0 {
            return 0.0;
        }
        let min_energy = self.min_energy();
        if incoming_energy < min_energy {
            let scale = (min_energy - self.binding_energy) / (incoming_energy - self.binding_energy);
            return scale * self.distribution.evaluate_pdf(min_energy, knock_on_energy * scale);
        }
        self.distribution.evaluate_pdf(incoming_energy, knock_on_energy)
    }

    /// Bank the knock-on electron and slow the primary electron down.
    /// A primary left with no energy is killed.
    pub fn scatter_electron(&self, electron: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Result<()> {
        let incoming_energy = electron.energy;
        let knock_on_energy = self.sample_knock_on(incoming_energy, rng)?;
        // Binding energy first, so the half-range maximum cannot round below zero
        let outgoing_energy = ((incoming_energy - self.binding_energy) - knock_on_energy).max(0.0);

        let mut knock_on = electron.spawn(ParticleType::Electron, electron.direction, knock_on_energy);
        knock_on.rotate_direction(self.outgoing_angle(incoming_energy, knock_on_energy), sample_azimuth(rng));
        bank.push(knock_on);

        if outgoing_energy > 0.0 {
            let mu = self.outgoing_angle(incoming_energy, outgoing_energy);
            electron.energy = outgoing_energy;
            electron.rotate_direction(mu, sample_azimuth(rng));
        } else {
            electron.energy = 0.0;
            electron.kill();
        }
        Ok(())
    }

    /// Positron-ionization. The knock-on electron is distinguishable from the
    /// positron, so it is drawn from the full symmetric energy-loss range: half
    /// the time it takes the upper half.
    pub fn scatter_positron(&self, positron: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Result<()> {
        let incoming_energy = positron.energy;
        let available = incoming_energy - self.binding_energy;
        let lower_half = self.sample_knock_on(incoming_energy, rng)?;
        let knock_on_energy = if rng.gen::<f64>() < 0.5 { lower_half } else { available - lower_half };
        let positron_energy = (available - knock_on_energy).max(0.0);

        let (knock_on_energy, knock_on_mu) = if knock_on_energy > 0.0 {
            (knock_on_energy, self.outgoing_angle(incoming_energy, knock_on_energy))
        } else {
            (1e-15, 0.0)
        };
        let mut knock_on = positron.spawn(ParticleType::Electron, positron.direction, knock_on_energy);
        knock_on.rotate_direction(knock_on_mu, sample_azimuth(rng));
        bank.push(knock_on);

        if positron_energy > 0.0 {
            let mu = self.outgoing_angle(incoming_energy, positron_energy);
            positron.energy = positron_energy;
            positron.rotate_direction(mu, sample_azimuth(rng));
        } else {
            positron.energy = 0.0;
            positron.kill();
        }
        Ok(())
    }
}

/// Dipole photon emission angle cosine for an electron of kinetic energy `energy`.
pub fn sample_dipole_angle(energy: f64, random_number: f64) -> f64 {
    let scaled = 2.0 * random_number - 1.0;
    let beta = (energy * (energy + 2.0 * ELECTRON_REST_MASS_ENERGY)).sqrt() / (energy + ELECTRON_REST_MASS_ENERGY);
    ((scaled + beta) / (scaled * beta + 1.0)).clamp(-1.0, 1.0)
}

/// Bremsstrahlung: the electron (or positron) keeps its direction, loses the
/// photon energy, and the photon is emitted with the dipole distribution.
#[derive(Debug, Clone)]
pub struct BremsstrahlungScattering {
    distribution: Arc<EnergyLossDistribution>,
}

impl BremsstrahlungScattering {
    pub fn new(distribution: Arc<EnergyLossDistribution>) -> Self {
        BremsstrahlungScattering { distribution }
    }

    pub fn min_energy(&self) -> f64 {
        self.distribution.lower_bound_of_primary()
    }

    pub fn max_energy(&self) -> f64 {
        self.distribution.upper_bound_of_primary()
    }

    pub fn distribution(&self) -> &Arc<EnergyLossDistribution> {
        &self.distribution
    }

    /// Sample a photon energy no larger than the incoming energy. Energies
    /// below the first table use that table.
    pub fn sample_photon_energy(&self, incoming_energy: f64, rng: &mut dyn RngCore) -> Result<f64> {
        if !(incoming_energy > 0.0) {
            return Err(CollisionError::OutOfRange {
                value: incoming_energy,
                min: 0.0,
                max: self.max_energy(),
            });
        }
        let random_number = rng.gen::<f64>();
        let bin_random = rng.gen::<f64>();
        let lookup_energy = incoming_energy.max(self.min_energy());
        let photon_energy = self.distribution.sample_with(lookup_energy, random_number, Some(bin_random), |d, r| {
            d.sample_in_subrange(r, incoming_energy)
        })?;
        Ok(photon_energy.min(incoming_energy))
    }

    pub fn evaluate_pdf(&self, incoming_energy: f64, photon_energy: f64) -> f64 {
        if photon_energy > incoming_energy {
            return 0.0;
        }
        self.distribution.evaluate_pdf(incoming_energy, photon_energy)
    }

    pub fn scatter(&self, particle: &mut Particle, bank: &mut ParticleBank, rng: &mut dyn RngCore) -> Result<()> {
        let incoming_energy = particle.energy;
        let photon_energy = self.sample_photon_energy(incoming_energy, rng)?;

        let mu = sample_dipole_angle(incoming_energy, rng.gen::<f64>());
        let mut photon = particle.spawn(ParticleType::Photon, particle.direction, photon_energy);
        photon.rotate_direction(mu, sample_azimuth(rng));
        bank.push(photon);

        let outgoing_energy = incoming_energy - photon_energy;
        if outgoing_energy > 0.0 {
            particle.energy = outgoing_energy;
        } else {
            particle.energy = 0.0;
            particle.kill();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn knock_on_tables() -> EnergyLossTables {
        EnergyLossTables::new(
            vec![1e-2, 1.0, 1e2],
            vec![vec![1e-6, 4e-3], vec![1e-6, 0.49], vec![1e-6, 49.9]],
            vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![3.0, 1.0]],
        )
    }

    fn ionization() -> ElectroionizationSubshellScattering {
        let distribution = create_energy_loss_distribution(
            &knock_on_tables(),
            TwoDInterpolation::LinLinLin,
            TwoDGridPolicy::UnitBaseCorrelated,
            1e-7,
        )
        .unwrap();
        ElectroionizationSubshellScattering::new(Arc::new(distribution), 2e-3).unwrap()
    }

    fn bremsstrahlung() -> BremsstrahlungScattering {
        let tables = EnergyLossTables::new(
            vec![1e-2, 1e2],
            vec![vec![1e-7, 1e-2], vec![1e-7, 1e2]],
            vec![vec![10.0, 1.0], vec![10.0, 1.0]],
        );
        let distribution =
            create_energy_loss_distribution(&tables, TwoDInterpolation::LogLogLog, TwoDGridPolicy::Direct, 1e-7)
                .unwrap();
        BremsstrahlungScattering::new(Arc::new(distribution))
    }

    #[test]
    fn test_cosine_interpolation_falls_back() {
        assert_eq!(energy_loss_interpolation(TwoDInterpolation::LogLogCosLog), TwoDInterpolation::LogLogLog);
        assert_eq!(energy_loss_interpolation(TwoDInterpolation::LinLinLog), TwoDInterpolation::LinLinLog);
    }

    #[test]
    fn test_outgoing_angle_limits() {
        let scattering = ionization();
        assert!((scattering.outgoing_angle(1.0, 1.0) - 1.0).abs() < 1e-15);
        assert_eq!(scattering.outgoing_angle(1.0, 0.0), 0.0);
        let tau = 1.0 / ELECTRON_REST_MASS_ENERGY;
        let expected = (0.5 * (tau + 2.0) / (0.5 * tau + 2.0)).sqrt();
        assert!((scattering.outgoing_angle(1.0, 0.5) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_knock_on_on_grid_point() {
        let scattering = ionization();
        let knock_on = scattering.sample_knock_on_with_random_number(1.0, 0.0).unwrap();
        assert!((knock_on - 1e-6).abs() < 1e-15);
        let knock_on = scattering.sample_knock_on_with_random_number(1.0, 1.0).unwrap();
        assert!((knock_on - 0.49).abs() < 1e-12);
        assert!((scattering.max_knock_on_energy(1.0) - 0.499).abs() < 1e-15);
    }

    #[test]
    fn test_knock_on_below_first_table_is_scaled() {
        let scattering = ionization();
        let min = scattering.min_energy();
        let at_min = scattering.sample_knock_on_with_random_number(min, 0.7).unwrap();
        let energy = 6e-3;
        let scaled = scattering.sample_knock_on_with_random_number(energy, 0.7).unwrap();
        let expected = at_min * (energy - 2e-3) / (min - 2e-3);
        assert!((scaled - expected).abs() < 1e-15);
        assert!(scattering.sample_knock_on_with_random_number(1e-3, 0.5).is_err());
    }

    #[test]
    fn test_knock_on_pdf_below_first_table_is_normalized() {
        let scattering = ionization();
        let energy = 6e-3;
        let max = scattering.sample_knock_on_with_random_number(energy, 1.0).unwrap();
        let n = 2000;
        let h = max / n as f64;
        let area: f64 = (0..n)
            .map(|i| scattering.evaluate_pdf(energy, (i as f64 + 0.5) * h) * h)
            .sum();
        assert!((area - 1.0).abs() < 1e-2, "area {}", area);
        assert_eq!(scattering.evaluate_pdf(1e-3, 1e-4), 0.0);
    }

    #[test]
    fn test_scatter_electron_conserves_energy() {
        let scattering = ionization();
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let mut bank = ParticleBank::new();
            let mut electron = Particle::electron(1.0);
            scattering.scatter_electron(&mut electron, &mut bank, &mut rng).unwrap();
            assert_eq!(bank.count_of(ParticleType::Electron), 1);
            let knock_on = bank.pop().unwrap();
            assert!(knock_on.energy <= electron.energy);
            assert!((knock_on.energy + electron.energy + 2e-3 - 1.0).abs() < 1e-12);
            assert!(electron.alive);
            assert!(electron.direction[2] >= 0.0 && knock_on.direction[2] >= 0.0);
        }
    }

    #[test]
    fn test_scatter_positron_covers_both_halves() {
        let scattering = ionization();
        let mut rng = StdRng::seed_from_u64(22);
        let mut upper = 0usize;
        for _ in 0..400 {
            let mut bank = ParticleBank::new();
            let mut positron = Particle::positron(1.0);
            scattering.scatter_positron(&mut positron, &mut bank, &mut rng).unwrap();
            let knock_on = bank.pop().unwrap();
            assert_eq!(knock_on.particle_type, ParticleType::Electron);
            assert!((knock_on.energy + positron.energy + 2e-3 - 1.0).abs() < 1e-12);
            if knock_on.energy > 0.499 {
                upper += 1;
            }
        }
        assert!(upper > 150 && upper < 250, "upper half count {}", upper);
    }

    #[test]
    fn test_dipole_angle_bounds() {
        assert!((sample_dipole_angle(1.0, 1.0) - 1.0).abs() < 1e-15);
        assert!((sample_dipole_angle(1.0, 0.0) + 1.0).abs() < 1e-15);
        let beta = (3.0f64 * (3.0 + 2.0 * ELECTRON_REST_MASS_ENERGY)).sqrt() / (3.0 + ELECTRON_REST_MASS_ENERGY);
        assert!((sample_dipole_angle(3.0, 0.5) - beta).abs() < 1e-15);
    }

    #[test]
    fn test_bremsstrahlung_banks_photon() {
        let scattering = bremsstrahlung();
        let mut rng = StdRng::seed_from_u64(23);
        for energy in [5e-3, 1.0, 50.0] {
            let mut bank = ParticleBank::new();
            let mut electron = Particle::electron(energy);
            scattering.scatter(&mut electron, &mut bank, &mut rng).unwrap();
            let photon = bank.pop().unwrap();
            assert_eq!(photon.particle_type, ParticleType::Photon);
            assert!(photon.energy <= energy);
            assert!((photon.energy + electron.energy - energy).abs() < 1e-12);
            assert_eq!(electron.direction, [0.0, 0.0, 1.0]);
        }
        assert_eq!(scattering.evaluate_pdf(1.0, 2.0), 0.0);
        assert!(scattering.evaluate_pdf(1.0, 1e-3) > 0.0);
    }
}
