// Shared constants and the screened Rutherford screening parameter for elastic electron scattering
use crate::particle::ELECTRON_REST_MASS_ENERGY;

/// Angle cosine above which elastic scattering is treated analytically.
pub const MU_PEAK: f64 = 0.999999;

/// Width of the analytic peak, `1 - MU_PEAK`.
pub const DELTA_MU_PEAK: f64 = 1.0e-6;

pub const FINE_STRUCTURE_CONSTANT: f64 = 7.2973525664e-3;

/// Atom-specific quantities needed by the screened Rutherford peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticTraits {
    atomic_number: u32,
    /// `0.25 (alpha/0.885)^2 Z^(2/3)`
    screening_prefactor: f64,
    /// `3.76 (alpha Z)^2`
    z_term: f64,
}

impl ElasticTraits {
    pub fn new(atomic_number: u32) -> Self {
        let z = atomic_number as f64;
        let alpha = FINE_STRUCTURE_CONSTANT;
        ElasticTraits {
            atomic_number,
            screening_prefactor: 0.25 * (alpha / 0.885).powi(2) * z.powf(2.0 / 3.0),
            z_term: 3.76 * (alpha * z).powi(2),
        }
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    /// Moliere screening constant `eta` at an incoming electron energy (MeV).
    pub fn moliere_screening_constant(&self, energy: f64) -> f64 {
        let tau = energy / ELECTRON_REST_MASS_ENERGY;
        let momentum_sqr = tau * (tau + 2.0);
        let beta_sqr = momentum_sqr / ((tau + 1.0) * (tau + 1.0));
        self.screening_prefactor * (1.13 + self.z_term / beta_sqr) / momentum_sqr
    }
}

/// Normalized screened Rutherford PDF on `[MU_PEAK, 1]`.
pub fn screened_rutherford_pdf(eta: f64, mu: f64) -> f64 {
    if mu < MU_PEAK || mu > 1.0 {
        return 0.0;
    }
    let denom = eta + 1.0 - mu;
    eta * (eta + DELTA_MU_PEAK) / (DELTA_MU_PEAK * denom * denom)
}

/// Normalized screened Rutherford CDF on `[MU_PEAK, 1]`.
pub fn screened_rutherford_cdf(eta: f64, mu: f64) -> f64 {
    if mu <= MU_PEAK {
        return 0.0;
    }
    if mu >= 1.0 {
        return 1.0;
    }
    (eta / DELTA_MU_PEAK * (mu - MU_PEAK) / (eta + 1.0 - mu)).min(1.0)
}

/// Invert [`screened_rutherford_cdf`].
pub fn sample_screened_rutherford(eta: f64, random_number: f64) -> f64 {
    let delta = DELTA_MU_PEAK * random_number;
    ((eta * (MU_PEAK + delta) + delta) / (eta + delta)).clamp(MU_PEAK, 1.0)
}
