// Angular distributions that combine a tabulated cutoff region with an analytic or discrete forward region
use crate::distribution::{AngularDistribution, DiscreteDistribution};
use crate::elastic_traits::{sample_screened_rutherford, screened_rutherford_cdf, DELTA_MU_PEAK, MU_PEAK};
use crate::error::{CollisionError, Result};
use crate::interpolation::Interpolation;
use crate::utilities::{bin_index, continuous_cdf, is_sorted_ascending, linear_bin_cdf, sample_linear_bin};

/// Total elastic angular distribution at one energy: the tabulated cutoff
/// distribution on `[-1, MU_PEAK]` weighted by the cutoff cross-section ratio,
/// plus the screened Rutherford peak on `(MU_PEAK, 1]` carrying the rest.
#[derive(Debug, Clone)]
pub struct CoupledElasticDistribution {
    mu: Vec<f64>,
    /// Cutoff table as given (not yet weighted by the ratio)
    pdf: Vec<f64>,
    cdf: Vec<f64>,
    slopes: Vec<f64>,
    /// Area under the cutoff table
    area: f64,
    eta: f64,
    ratio: f64,
    /// Value of the weighted PDF at the peak boundary times `(DELTA_MU_PEAK + eta)^2`
    pdf_parameter: f64,
    interpolation: Interpolation,
}

impl CoupledElasticDistribution {
    /// `mu` must run from -1 to `MU_PEAK`; `pdf` is the cutoff elastic PDF.
    pub fn new(
        mu: Vec<f64>,
        pdf: Vec<f64>,
        moliere_screening_constant: f64,
        cutoff_cross_section_ratio: f64,
        interpolation: Interpolation,
    ) -> Result<Self> {
        validate_angular_table(&mu, &pdf)?;
        if mu[0] != -1.0 || (mu[mu.len() - 1] - MU_PEAK).abs() > 1e-12 {
            return Err(CollisionError::InvalidDistribution(format!(
                "coupled elastic angles must span [-1, {}], got [{}, {}]",
                MU_PEAK,
                mu[0],
                mu[mu.len() - 1]
            )));
        }
        if !(moliere_screening_constant > 0.0) {
            return Err(CollisionError::InvalidDistribution(format!(
                "Moliere screening constant must be positive, got {}",
                moliere_screening_constant
            )));
        }
        if !(cutoff_cross_section_ratio > 0.0 && cutoff_cross_section_ratio <= 1.0) {
            return Err(CollisionError::InvalidDistribution(format!(
                "cutoff cross section ratio must be in (0, 1], got {}",
                cutoff_cross_section_ratio
            )));
        }
        let (cdf, slopes, area) = continuous_cdf(&mu, &pdf);
        if !(area > 0.0) {
            return Err(CollisionError::InvalidDistribution(
                "cutoff elastic PDF encloses no area".to_string(),
            ));
        }
        let last_pdf = pdf[pdf.len() - 1] * cutoff_cross_section_ratio;
        let peak_width = DELTA_MU_PEAK + moliere_screening_constant;

        Ok(CoupledElasticDistribution {
            pdf_parameter: last_pdf * peak_width * peak_width,
            mu,
            pdf,
            cdf,
            slopes,
            area,
            eta: moliere_screening_constant,
            ratio: cutoff_cross_section_ratio,
            interpolation,
        })
    }

    pub fn moliere_screening_constant(&self) -> f64 {
        self.eta
    }

    pub fn cutoff_cross_section_ratio(&self) -> f64 {
        self.ratio
    }

    /// Angle grid of the cutoff table.
    pub fn angles(&self) -> &[f64] {
        &self.mu
    }

    /// Sample only the tabulated part, treating it as a normalized
    /// distribution on `[-1, MU_PEAK]`.
    pub fn sample_cutoff(&self, random_number: f64) -> f64 {
        let target = random_number.clamp(0.0, 1.0) * self.area;
        sample_linear_bin(&self.mu, &self.cdf, &self.pdf, &self.slopes, target).0
    }

    /// Sample only the screened Rutherford peak.
    pub fn sample_screened_rutherford(&self, random_number: f64) -> f64 {
        sample_screened_rutherford(self.eta, random_number)
    }

    fn sample_implementation(&self, random_number: f64) -> f64 {
        if random_number == self.ratio {
            MU_PEAK
        } else if random_number > self.ratio {
            let scaled = (random_number - self.ratio) / (1.0 - self.ratio);
            sample_screened_rutherford(self.eta, scaled)
        } else {
            self.sample_cutoff(random_number / self.ratio)
        }
    }
}

impl AngularDistribution for CoupledElasticDistribution {
    fn evaluate(&self, mu: f64) -> f64 {
        if !(-1.0..=1.0).contains(&mu) {
            0.0
        } else if mu > MU_PEAK {
            let delta_mu = 1.0 - mu;
            self.pdf_parameter / ((delta_mu + self.eta) * (delta_mu + self.eta))
        } else if mu == MU_PEAK {
            self.pdf[self.pdf.len() - 1] * self.ratio
        } else {
            let i = bin_index(&self.mu, mu);
            self.ratio
                * self
                    .interpolation
                    .interpolate(self.mu[i], self.mu[i + 1], mu, self.pdf[i], self.pdf[i + 1])
        }
    }

    fn evaluate_pdf(&self, mu: f64) -> f64 {
        if mu > MU_PEAK {
            self.evaluate(mu) / (self.ratio * self.area)
        } else {
            self.evaluate(mu) / self.area
        }
    }

    fn evaluate_cdf(&self, mu: f64) -> f64 {
        if mu <= -1.0 {
            0.0
        } else if mu < MU_PEAK {
            let i = bin_index(&self.mu, mu);
            self.ratio * linear_bin_cdf(&self.mu, &self.cdf, &self.pdf, &self.slopes, i, mu) / self.area
        } else if mu == MU_PEAK {
            self.ratio
        } else if mu >= 1.0 {
            1.0
        } else {
            self.ratio + (1.0 - self.ratio) * screened_rutherford_cdf(self.eta, mu)
        }
    }

    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.sample_implementation(random_number.clamp(0.0, 1.0))
    }

    fn sample_in_subrange(&self, random_number: f64, max_value: f64) -> f64 {
        let scaled = random_number.clamp(0.0, 1.0) * self.evaluate_cdf(max_value);
        self.sample_implementation(scaled).min(max_value)
    }

    fn lower_bound(&self) -> f64 {
        -1.0
    }

    fn upper_bound(&self) -> f64 {
        1.0
    }
}

/// Hybrid elastic angular distribution at one energy: the tabulated cutoff
/// distribution on `[-1, cutoff]` weighted by the cutoff ratio, and
/// moment-preserving discrete angles above the cutoff carrying the rest.
#[derive(Debug, Clone)]
pub struct HybridElasticDistribution {
    mu: Vec<f64>,
    pdf: Vec<f64>,
    cdf: Vec<f64>,
    slopes: Vec<f64>,
    /// Unweighted table CDF at the cutoff angle
    cutoff_cdf: f64,
    discrete: DiscreteDistribution,
    cutoff_mu: f64,
    ratio: f64,
    interpolation: Interpolation,
}

impl HybridElasticDistribution {
    pub fn new(
        cutoff_mu_grid: Vec<f64>,
        cutoff_pdf: Vec<f64>,
        discrete_angles: Vec<f64>,
        discrete_weights: Vec<f64>,
        cutoff_angle_cosine: f64,
        cutoff_cross_section_ratio: f64,
        interpolation: Interpolation,
    ) -> Result<Self> {
        validate_angular_table(&cutoff_mu_grid, &cutoff_pdf)?;
        if !(cutoff_angle_cosine >= cutoff_mu_grid[0] && cutoff_angle_cosine <= cutoff_mu_grid[cutoff_mu_grid.len() - 1]) {
            return Err(CollisionError::InvalidDistribution(format!(
                "cutoff angle cosine {} is outside the tabulated angles",
                cutoff_angle_cosine
            )));
        }
        if !(0.0..=1.0).contains(&cutoff_cross_section_ratio) {
            return Err(CollisionError::InvalidDistribution(format!(
                "cutoff cross section ratio must be in [0, 1], got {}",
                cutoff_cross_section_ratio
            )));
        }
        if let Some(bad) = discrete_angles.iter().find(|a| **a <= cutoff_angle_cosine || **a > 1.0) {
            return Err(CollisionError::InvalidDistribution(format!(
                "discrete angle {} must lie in ({}, 1]",
                bad, cutoff_angle_cosine
            )));
        }
        let discrete = DiscreteDistribution::new(discrete_angles, discrete_weights)?;
        let (cdf, slopes, _) = continuous_cdf(&cutoff_mu_grid, &cutoff_pdf);
        let i = bin_index(&cutoff_mu_grid, cutoff_angle_cosine);
        let cutoff_cdf = linear_bin_cdf(&cutoff_mu_grid, &cdf, &cutoff_pdf, &slopes, i, cutoff_angle_cosine);
        if !(cutoff_cdf > 0.0) {
            return Err(CollisionError::InvalidDistribution(
                "cutoff elastic PDF encloses no area below the cutoff angle".to_string(),
            ));
        }

        Ok(HybridElasticDistribution {
            mu: cutoff_mu_grid,
            pdf: cutoff_pdf,
            cdf,
            slopes,
            cutoff_cdf,
            discrete,
            cutoff_mu: cutoff_angle_cosine,
            ratio: cutoff_cross_section_ratio,
            interpolation,
        })
    }

    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_mu
    }

    pub fn cutoff_cross_section_ratio(&self) -> f64 {
        self.ratio
    }

    pub fn discrete(&self) -> &DiscreteDistribution {
        &self.discrete
    }

    /// Sample only the tabulated part, normalized on `[-1, cutoff]`.
    pub fn sample_cutoff(&self, random_number: f64) -> f64 {
        let target = random_number.clamp(0.0, 1.0) * self.cutoff_cdf;
        sample_linear_bin(&self.mu, &self.cdf, &self.pdf, &self.slopes, target.min(self.cutoff_cdf))
            .0
            .min(self.cutoff_mu)
    }

    fn sample_implementation(&self, random_number: f64) -> f64 {
        if random_number <= self.ratio {
            let scaled = if self.ratio > 0.0 { random_number / self.ratio } else { 0.0 };
            self.sample_cutoff(scaled)
        } else {
            let scaled = (random_number - self.ratio) / (1.0 - self.ratio);
            self.discrete.sample_with_random_number(scaled)
        }
    }
}

impl AngularDistribution for HybridElasticDistribution {
    fn evaluate(&self, mu: f64) -> f64 {
        if mu < self.mu[0] || mu > self.cutoff_mu {
            return 0.0;
        }
        let i = bin_index(&self.mu, mu);
        self.ratio
            * self
                .interpolation
                .interpolate(self.mu[i], self.mu[i + 1], mu, self.pdf[i], self.pdf[i + 1])
    }

    /// The discrete angles are delta functions and evaluate to zero.
    fn evaluate_pdf(&self, mu: f64) -> f64 {
        self.evaluate(mu) / self.cutoff_cdf
    }

    fn evaluate_cdf(&self, mu: f64) -> f64 {
        if mu <= self.mu[0] {
            0.0
        } else if mu < self.cutoff_mu {
            let i = bin_index(&self.mu, mu);
            self.ratio * linear_bin_cdf(&self.mu, &self.cdf, &self.pdf, &self.slopes, i, mu) / self.cutoff_cdf
        } else if mu < self.discrete.lower_bound() {
            self.ratio
        } else if mu >= self.discrete.upper_bound() {
            1.0
        } else {
            self.ratio + self.discrete.evaluate_cdf(mu) * (1.0 - self.ratio)
        }
    }

    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.sample_implementation(random_number.clamp(0.0, 1.0))
    }

    fn sample_in_subrange(&self, random_number: f64, max_value: f64) -> f64 {
        let scaled = random_number.clamp(0.0, 1.0) * self.evaluate_cdf(max_value);
        self.sample_implementation(scaled).min(max_value)
    }

    fn lower_bound(&self) -> f64 {
        self.mu[0]
    }

    fn upper_bound(&self) -> f64 {
        1.0
    }
}

fn validate_angular_table(mu: &[f64], pdf: &[f64]) -> Result<()> {
    if mu.len() < 2 || mu.len() != pdf.len() {
        return Err(CollisionError::InvalidDistribution(format!(
            "angular table needs at least 2 matching points ({} vs {})",
            mu.len(),
            pdf.len()
        )));
    }
    if !is_sorted_ascending(mu) || mu[0] < -1.0 || mu[mu.len() - 1] > 1.0 {
        return Err(CollisionError::InvalidDistribution(
            "angle cosines must be sorted within [-1, 1]".to_string(),
        ));
    }
    if pdf.iter().any(|p| !(*p >= 0.0) || !p.is_finite()) {
        return Err(CollisionError::InvalidDistribution(
            "angular PDF values must be finite and non-negative".to_string(),
        ));
    }
    Ok(())
}
