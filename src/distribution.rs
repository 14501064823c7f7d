// One-dimensional distributions over a secondary variable (usually an angle cosine)
use crate::error::{CollisionError, Result};
use crate::interpolation::Interpolation;
use crate::utilities::{
    bin_index, continuous_cdf, is_sorted_ascending, linear_bin_cdf, sample_linear_bin, upper_bound_index,
};
use rand::{Rng, RngCore};
use std::fmt::Debug;

/// A univariate distribution that can be evaluated and sampled.
///
/// `sample_with_random_number` maps a uniform number in `[0, 1]` to a value in
/// `[lower_bound, upper_bound]`; `sample_in_subrange` restricts the result to
/// `[lower_bound, max]`.
pub trait AngularDistribution: Debug + Send + Sync {
    fn evaluate(&self, value: f64) -> f64;
    fn evaluate_pdf(&self, value: f64) -> f64;
    fn evaluate_cdf(&self, value: f64) -> f64;
    fn sample_with_random_number(&self, random_number: f64) -> f64;
    fn sample_in_subrange(&self, random_number: f64, max_value: f64) -> f64;
    fn lower_bound(&self) -> f64;
    fn upper_bound(&self) -> f64;

    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.sample_with_random_number(rng.gen::<f64>())
    }
}

/// Piecewise tabulated distribution.
///
/// `evaluate` interpolates the tabulated values with the chosen policy. The
/// CDF and sampling always treat the PDF as piecewise linear.
#[derive(Debug, Clone)]
pub struct TabularDistribution {
    x: Vec<f64>,
    values: Vec<f64>,
    cdf: Vec<f64>,
    pdf: Vec<f64>,
    slopes: Vec<f64>,
    norm: f64,
    interpolation: Interpolation,
}

impl TabularDistribution {
    pub fn new(x: Vec<f64>, values: Vec<f64>, interpolation: Interpolation) -> Result<Self> {
        validate_table(&x, &values)?;
        if let Some(bad) = x.iter().find(|v| !interpolation.is_indep_var_in_valid_range(**v)) {
            return Err(CollisionError::InvalidDistribution(format!(
                "value {} is outside the valid range of {} interpolation",
                bad, interpolation
            )));
        }
        let (cdf, slopes, area) = continuous_cdf(&x, &values);
        if !(area > 0.0) || !area.is_finite() {
            return Err(CollisionError::InvalidDistribution(format!(
                "tabulated values must enclose a positive area, got {}",
                area
            )));
        }
        let pdf: Vec<f64> = values.iter().map(|v| v / area).collect();
        let cdf: Vec<f64> = cdf.iter().map(|c| c / area).collect();
        let slopes: Vec<f64> = slopes.iter().map(|s| s / area).collect();

        Ok(TabularDistribution {
            x,
            values,
            cdf,
            pdf,
            slopes,
            norm: area,
            interpolation,
        })
    }

    /// Build from tabulated CDF values. The PDF is a first-order estimate, so
    /// evaluation is approximate while sampling reproduces the CDF.
    pub fn from_cdf(x: Vec<f64>, cdf_values: Vec<f64>) -> Result<Self> {
        if x.len() != cdf_values.len() || x.len() < 2 {
            return Err(CollisionError::InvalidDistribution(
                "a CDF table needs at least 2 matching points".to_string(),
            ));
        }
        if !is_sorted_ascending(&cdf_values) {
            return Err(CollisionError::InvalidDistribution(
                "CDF values must be non-decreasing".to_string(),
            ));
        }
        let mut pdf = Vec::with_capacity(x.len());
        for i in 0..x.len() - 1 {
            let dx = x[i + 1] - x[i];
            pdf.push(if dx > 0.0 { (cdf_values[i + 1] - cdf_values[i]) / dx } else { 0.0 });
        }
        pdf.push(pdf[pdf.len() - 1]);
        Self::new(x, pdf, Interpolation::LinLin)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The tabulated (unnormalized) values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Area under the tabulated values.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    fn in_bounds(&self, value: f64) -> bool {
        value >= self.x[0] && value <= self.x[self.x.len() - 1]
    }
}

impl AngularDistribution for TabularDistribution {
    fn evaluate(&self, value: f64) -> f64 {
        if !self.in_bounds(value) {
            return 0.0;
        }
        let i = bin_index(&self.x, value);
        self.interpolation
            .interpolate(self.x[i], self.x[i + 1], value, self.values[i], self.values[i + 1])
    }

    fn evaluate_pdf(&self, value: f64) -> f64 {
        self.evaluate(value) / self.norm
    }

    fn evaluate_cdf(&self, value: f64) -> f64 {
        if !(value > self.x[0]) {
            return 0.0;
        }
        if value >= self.x[self.x.len() - 1] {
            return 1.0;
        }
        let i = bin_index(&self.x, value);
        linear_bin_cdf(&self.x, &self.cdf, &self.pdf, &self.slopes, i, value).clamp(0.0, 1.0)
    }

    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        sample_linear_bin(&self.x, &self.cdf, &self.pdf, &self.slopes, random_number.clamp(0.0, 1.0)).0
    }

    fn sample_in_subrange(&self, random_number: f64, max_value: f64) -> f64 {
        if max_value >= self.upper_bound() {
            return self.sample_with_random_number(random_number);
        }
        let scaled = random_number.clamp(0.0, 1.0) * self.evaluate_cdf(max_value);
        sample_linear_bin(&self.x, &self.cdf, &self.pdf, &self.slopes, scaled)
            .0
            .min(max_value)
    }

    fn lower_bound(&self) -> f64 {
        self.x[0]
    }

    fn upper_bound(&self) -> f64 {
        self.x[self.x.len() - 1]
    }
}

/// Distribution made of weighted point values.
#[derive(Debug, Clone)]
pub struct DiscreteDistribution {
    values: Vec<f64>,
    weights: Vec<f64>,
    cdf: Vec<f64>,
    total_weight: f64,
}

impl DiscreteDistribution {
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        if values.is_empty() || values.len() != weights.len() {
            return Err(CollisionError::InvalidDistribution(format!(
                "discrete distribution needs matching non-empty values and weights ({} vs {})",
                values.len(),
                weights.len()
            )));
        }
        if !is_sorted_ascending(&values) {
            return Err(CollisionError::InvalidDistribution(
                "discrete values must be sorted ascending".to_string(),
            ));
        }
        if weights.iter().any(|w| !(*w >= 0.0) || !w.is_finite()) {
            return Err(CollisionError::InvalidDistribution(
                "discrete weights must be finite and non-negative".to_string(),
            ));
        }
        let total_weight: f64 = weights.iter().sum();
        if !(total_weight > 0.0) {
            return Err(CollisionError::InvalidDistribution(
                "discrete weights sum to zero".to_string(),
            ));
        }
        let mut running = 0.0;
        let mut cdf: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w / total_weight;
                running
            })
            .collect();
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Ok(DiscreteDistribution {
            values,
            weights,
            cdf,
            total_weight,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Normalized cumulative weights, one per value.
    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    fn position(&self, value: f64) -> Option<usize> {
        self.values.iter().position(|v| *v == value)
    }
}

impl AngularDistribution for DiscreteDistribution {
    fn evaluate(&self, value: f64) -> f64 {
        self.position(value).map_or(0.0, |i| self.weights[i])
    }

    fn evaluate_pdf(&self, value: f64) -> f64 {
        self.evaluate(value) / self.total_weight
    }

    fn evaluate_cdf(&self, value: f64) -> f64 {
        if value < self.values[0] {
            return 0.0;
        }
        let i = self.values.iter().rposition(|v| *v <= value).unwrap_or(0);
        self.cdf[i]
    }

    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.values[upper_bound_index(&self.cdf, random_number)]
    }

    fn sample_in_subrange(&self, random_number: f64, max_value: f64) -> f64 {
        let scaled = random_number * self.evaluate_cdf(max_value);
        self.values[upper_bound_index(&self.cdf, scaled)].min(max_value)
    }

    fn lower_bound(&self) -> f64 {
        self.values[0]
    }

    fn upper_bound(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}

fn validate_table(x: &[f64], values: &[f64]) -> Result<()> {
    if x.len() < 2 || x.len() != values.len() {
        return Err(CollisionError::InvalidDistribution(format!(
            "a tabular distribution needs at least 2 matching points ({} vs {})",
            x.len(),
            values.len()
        )));
    }
    if !is_sorted_ascending(x) || x.iter().any(|v| !v.is_finite()) {
        return Err(CollisionError::InvalidDistribution(
            "independent values must be finite and sorted ascending".to_string(),
        ));
    }
    if let Some(bad) = values.iter().find(|v| !(**v >= 0.0) || !v.is_finite()) {
        return Err(CollisionError::InvalidDistribution(format!(
            "tabulated values must be finite and non-negative, found {}",
            bad
        )));
    }
    Ok(())
}
