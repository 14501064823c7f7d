// Builders for the elastic scattering distributions from relaxation data
use crate::config::ElectronProperties;
use crate::distribution::{AngularDistribution, DiscreteDistribution, TabularDistribution};
use crate::elastic_bivariate::{ElasticBivariateDistribution, DEFAULT_FUZZY_BOUND_TOL};
use crate::elastic_distribution::{CoupledElasticDistribution, HybridElasticDistribution};
use crate::elastic_scattering::{
    check_sampling_combination, CoupledElasticScattering, CutoffElasticScattering, HybridElasticScattering,
    MomentPreservingElasticScattering, ScreenedRutherfordScattering,
};
use crate::elastic_traits::{ElasticTraits, MU_PEAK};
use crate::error::{CollisionError, Result};
use crate::interpolation::{Interpolation, TwoDInterpolation};
use crate::relaxation_data::{ElectronPhotonRelaxationData, ThresholdCrossSection};
use crate::utilities::{bin_index, lower_bound_index};
use std::sync::Arc;
use tracing::{debug, info};

/// Policy used along each per-energy angular table.
pub fn angular_table_interpolation(interpolation: TwoDInterpolation) -> Interpolation {
    if interpolation.is_cosine_log() {
        interpolation.zy()
    } else {
        Interpolation::LinLin
    }
}

/// The cutoff angle followed by every raw angle above it.
pub fn angular_grid(raw_angles: &[f64], cutoff_angle_cosine: f64) -> Vec<f64> {
    std::iter::once(cutoff_angle_cosine)
        .chain(raw_angles.iter().copied().filter(|mu| *mu > cutoff_angle_cosine))
        .collect()
}

/// [`angular_grid`] for the tabulated energy nearest to `energy`.
pub fn angular_grid_at_energy(
    data: &ElectronPhotonRelaxationData,
    energy: f64,
    cutoff_angle_cosine: f64,
) -> Result<Vec<f64>> {
    let index = nearest_angular_index(data, energy)?;
    Ok(angular_grid(&data.cutoff_elastic_angles[index], cutoff_angle_cosine))
}

/// Angle grid and PDF of the cutoff elastic distribution at `energy`.
///
/// A tabulated energy uses its own table. Otherwise the grid of the nearer
/// tabulated energy is used and the PDF at each angle is interpolated in
/// energy (lin PDF, log energy) between the two bracketing tables.
pub fn angular_grid_and_pdf(data: &ElectronPhotonRelaxationData, energy: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let grid = &data.elastic_angular_energy_grid;
    require_angular_data(data)?;
    let last = grid.len() - 1;
    if energy <= grid[0] {
        return Ok((data.cutoff_elastic_angles[0].clone(), data.cutoff_elastic_pdf[0].clone()));
    }
    if energy >= grid[last] {
        return Ok((data.cutoff_elastic_angles[last].clone(), data.cutoff_elastic_pdf[last].clone()));
    }
    let lower = lower_bound_index(grid, energy);
    if grid[lower] == energy {
        return Ok((data.cutoff_elastic_angles[lower].clone(), data.cutoff_elastic_pdf[lower].clone()));
    }
    let upper = lower + 1;
    let lower_table = tabulated(data, lower, Interpolation::LinLin)?;
    let upper_table = tabulated(data, upper, Interpolation::LinLin)?;
    let angles = if energy - grid[lower] <= grid[upper] - energy {
        data.cutoff_elastic_angles[lower].clone()
    } else {
        data.cutoff_elastic_angles[upper].clone()
    };
    let pdf = angles
        .iter()
        .map(|&mu| {
            Interpolation::LinLog.interpolate(
                grid[lower],
                grid[upper],
                energy,
                lower_table.evaluate(mu),
                upper_table.evaluate(mu),
            )
        })
        .collect();
    Ok((angles, pdf))
}

/// Restrict a table to `[angles[0], cutoff]`, appending the cutoff with an
/// interpolated PDF value.
pub fn cutoff_subrange(angles: &[f64], pdf: &[f64], cutoff_angle_cosine: f64) -> (Vec<f64>, Vec<f64>) {
    let last = angles[angles.len() - 1];
    if cutoff_angle_cosine >= last {
        return (angles.to_vec(), pdf.to_vec());
    }
    let mut sub_angles: Vec<f64> = angles.iter().copied().take_while(|mu| *mu < cutoff_angle_cosine).collect();
    let mut sub_pdf: Vec<f64> = pdf[..sub_angles.len()].to_vec();
    let i = bin_index(angles, cutoff_angle_cosine);
    let pdf_at_cutoff =
        Interpolation::LinLin.interpolate(angles[i], angles[i + 1], cutoff_angle_cosine, pdf[i], pdf[i + 1]);
    sub_angles.push(cutoff_angle_cosine);
    sub_pdf.push(pdf_at_cutoff);
    (sub_angles, sub_pdf)
}

fn require_angular_data(data: &ElectronPhotonRelaxationData) -> Result<()> {
    if !data.has_elastic_angular_data() || data.cutoff_elastic_angles.len() != data.elastic_angular_energy_grid.len() {
        return Err(CollisionError::MissingData(format!(
            "Z={} has no cutoff elastic angular tables",
            data.atomic_number
        )));
    }
    Ok(())
}

fn require_moment_preserving_data(data: &ElectronPhotonRelaxationData) -> Result<()> {
    if !data.has_moment_preserving_data() {
        return Err(CollisionError::MissingData(format!(
            "Z={} has no moment preserving elastic data",
            data.atomic_number
        )));
    }
    Ok(())
}

fn nearest_angular_index(data: &ElectronPhotonRelaxationData, energy: f64) -> Result<usize> {
    require_angular_data(data)?;
    let grid = &data.elastic_angular_energy_grid;
    if energy < grid[0] || energy > grid[grid.len() - 1] {
        return Err(CollisionError::OutOfRange {
            value: energy,
            min: grid[0],
            max: grid[grid.len() - 1],
        });
    }
    let lower = lower_bound_index(grid, energy);
    if lower + 1 < grid.len() && grid[lower + 1] - energy < energy - grid[lower] {
        Ok(lower + 1)
    } else {
        Ok(lower)
    }
}

fn tabulated(data: &ElectronPhotonRelaxationData, index: usize, interpolation: Interpolation) -> Result<TabularDistribution> {
    TabularDistribution::new(
        data.cutoff_elastic_angles[index].clone(),
        data.cutoff_elastic_pdf[index].clone(),
        interpolation,
    )
}

/// Cross section expanded onto every grid point (zero below the threshold).
fn on_full_grid(cross_section: &ThresholdCrossSection, grid_len: usize) -> Vec<f64> {
    (0..grid_len).map(|i| cross_section.value_at_grid_index(i)).collect()
}

/// Evaluate a table with a policy, clamping `x` onto its range.
fn evaluate_table(grid: &[f64], values: &[f64], interpolation: Interpolation, x: f64) -> f64 {
    if grid.len() == 1 {
        return values[0];
    }
    let x = x.clamp(grid[0], grid[grid.len() - 1]);
    let i = bin_index(grid, x);
    interpolation.interpolate(grid[i], grid[i + 1], x, values[i], values[i + 1])
}

/// Cutoff elastic bivariate running up to `MU_PEAK`.
pub fn create_full_cutoff_distribution(
    data: &ElectronPhotonRelaxationData,
    properties: &ElectronProperties,
) -> Result<Arc<ElasticBivariateDistribution<TabularDistribution>>> {
    require_angular_data(data)?;
    let table_interpolation = angular_table_interpolation(properties.two_d_interpolation);
    let tables = (0..data.elastic_angular_energy_grid.len())
        .map(|i| {
            let (angles, pdf) = cutoff_subrange(&data.cutoff_elastic_angles[i], &data.cutoff_elastic_pdf[i], MU_PEAK);
            TabularDistribution::new(angles, pdf, table_interpolation).map(Arc::new)
        })
        .collect::<Result<Vec<_>>>()?;
    let distribution = ElasticBivariateDistribution::new(
        data.elastic_angular_energy_grid.clone(),
        tables,
        properties.two_d_interpolation,
        properties.two_d_grid_policy,
        MU_PEAK,
        DEFAULT_FUZZY_BOUND_TOL,
        properties.evaluation_tolerance,
    )?;
    Ok(Arc::new(distribution))
}

/// Tabulated elastic scattering below `properties.elastic_cutoff_angle_cosine`.
pub fn create_cutoff_elastic_distribution(
    data: &ElectronPhotonRelaxationData,
    properties: &ElectronProperties,
) -> Result<CutoffElasticScattering> {
    let cutoff = properties.elastic_cutoff_angle_cosine;
    let full = create_full_cutoff_distribution(data, properties)?;
    let partial = if cutoff < MU_PEAK {
        let table_interpolation = angular_table_interpolation(properties.two_d_interpolation);
        let tables = (0..data.elastic_angular_energy_grid.len())
            .map(|i| {
                let (angles, pdf) =
                    cutoff_subrange(&data.cutoff_elastic_angles[i], &data.cutoff_elastic_pdf[i], cutoff);
                TabularDistribution::new(angles, pdf, table_interpolation).map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;
        Some(Arc::new(ElasticBivariateDistribution::new(
            data.elastic_angular_energy_grid.clone(),
            tables,
            properties.two_d_interpolation,
            properties.two_d_grid_policy,
            cutoff,
            DEFAULT_FUZZY_BOUND_TOL,
            properties.evaluation_tolerance,
        )?))
    } else {
        None
    };
    debug!(
        atomic_number = data.atomic_number,
        cutoff,
        interpolation = %properties.two_d_interpolation,
        grid_policy = %properties.two_d_grid_policy,
        "created cutoff elastic distribution"
    );
    CutoffElasticScattering::new(full, partial, cutoff)
}

pub fn create_screened_rutherford_elastic_distribution(data: &ElectronPhotonRelaxationData) -> ScreenedRutherfordScattering {
    ScreenedRutherfordScattering::new(ElasticTraits::new(data.atomic_number))
}

/// Cutoff-to-total elastic cross-section ratios on the electron grid (LinLin).
pub fn create_cutoff_cross_section_ratios(data: &ElectronPhotonRelaxationData) -> Result<TabularDistribution> {
    if data.total_elastic_cross_section.is_empty() || data.cutoff_elastic_cross_section.is_empty() {
        return Err(CollisionError::MissingData(format!(
            "Z={} needs cutoff and total elastic cross sections",
            data.atomic_number
        )));
    }
    let n = data.electron_energy_grid.len();
    let cutoff = on_full_grid(&data.cutoff_elastic_cross_section, n);
    let total = on_full_grid(&data.total_elastic_cross_section, n);
    let ratios = cutoff
        .iter()
        .zip(&total)
        .map(|(c, t)| if *t > 0.0 { (c / t).clamp(0.0, 1.0) } else { 0.0 })
        .collect();
    TabularDistribution::new(data.electron_energy_grid.clone(), ratios, Interpolation::LinLin)
}

/// Full elastic distribution: tabulated cutoff part plus the analytic peak.
pub fn create_coupled_elastic_distribution(
    data: &ElectronPhotonRelaxationData,
    properties: &ElectronProperties,
) -> Result<CoupledElasticScattering> {
    check_sampling_combination(
        properties.coupled_elastic_sampling_method,
        properties.two_d_interpolation.is_cosine_log(),
        properties.two_d_grid_policy,
    )?;
    require_angular_data(data)?;
    let ratios = Arc::new(create_cutoff_cross_section_ratios(data)?);
    let traits = ElasticTraits::new(data.atomic_number);
    let table_interpolation = angular_table_interpolation(properties.two_d_interpolation);

    let tables = data
        .elastic_angular_energy_grid
        .iter()
        .enumerate()
        .map(|(i, &energy)| {
            let (angles, pdf) = cutoff_subrange(&data.cutoff_elastic_angles[i], &data.cutoff_elastic_pdf[i], MU_PEAK);
            CoupledElasticDistribution::new(
                angles,
                pdf,
                traits.moliere_screening_constant(energy),
                ratios.evaluate(energy),
                table_interpolation,
            )
            .map(Arc::new)
        })
        .collect::<Result<Vec<_>>>()?;
    let distribution = Arc::new(ElasticBivariateDistribution::new(
        data.elastic_angular_energy_grid.clone(),
        tables,
        properties.two_d_interpolation,
        properties.two_d_grid_policy,
        1.0,
        DEFAULT_FUZZY_BOUND_TOL,
        properties.evaluation_tolerance,
    )?);
    info!(
        atomic_number = data.atomic_number,
        method = %properties.coupled_elastic_sampling_method,
        interpolation = %properties.two_d_interpolation,
        grid_policy = %properties.two_d_grid_policy,
        "created coupled elastic distribution"
    );
    CoupledElasticScattering::new(distribution, ratios, traits, properties.coupled_elastic_sampling_method)
}

/// Moment-preserving elastic cross section on the electron grid and its
/// threshold index:
/// `mp(E) = cutoff(E) * (1 - cdf(E, cutoff angle)) * reduction(E)`, where the
/// reduction is interpolated log-log on the angular energy grid.
pub fn calculate_moment_preserving_cross_sections(
    data: &ElectronPhotonRelaxationData,
    full_distribution: &ElasticBivariateDistribution<TabularDistribution>,
    cutoff_angle_cosine: f64,
) -> Result<(Vec<f64>, usize)> {
    require_moment_preserving_data(data)?;
    let n = data.electron_energy_grid.len();
    let cutoff_cs = on_full_grid(&data.cutoff_elastic_cross_section, n);
    let angular_grid = &data.elastic_angular_energy_grid;
    let (e_min, e_max) = (angular_grid[0], angular_grid[angular_grid.len() - 1]);

    let cross_section: Vec<f64> = data
        .electron_energy_grid
        .iter()
        .zip(&cutoff_cs)
        .map(|(&energy, &cs)| {
            let reduction = evaluate_table(
                angular_grid,
                &data.moment_preserving_cross_section_reductions,
                Interpolation::LogLog,
                energy,
            );
            let cdf = full_distribution.evaluate_cdf(energy.clamp(e_min, e_max), cutoff_angle_cosine);
            (cs * (1.0 - cdf) * reduction).max(0.0)
        })
        .collect();

    let threshold_index = cross_section.iter().position(|v| *v > 0.0).ok_or_else(|| {
        CollisionError::InvalidCrossSection(format!(
            "Z={} moment preserving cross section is zero everywhere",
            data.atomic_number
        ))
    })?;
    Ok((cross_section[threshold_index..].to_vec(), threshold_index))
}

/// Cutoff elastic cross section scaled by the fraction scattering below the
/// cutoff angle, on the full electron grid.
pub fn calculate_reduced_cutoff_cross_sections(
    data: &ElectronPhotonRelaxationData,
    full_distribution: &ElasticBivariateDistribution<TabularDistribution>,
    cutoff_angle_cosine: f64,
) -> Vec<f64> {
    let n = data.electron_energy_grid.len();
    let e_min = full_distribution.lower_bound_of_primary();
    let e_max = full_distribution.upper_bound_of_primary();
    on_full_grid(&data.cutoff_elastic_cross_section, n)
        .iter()
        .zip(&data.electron_energy_grid)
        .map(|(&cs, &energy)| cs * full_distribution.evaluate_cdf(energy.clamp(e_min, e_max), cutoff_angle_cosine))
        .collect()
}

/// `reduced / (reduced + moment preserving)` on the electron grid (LogLog).
pub fn create_hybrid_cross_section_ratios(
    data: &ElectronPhotonRelaxationData,
    full_distribution: &ElasticBivariateDistribution<TabularDistribution>,
    cutoff_angle_cosine: f64,
) -> Result<TabularDistribution> {
    let reduced = calculate_reduced_cutoff_cross_sections(data, full_distribution, cutoff_angle_cosine);
    let (mp, mp_threshold) = calculate_moment_preserving_cross_sections(data, full_distribution, cutoff_angle_cosine)?;
    let ratios = reduced
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            let m = if i >= mp_threshold { mp[i - mp_threshold] } else { 0.0 };
            if r + m > 0.0 {
                r / (r + m)
            } else {
                0.0
            }
        })
        .collect();
    TabularDistribution::new(data.electron_energy_grid.clone(), ratios, Interpolation::LogLog)
}

/// Tabulated scattering below the cutoff plus discrete angles above it.
pub fn create_hybrid_elastic_distribution(
    data: &ElectronPhotonRelaxationData,
    properties: &ElectronProperties,
) -> Result<HybridElasticScattering> {
    require_moment_preserving_data(data)?;
    let cutoff = properties.elastic_cutoff_angle_cosine;
    if cutoff >= MU_PEAK {
        return Err(CollisionError::UnsupportedCombination(format!(
            "hybrid elastic scattering needs a cutoff angle cosine below {}, got {}",
            MU_PEAK, cutoff
        )));
    }
    let full = create_full_cutoff_distribution(data, properties)?;
    let ratios = create_hybrid_cross_section_ratios(data, &full, cutoff)?;
    let table_interpolation = angular_table_interpolation(properties.two_d_interpolation);

    let tables = data
        .elastic_angular_energy_grid
        .iter()
        .enumerate()
        .map(|(i, &energy)| {
            let (angles, pdf) = cutoff_subrange(&data.cutoff_elastic_angles[i], &data.cutoff_elastic_pdf[i], MU_PEAK);
            HybridElasticDistribution::new(
                angles,
                pdf,
                data.moment_preserving_discrete_angles[i].clone(),
                data.moment_preserving_weights[i].clone(),
                cutoff,
                ratios.evaluate(energy).clamp(0.0, 1.0),
                table_interpolation,
            )
            .map(Arc::new)
        })
        .collect::<Result<Vec<_>>>()?;
    let distribution = Arc::new(ElasticBivariateDistribution::new(
        data.elastic_angular_energy_grid.clone(),
        tables,
        properties.two_d_interpolation,
        properties.two_d_grid_policy,
        1.0,
        DEFAULT_FUZZY_BOUND_TOL,
        properties.evaluation_tolerance,
    )?);
    info!(
        atomic_number = data.atomic_number,
        cutoff,
        grid_policy = %properties.two_d_grid_policy,
        "created hybrid elastic distribution"
    );
    Ok(HybridElasticScattering::new(distribution, cutoff))
}

/// Discrete-angle scattering from the moment-preserving tables.
pub fn create_moment_preserving_elastic_distribution(
    data: &ElectronPhotonRelaxationData,
    properties: &ElectronProperties,
) -> Result<MomentPreservingElasticScattering> {
    require_moment_preserving_data(data)?;
    let tables = data
        .moment_preserving_discrete_angles
        .iter()
        .zip(&data.moment_preserving_weights)
        .map(|(angles, weights)| DiscreteDistribution::new(angles.clone(), weights.clone()).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;
    let distribution = Arc::new(ElasticBivariateDistribution::new(
        data.elastic_angular_energy_grid.clone(),
        tables,
        properties.two_d_interpolation,
        properties.two_d_grid_policy,
        1.0,
        DEFAULT_FUZZY_BOUND_TOL,
        properties.evaluation_tolerance,
    )?);
    Ok(MomentPreservingElasticScattering::new(
        distribution,
        properties.elastic_cutoff_angle_cosine,
    ))
}
