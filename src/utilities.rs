// Table search and integration helpers shared by the distributions and reactions

/// Index of the largest element in `x` that is less than or equal to `value`.
///
/// Values below `x[0]` return 0. Values at or above the last element return
/// `x.len() - 1`. `x` must be sorted ascending and non-empty.
pub fn lower_bound_index(x: &[f64], value: f64) -> usize {
    if x.is_empty() || value < x[0] {
        return 0;
    }
    if value >= x[x.len() - 1] {
        return x.len() - 1;
    }

    // Binary search for interval: find largest i with x[i] <= value
    let mut low = 0usize;
    let mut high = x.len() - 1; // invariant: x[low] <= value < x[high]
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if x[mid] <= value {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Lower bin index of `value` in a tabulated grid: like [`lower_bound_index`]
/// but clamped to `x.len() - 2` so that `x[i + 1]` always exists.
pub fn bin_index(x: &[f64], value: f64) -> usize {
    if x.len() < 2 {
        return 0;
    }
    lower_bound_index(x, value).min(x.len() - 2)
}

/// Index of the smallest element in `x` that is greater than or equal to
/// `value`, clamped to the last index. Used to sample discrete CDFs.
pub fn upper_bound_index(x: &[f64], value: f64) -> usize {
    if x.is_empty() {
        return 0;
    }
    let mut low = 0usize;
    let mut high = x.len() - 1;
    if value <= x[0] {
        return 0;
    }
    if value > x[high] {
        return high;
    }
    // invariant: x[low] < value <= x[high]
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if x[mid] < value {
            low = mid;
        } else {
            high = mid;
        }
    }
    high
}

/// True when the values are sorted ascending (repeated values allowed).
pub fn is_sorted_ascending(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] <= w[1])
}

/// True when the values are strictly increasing.
pub fn is_strictly_ascending(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] < w[1])
}

/// Linear interpolation on a linear scale over a whole table.
///
/// If `x_new` is outside the range of `x`, returns the first or last `y` value.
pub fn interpolate_linear(x: &[f64], y: &[f64], x_new: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    if x.len() == 1 || x_new <= x[0] {
        return y[0];
    }
    if x_new >= x[x.len() - 1] {
        return y[y.len() - 1];
    }
    let idx = bin_index(x, x_new);
    let (x1, x2) = (x[idx], x[idx + 1]);
    let (y1, y2) = (y[idx], y[idx + 1]);
    if x2 == x1 {
        return y1;
    }
    y1 + (x_new - x1) * (y2 - y1) / (x2 - x1)
}

/// Unnormalized CDF of a piecewise-linear PDF together with the slopes of
/// each bin. Returns `(cdf, slopes, norm)` where `norm` is the area under the
/// PDF.
///
/// The CDF at bin `i` plus `d*pdf[i] + d^2*slope[i]/2` gives the CDF at
/// `x[i] + d`, which is how [`sample_linear_bin`] inverts it.
pub fn continuous_cdf(x: &[f64], pdf: &[f64]) -> (Vec<f64>, Vec<f64>, f64) {
    let n = x.len();
    let mut cdf = vec![0.0; n];
    let mut slopes = vec![0.0; n];
    for i in 1..n {
        let dx = x[i] - x[i - 1];
        cdf[i] = cdf[i - 1] + 0.5 * dx * (pdf[i] + pdf[i - 1]);
        slopes[i - 1] = if dx > 0.0 {
            (pdf[i] - pdf[i - 1]) / dx
        } else {
            0.0
        };
    }
    let norm = cdf.last().copied().unwrap_or(0.0);
    (cdf, slopes, norm)
}

/// Evaluate an unnormalized piecewise-linear CDF at `value` inside bin `i`.
#[inline]
pub fn linear_bin_cdf(x: &[f64], cdf: &[f64], pdf: &[f64], slopes: &[f64], i: usize, value: f64) -> f64 {
    let d = value - x[i];
    cdf[i] + d * pdf[i] + 0.5 * d * d * slopes[i]
}

/// Invert an unnormalized piecewise-linear CDF for the target `scaled_cdf`.
///
/// Returns the sampled value and the bin it landed in.
pub fn sample_linear_bin(x: &[f64], cdf: &[f64], pdf: &[f64], slopes: &[f64], scaled_cdf: f64) -> (f64, usize) {
    let i = bin_index(cdf, scaled_cdf);
    let cdf_diff = scaled_cdf - cdf[i];
    let pdf_value = pdf[i];
    let slope = slopes[i];
    let sample = if slope != 0.0 {
        let arg = (pdf_value * pdf_value + 2.0 * slope * cdf_diff).max(0.0);
        x[i] + (arg.sqrt() - pdf_value) / slope
    } else if pdf_value > 0.0 {
        x[i] + cdf_diff / pdf_value
    } else {
        x[i]
    };
    (sample.clamp(x[i], x[(i + 1).min(x.len() - 1)]), i)
}
