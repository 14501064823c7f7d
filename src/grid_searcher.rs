// Hash-based bin lookup over a shared, sorted energy grid
use crate::error::{CollisionError, Result};
use crate::utilities::{is_sorted_ascending, lower_bound_index};
use std::sync::Arc;

/// Locates the bin of a sorted grid that brackets a query value.
///
/// The grid is divided into equally spaced hash buckets (in `ln(E)` when the
/// grid is positive, linearly otherwise). Each bucket stores the range of grid
/// bins that overlap it, so a lookup only needs a short binary search inside
/// one bucket. The searcher never mutates after construction and can be
/// shared between reactions that use the same grid.
///
/// When `processed_grid` is true the grid values are already transformed
/// (for example stored as `ln(E)`) and queries must be given in the same
/// processed coordinate; hashing is then linear.
#[derive(Debug, Clone)]
pub struct HashBasedGridSearcher {
    grid: Arc<Vec<f64>>,
    processed_grid: bool,
    log_hash: bool,
    hash_min: f64,
    hash_bin_width: f64,
    /// Lower grid bin of every hash bucket boundary (`hash_bins + 1` entries).
    hash_grid: Vec<usize>,
}

impl HashBasedGridSearcher {
    /// Number of hash buckets used when the caller does not choose one.
    pub fn default_hash_bins(grid_size: usize) -> usize {
        grid_size / 10 + 1
    }

    /// Build a searcher over a raw grid with the default number of buckets.
    pub fn new(grid: Arc<Vec<f64>>) -> Result<Self> {
        let bins = Self::default_hash_bins(grid.len());
        Self::with_hash_bins(grid, bins, false)
    }

    /// Build a searcher with an explicit number of hash buckets.
    pub fn with_hash_bins(grid: Arc<Vec<f64>>, hash_grid_bins: usize, processed_grid: bool) -> Result<Self> {
        if grid.len() < 2 {
            return Err(CollisionError::InvalidGrid(format!(
                "a grid needs at least 2 points, got {}",
                grid.len()
            )));
        }
        if !is_sorted_ascending(&grid) || grid.iter().any(|v| !v.is_finite()) {
            return Err(CollisionError::InvalidGrid(
                "grid values must be finite and sorted ascending".to_string(),
            ));
        }
        let hash_grid_bins = hash_grid_bins.max(1);
        let log_hash = !processed_grid && grid[0] > 0.0;

        let hashed: Vec<f64> = grid.iter().map(|&v| hash_value(v, log_hash)).collect();
        let hash_min = hashed[0];
        let hash_max = hashed[hashed.len() - 1];
        let hash_bin_width = (hash_max - hash_min) / hash_grid_bins as f64;

        let last_bin = grid.len() - 2;
        let mut hash_grid = Vec::with_capacity(hash_grid_bins + 1);
        for i in 0..=hash_grid_bins {
            let point = if i == hash_grid_bins {
                hash_max
            } else {
                hash_min + i as f64 * hash_bin_width
            };
            hash_grid.push(lower_bound_index(&hashed, point).min(last_bin));
        }

        tracing::debug!(
            grid_points = grid.len(),
            hash_grid_bins,
            log_hash,
            "built hash-based grid searcher"
        );

        Ok(HashBasedGridSearcher {
            grid,
            processed_grid,
            log_hash,
            hash_min,
            hash_bin_width,
            hash_grid,
        })
    }

    pub fn grid(&self) -> &Arc<Vec<f64>> {
        &self.grid
    }

    pub fn is_processed_grid(&self) -> bool {
        self.processed_grid
    }

    pub fn grid_min(&self) -> f64 {
        self.grid[0]
    }

    pub fn grid_max(&self) -> f64 {
        self.grid[self.grid.len() - 1]
    }

    pub fn is_value_within_grid_bounds(&self, value: f64) -> bool {
        value >= self.grid_min() && value <= self.grid_max()
    }

    /// Find `index` such that `grid[index] <= value <= grid[index + 1]`.
    ///
    /// Interior grid points map to their own index and the last grid point
    /// maps to `grid.len() - 2`.
    pub fn find_lower_bin_index(&self, value: f64) -> Result<usize> {
        if !self.is_value_within_grid_bounds(value) {
            return Err(CollisionError::OutOfRange {
                value,
                min: self.grid_min(),
                max: self.grid_max(),
            });
        }
        let last_bin = self.grid.len() - 2;
        if value == self.grid_max() {
            return Ok(last_bin);
        }

        let bucket = self.hash_bucket(value);
        let mut start = self.hash_grid[bucket];
        let mut end = (self.hash_grid[bucket + 1] + 1).min(self.grid.len() - 1);

        // Rounding in the hash transform can leave the value just outside the
        // bucket's bins
        if self.grid[start] > value {
            start = 0;
        }
        if self.grid[end] < value {
            end = self.grid.len() - 1;
        }

        let index = start + lower_bound_index(&self.grid[start..=end], value);
        Ok(index.min(last_bin))
    }

    fn hash_bucket(&self, value: f64) -> usize {
        let buckets = self.hash_grid.len() - 1;
        if self.hash_bin_width <= 0.0 {
            return 0;
        }
        let position = (hash_value(value, self.log_hash) - self.hash_min) / self.hash_bin_width;
        if position <= 0.0 {
            0
        } else {
            (position.floor() as usize).min(buckets - 1)
        }
    }
}

#[inline]
fn hash_value(value: f64, log_hash: bool) -> f64 {
    if log_hash {
        value.ln()
    } else {
        value
    }
}
