// Integration tests for the tabulated cross-section layer: grid search,
// interpolation and threshold handling

use atomic_reactions::{HashBasedGridSearcher, Interpolation, StandardReaction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn log_grid(points: usize, min: f64, max: f64) -> Vec<f64> {
    let step = (max / min).ln() / (points - 1) as f64;
    (0..points).map(|i| min * (step * i as f64).exp()).collect()
}

#[test]
fn test_literal_threshold_example() {
    let grid = Arc::new(vec![1.0, 2.0, 4.0]);
    let reaction = StandardReaction::new(grid.clone(), Arc::new(vec![10.0, 20.0]), 1, Interpolation::LinLin).unwrap();
    assert_eq!(reaction.cross_section(1.5), 0.0);
    assert_eq!(reaction.cross_section(3.0), 15.0);

    let reaction = StandardReaction::new(grid, Arc::new(vec![20.0, 30.0]), 1, Interpolation::LinLin).unwrap();
    assert_eq!(reaction.cross_section(3.0), 25.0);
}

#[test]
fn test_grid_points_map_to_their_bins() {
    let grid = Arc::new(log_grid(500, 1e-5, 1e5));
    for bins in [1, 7, 51, 1000] {
        let searcher = HashBasedGridSearcher::with_hash_bins(grid.clone(), bins, false).unwrap();
        for i in 0..grid.len() - 1 {
            assert_eq!(searcher.find_lower_bin_index(grid[i]).unwrap(), i, "{} buckets", bins);
        }
        assert_eq!(searcher.find_lower_bin_index(grid[grid.len() - 1]).unwrap(), grid.len() - 2);
        assert!(searcher.find_lower_bin_index(2e5).is_err());
        assert!(searcher.find_lower_bin_index(1e-6).is_err());
    }
}

#[test]
fn test_random_values_are_bracketed() {
    let grid = Arc::new(log_grid(200, 1e-3, 20.0));
    let searcher = HashBasedGridSearcher::new(grid.clone()).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..10_000 {
        let value = 1e-3 * (20.0f64 / 1e-3).powf(rng.gen::<f64>());
        let bin = searcher.find_lower_bin_index(value).unwrap();
        assert!(grid[bin] <= value && value <= grid[bin + 1], "{} not in bin {}", value, bin);
    }
}

#[test]
fn test_processed_reaction_matches_raw() {
    let grid = log_grid(60, 1e-4, 1e2);
    let cs: Vec<f64> = grid.iter().map(|e| 3.0 * e.powf(-0.7)).collect();
    let raw = StandardReaction::new(Arc::new(grid.clone()), Arc::new(cs.clone()), 0, Interpolation::LogLog).unwrap();
    let processed = StandardReaction::processed(&grid, &cs, 0, Interpolation::LogLog).unwrap();
    assert!(processed.is_processed());

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let energy = 1e-4 * (1e6f64).powf(rng.gen::<f64>());
        let a = raw.cross_section(energy);
        let b = processed.cross_section(energy);
        assert!((a - b).abs() <= 1e-10 * a, "{} vs {} at {}", a, b, energy);
        // A power law is exact under log-log interpolation
        assert!((a - 3.0 * energy.powf(-0.7)).abs() <= 1e-9 * a);
    }
    assert!((processed.threshold_energy() - 1e-4).abs() < 1e-15);
    assert!((processed.max_energy() - 1e2).abs() < 1e-10);
}

#[test]
fn test_interpolation_stays_between_bin_values() {
    let mut rng = StdRng::seed_from_u64(3);
    for policy in [
        Interpolation::LinLin,
        Interpolation::LinLog,
        Interpolation::LogLin,
        Interpolation::LogLog,
    ] {
        for _ in 0..500 {
            let x0 = 1e-3 + rng.gen::<f64>();
            let x1 = x0 + 1e-3 + rng.gen::<f64>();
            let y0 = 1e-2 + rng.gen::<f64>();
            let y1 = 1e-2 + rng.gen::<f64>();
            let x = x0 + rng.gen::<f64>() * (x1 - x0);
            let y = policy.interpolate(x0, x1, x, y0, y1);
            let (lo, hi) = (y0.min(y1), y0.max(y1));
            assert!(y >= lo * (1.0 - 1e-12) && y <= hi * (1.0 + 1e-12), "{} gave {}", policy, y);
        }
    }
}

#[test]
fn test_shared_searcher_between_reactions() {
    let grid = Arc::new(vec![1e-5, 1e-3, 1e-1, 1e1]);
    let searcher = Arc::new(HashBasedGridSearcher::new(grid.clone()).unwrap());
    let a = StandardReaction::with_searcher(grid.clone(), Arc::new(vec![1.0, 2.0, 3.0, 4.0]), 0, searcher.clone(), Interpolation::LinLin)
        .unwrap();
    let b = StandardReaction::with_searcher(grid.clone(), Arc::new(vec![5.0, 6.0]), 2, searcher.clone(), Interpolation::LinLin)
        .unwrap();
    assert!(Arc::ptr_eq(a.grid_searcher(), b.grid_searcher()));
    assert_eq!(b.cross_section(1e-3), 0.0);
    assert_eq!(b.cross_section(1e-1), 5.0);

    let other_grid = Arc::new(vec![1.0, 2.0, 3.0, 4.0]);
    let mismatched = StandardReaction::with_searcher(other_grid, Arc::new(vec![1.0, 2.0]), 0, searcher, Interpolation::LinLin);
    assert!(mismatched.is_err());
}
