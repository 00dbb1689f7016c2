//! Reproducible random subsampling

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::{Error, Result};

/// Draw `size` distinct indices out of `0..n` with a seeded generator
///
/// The same `(n, size, seed)` always yields the same indices, returned in
/// ascending order.
pub fn sample_indices(n: usize, size: usize, seed: u64) -> Result<Vec<usize>> {
    if size > n {
        return Err(Error::InvalidValue(format!(
            "For sampling without replacement, sample size ({}) must not exceed data size ({})",
            size, n
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = index::sample(&mut rng, n, size).into_vec();
    indices.sort_unstable();
    Ok(indices)
}

/// Seeded sample without replacement of `size` values
pub fn sample_without_replacement(data: &[f64], size: usize, seed: u64) -> Result<Vec<f64>> {
    let indices = sample_indices(data.len(), size, seed)?;
    Ok(indices.into_iter().map(|i| data[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_reproducible() {
        let data: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let a = sample_without_replacement(&data, 100, 42).unwrap();
        let b = sample_without_replacement(&data, 100, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
    }

    #[test]
    fn test_sample_indices_are_distinct() {
        let idx = sample_indices(50, 50, 7).unwrap();
        assert_eq!(idx, (0..50).collect::<Vec<_>>());

        let idx = sample_indices(500, 20, 7).unwrap();
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert!(idx.iter().all(|&i| i < 500));
    }

    #[test]
    fn test_sample_too_large() {
        assert!(sample_indices(3, 4, 42).is_err());
    }
}
