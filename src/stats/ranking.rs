//! Rank assignment with tie averaging
//!
//! Ranks are 1-based: the smallest value has rank 1. Every run of equal
//! values receives the mean of the positions it occupies, so the ranks of any
//! sample of size `n` sum to `n(n+1)/2`.

use crate::core::error::{Error, Result};
use std::cmp::Ordering;

/// Assign tie-averaged 1-based ranks to a sample.
///
/// Ties are detected by exact equality. Fails on an empty sample or on NaN.
///
/// # Example
/// ```
/// use rankstats::stats::rank_data;
///
/// let ranks = rank_data(&[10.0, 30.0, 20.0, 30.0]).unwrap();
/// assert_eq!(ranks, vec![1.0, 3.5, 2.0, 3.5]);
/// ```
pub fn rank_data(data: &[f64]) -> Result<Vec<f64>> {
    if data.is_empty() {
        return Err(Error::EmptyData("Cannot rank an empty sample".into()));
    }
    check_finite_order(data)?;

    Ok(average_ranks(data))
}

/// Sum of 1-based ranks of a sample of size `n`
pub fn expected_rank_sum(n: usize) -> f64 {
    let n = n as f64;
    n * (n + 1.0) / 2.0
}

/// Rank several groups as one pooled sample and split the ranks back per
/// group, preserving each group's original order.
///
/// Ties are averaged across group boundaries.
pub fn pooled_ranks(groups: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let mut pooled = Vec::with_capacity(n_total);
    for group in groups {
        pooled.extend_from_slice(group);
    }

    let ranks = rank_data(&pooled)?;

    let mut split = Vec::with_capacity(groups.len());
    let mut offset = 0;
    for group in groups {
        split.push(ranks[offset..offset + group.len()].to_vec());
        offset += group.len();
    }

    Ok(split)
}

/// Reject samples that have no total order
pub(crate) fn check_finite_order(data: &[f64]) -> Result<()> {
    if data.iter().any(|v| v.is_nan()) {
        return Err(Error::InvalidValue(
            "Sample contains NaN values; remove them before testing".into(),
        ));
    }
    Ok(())
}

/// Tie-averaged ranks of a NaN-free sample
pub(crate) fn average_ranks(data: &[f64]) -> Vec<f64> {
    let n = data.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].partial_cmp(&data[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];

    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && data[order[j]] == data[order[i]] {
            j += 1;
        }

        // Positions i+1 ..= j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }

        i = j;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_without_ties() {
        let ranks = rank_data(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_three_way_tie() {
        // Tie over positions 4, 5, 6 -> rank 5
        let data = vec![1.0, 2.0, 3.0, 7.0, 7.0, 7.0, 9.0];
        let ranks = rank_data(&data).unwrap();
        assert_eq!(ranks, vec![1.0, 2.0, 3.0, 5.0, 5.0, 5.0, 7.0]);
    }

    #[test]
    fn test_rank_sum_invariant_under_ties() {
        let samples: Vec<Vec<f64>> = vec![
            vec![5.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![2.0, 1.0, 2.0, 3.0, 1.0, 2.0],
            vec![0.5, -1.0, 0.5, 8.0, 8.0, -1.0, 3.25, 0.5, 0.5],
        ];
        for sample in samples {
            let ranks = rank_data(&sample).unwrap();
            assert_eq!(ranks.iter().sum::<f64>(), expected_rank_sum(sample.len()));
        }
    }

    #[test]
    fn test_all_equal_sample() {
        let ranks = rank_data(&[4.0; 5]).unwrap();
        assert!(ranks.iter().all(|&r| r == 3.0));
    }

    #[test]
    fn test_signed_zeros_tie() {
        let ranks = rank_data(&[0.0, -0.0, 1.0]).unwrap();
        assert_eq!(ranks, vec![1.5, 1.5, 3.0]);
    }

    #[test]
    fn test_empty_and_nan_rejected() {
        assert!(matches!(rank_data(&[]), Err(Error::EmptyData(_))));
        assert!(matches!(
            rank_data(&[1.0, f64::NAN]),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_pooled_ranks_average_across_groups() {
        let a = [1.0, 3.0];
        let b = [3.0, 2.0, 5.0];
        let ranks = pooled_ranks(&[&a[..], &b[..]]).unwrap();
        assert_eq!(ranks[0], vec![1.0, 3.5]);
        assert_eq!(ranks[1], vec![3.5, 2.0, 5.0]);
    }
}
