//! Non-parametric statistical tests
//!
//! Kruskal-Wallis H test and the two-sample Kolmogorov-Smirnov test, both
//! with permutation p-values instead of asymptotic approximations.

use crate::core::error::{Error, Result};
use crate::stats::hypothesis::{AlternativeHypothesis, TestResult};
use crate::stats::permutation::{permutation_result, shuffled_statistics, PermutationOptions};
use crate::stats::ranking::{check_finite_order, pooled_ranks};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Kruskal-Wallis H statistic for `k ≥ 2` non-empty groups.
///
/// The groups are pooled and ranked together, so ties are averaged over the
/// whole sample, then `H = 12/(N(N+1)) · Σ R_i²/n_i − 3(N+1)`.
pub fn kruskal_wallis_h(groups: &[&[f64]]) -> Result<f64> {
    let sizes = validate_groups(groups)?;
    let ranks = pooled_ranks(groups)?;
    let rank_sums: Vec<f64> = ranks.iter().map(|r| r.iter().sum()).collect();

    Ok(h_from_rank_sums(&rank_sums, &sizes))
}

/// Kruskal-Wallis H test with a permutation p-value.
///
/// Pooled values are shuffled and re-split positionally into groups of the
/// original sizes; the p-value is the fraction of shuffles with
/// `H ≥ H_observed`.
pub fn kruskal_wallis_test(groups: &[&[f64]], options: &PermutationOptions) -> Result<TestResult> {
    let sizes = validate_groups(groups)?;
    let ranks = pooled_ranks(groups)?;
    let rank_sums: Vec<f64> = ranks.iter().map(|r| r.iter().sum()).collect();
    let observed = h_from_rank_sums(&rank_sums, &sizes);

    // H depends on the data only through the pooled ranks
    let pooled: Vec<f64> = ranks.concat();
    let null_h = shuffled_statistics(&pooled, options, |shuffled| {
        let mut offset = 0;
        let sums: Vec<f64> = sizes
            .iter()
            .map(|&size| {
                let sum = shuffled[offset..offset + size].iter().sum();
                offset += size;
                sum
            })
            .collect();
        h_from_rank_sums(&sums, &sizes)
    })?;

    let k = groups.len();
    let n_total: usize = sizes.iter().sum();

    let mut additional_info = HashMap::new();
    additional_info.insert("k_groups".to_string(), k as f64);
    additional_info.insert("n_total".to_string(), n_total as f64);
    for (i, (&rank_sum, &size)) in rank_sums.iter().zip(&sizes).enumerate() {
        additional_info.insert(format!("rank_sum_group_{}", i), rank_sum);
        additional_info.insert(format!("n_group_{}", i), size as f64);
    }

    let mut result = permutation_result(
        "Kruskal-Wallis test",
        observed,
        &null_h,
        AlternativeHypothesis::Greater,
        options,
        additional_info,
    );
    result.degrees_of_freedom = Some((k - 1) as f64);
    Ok(result)
}

fn validate_groups(groups: &[&[f64]]) -> Result<Vec<usize>> {
    if groups.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "At least two groups are required, got {}",
            groups.len()
        )));
    }

    for (i, group) in groups.iter().enumerate() {
        if group.is_empty() {
            return Err(Error::InsufficientData(format!("Group {} is empty", i)));
        }
    }

    Ok(groups.iter().map(|g| g.len()).collect())
}

fn h_from_rank_sums(rank_sums: &[f64], sizes: &[usize]) -> f64 {
    let n_total = sizes.iter().sum::<usize>() as f64;

    let weighted: f64 = rank_sums
        .iter()
        .zip(sizes)
        .map(|(&r, &n)| r * r / n as f64)
        .sum();

    12.0 / (n_total * (n_total + 1.0)) * weighted - 3.0 * (n_total + 1.0)
}

/// Empirical CDFs of two samples evaluated on a fixed grid of points.
///
/// Samples are sorted once and walked together with the sorted grid, so one
/// evaluation costs `O(points + |x| + |y|)` instead of a scan per point.
#[derive(Debug, Clone)]
struct EcdfGrid {
    points: Vec<f64>,
}

impl EcdfGrid {
    /// Sorted unique values of both samples
    fn from_samples(x: &[f64], y: &[f64]) -> Self {
        let mut points = Vec::with_capacity(x.len() + y.len());
        points.extend_from_slice(x);
        points.extend_from_slice(y);
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        points.dedup();
        EcdfGrid { points }
    }

    /// Maximum |F_x − F_y| over the grid; both inputs must be sorted
    fn max_distance(&self, sorted_x: &[f64], sorted_y: &[f64]) -> f64 {
        let nx = sorted_x.len() as f64;
        let ny = sorted_y.len() as f64;
        let (mut ix, mut iy) = (0, 0);
        let mut max_d: f64 = 0.0;

        for &point in &self.points {
            while ix < sorted_x.len() && sorted_x[ix] <= point {
                ix += 1;
            }
            while iy < sorted_y.len() && sorted_y[iy] <= point {
                iy += 1;
            }
            max_d = max_d.max((ix as f64 / nx - iy as f64 / ny).abs());
        }

        max_d
    }
}

fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

fn validate_ks_samples(x: &[f64], y: &[f64]) -> Result<()> {
    if x.is_empty() || y.is_empty() {
        return Err(Error::InsufficientData(
            "Both samples must contain data".into(),
        ));
    }
    check_finite_order(x)?;
    check_finite_order(y)
}

/// Two-sample Kolmogorov-Smirnov distance `max |F_x − F_y|`.
///
/// The samples may have different sizes. The result lies in `[0, 1]`.
pub fn ks_statistic(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_ks_samples(x, y)?;
    let grid = EcdfGrid::from_samples(x, y);
    Ok(grid.max_distance(&sorted_copy(x), &sorted_copy(y)))
}

/// Two-sample Kolmogorov-Smirnov test with a permutation p-value.
///
/// The pooled sample is shuffled, the first `|x|` values become the new X
/// and the rest the new Y, and the distance is recomputed on the evaluation
/// points of the observed samples. The p-value is the fraction of shuffles
/// with `D ≥ D_observed`.
pub fn ks_permutation_test(
    x: &[f64],
    y: &[f64],
    options: &PermutationOptions,
) -> Result<TestResult> {
    validate_ks_samples(x, y)?;

    let grid = EcdfGrid::from_samples(x, y);
    let observed = grid.max_distance(&sorted_copy(x), &sorted_copy(y));

    let mut pooled = Vec::with_capacity(x.len() + y.len());
    pooled.extend_from_slice(x);
    pooled.extend_from_slice(y);

    let nx = x.len();
    let null_d = shuffled_statistics(&pooled, options, |shuffled| {
        let new_x = sorted_copy(&shuffled[..nx]);
        let new_y = sorted_copy(&shuffled[nx..]);
        grid.max_distance(&new_x, &new_y)
    })?;

    let mut additional_info = HashMap::new();
    additional_info.insert("n1".to_string(), nx as f64);
    additional_info.insert("n2".to_string(), y.len() as f64);
    additional_info.insert("evaluation_points".to_string(), grid.points.len() as f64);

    Ok(permutation_result(
        "Kolmogorov-Smirnov two-sample test",
        observed,
        &null_d,
        AlternativeHypothesis::Greater,
        options,
        additional_info,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kruskal_wallis_separated_groups() {
        let group1 = vec![1.0, 2.0, 3.0];
        let group2 = vec![4.0, 5.0, 6.0];
        let group3 = vec![7.0, 8.0, 9.0];
        let groups = vec![group1.as_slice(), group2.as_slice(), group3.as_slice()];

        let h = kruskal_wallis_h(&groups).unwrap();
        assert!((h - 7.2).abs() < 1e-9);
    }

    #[test]
    fn test_kruskal_wallis_ties_across_groups() {
        // Pooled ranks: 1 -> 1.5 (both groups), 2 -> 3, 3 -> 4
        let a = [1.0, 3.0];
        let b = [1.0, 2.0];
        let h = kruskal_wallis_h(&[&a[..], &b[..]]).unwrap();

        let expected = 12.0 / 20.0 * (5.5f64.powi(2) / 2.0 + 4.5f64.powi(2) / 2.0) - 15.0;
        assert!((h - expected).abs() < 1e-12);
    }

    #[test]
    fn test_kruskal_wallis_all_tied_is_zero() {
        let a = [2.0, 2.0];
        let b = [2.0, 2.0, 2.0];
        let h = kruskal_wallis_h(&[&a[..], &b[..]]).unwrap();
        assert!(h.abs() < 1e-12);

        let options = PermutationOptions::new(200).seed(1);
        let result = kruskal_wallis_test(&[&a[..], &b[..]], &options).unwrap();
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_kruskal_wallis_requires_two_nonempty_groups() {
        let a = [1.0, 2.0];
        let empty: [f64; 0] = [];
        assert!(matches!(
            kruskal_wallis_h(&[&a]),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            kruskal_wallis_h(&[&a[..], &empty[..]]),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_ks_statistic_bounds() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![10.0, 11.0, 12.0];
        assert_eq!(ks_statistic(&x, &y).unwrap(), 1.0);
        assert_eq!(ks_statistic(&x, &[3.0, 1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_ks_statistic_unequal_sizes() {
        // F_x(1) = 0.5, F_y(1) = 0 -> 0.5
        let x = vec![1.0, 2.0];
        let y = vec![1.5, 2.0, 2.0, 3.0];
        let d = ks_statistic(&x, &y).unwrap();
        assert!((d - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ks_permutation_identical_samples() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let options = PermutationOptions::new(300).seed(2);
        let result = ks_permutation_test(&x, &x, &options).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.reject_null);
    }

    #[test]
    fn test_ks_rejects_nan_and_empty() {
        assert!(matches!(
            ks_statistic(&[], &[1.0]),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            ks_statistic(&[f64::NAN], &[1.0]),
            Err(Error::InvalidValue(_))
        ));
    }
}
