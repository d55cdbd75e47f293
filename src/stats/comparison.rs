//! Pairwise distribution comparison across named groups
//!
//! Every group gets a bootstrap confidence interval of its mean. Only pairs
//! whose intervals overlap are tested with the KS permutation test; pairs
//! with disjoint intervals already differ and are left untested.

use crate::core::error::{Error, Result};
use crate::stats::nonparametric::ks_permutation_test;
use crate::stats::permutation::PermutationOptions;
use crate::stats::sampling::{bootstrap_mean_ci, BootstrapInterval, BootstrapOptions};
use crate::utils::rand_compat::stream_seed;
use serde::{Deserialize, Serialize};

/// Result of [`pairwise_ks_comparison`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub labels: Vec<String>,
    /// Bootstrap mean interval per group, in label order
    pub intervals: Vec<BootstrapInterval>,
    /// Symmetric matrix of KS p-values; `None` on the diagonal and for pairs
    /// whose intervals do not overlap
    pub p_values: Vec<Vec<Option<f64>>>,
}

impl PairwiseComparison {
    /// p-value of the pair `(a, b)` looked up by label
    pub fn p_value(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.p_values[i][j]
    }

    /// Tested pairs with `p < alpha`, each reported once as `(i < j)`
    pub fn significant_pairs(&self, alpha: f64) -> Vec<(String, String, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.labels.len() {
            for j in (i + 1)..self.labels.len() {
                if let Some(p) = self.p_values[i][j] {
                    if p < alpha {
                        pairs.push((self.labels[i].clone(), self.labels[j].clone(), p));
                    }
                }
            }
        }
        pairs
    }
}

/// Compare every pair of groups with the two-sample KS permutation test,
/// skipping pairs whose bootstrap mean intervals do not overlap.
///
/// The base seed is `permutation.seed`, or `bootstrap.seed` when the former
/// is unset. With a base seed, group `i` bootstraps with stream `i` of it and
/// the `p`-th tested pair uses stream `k + p`, so every group draws its own
/// resamples and the whole matrix is reproducible.
///
/// A dedicated pool requested through `worker_threads` is built once and
/// shared by all bootstraps and tests of the comparison.
pub fn pairwise_ks_comparison(
    groups: &[(&str, &[f64])],
    permutation: &PermutationOptions,
    bootstrap: &BootstrapOptions,
) -> Result<PairwiseComparison> {
    let k = groups.len();
    if k < 2 {
        return Err(Error::InsufficientData(format!(
            "Pairwise comparison needs at least two groups, got {}",
            k
        )));
    }

    let threads = permutation.worker_threads.max(bootstrap.worker_threads);
    if threads == 0 || !(permutation.parallel || bootstrap.parallel) {
        return compare_groups(groups, permutation, bootstrap);
    }

    // Inside `install` the engine's parallel iterators run on this pool
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let permutation = PermutationOptions {
        worker_threads: 0,
        ..permutation.clone()
    };
    let bootstrap = BootstrapOptions {
        worker_threads: 0,
        ..bootstrap.clone()
    };
    pool.install(|| compare_groups(groups, &permutation, &bootstrap))
}

fn compare_groups(
    groups: &[(&str, &[f64])],
    permutation: &PermutationOptions,
    bootstrap: &BootstrapOptions,
) -> Result<PairwiseComparison> {
    let k = groups.len();
    let base = permutation.seed.or(bootstrap.seed);

    let intervals = groups
        .iter()
        .enumerate()
        .map(|(i, (label, sample))| {
            let mut options = bootstrap.clone();
            options.seed = base.map(|seed| stream_seed(seed, i as u64));
            bootstrap_mean_ci(sample, &options).map_err(|e| match e {
                Error::EmptyData(msg) | Error::InsufficientData(msg) => {
                    Error::InsufficientData(format!("Group '{}': {}", label, msg))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut p_values = vec![vec![None; k]; k];
    let mut tested = 0u64;

    for i in 0..k {
        for j in (i + 1)..k {
            if !intervals[i].overlaps(&intervals[j]) {
                log::debug!(
                    "Skipping {} vs {}: confidence intervals are disjoint",
                    groups[i].0,
                    groups[j].0
                );
                continue;
            }

            let mut options = permutation.clone();
            options.seed = base.map(|seed| stream_seed(seed, k as u64 + tested));
            tested += 1;

            let result = ks_permutation_test(groups[i].1, groups[j].1, &options)?;
            p_values[i][j] = Some(result.p_value);
            p_values[j][i] = Some(result.p_value);
        }
    }

    Ok(PairwiseComparison {
        labels: groups.iter().map(|(l, _)| l.to_string()).collect(),
        intervals,
        p_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_groups_are_not_tested() {
        let low: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let high: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.1).collect();
        let mid: Vec<f64> = (0..20).map(|i| 0.2 + i as f64 * 0.1).collect();

        let groups = [("low", low.as_slice()), ("high", high.as_slice()), ("mid", mid.as_slice())];
        let comparison = pairwise_ks_comparison(
            &groups,
            &PermutationOptions::new(500).seed(4),
            &BootstrapOptions::new(1_000),
        )
        .unwrap();

        assert_eq!(comparison.p_value("low", "high"), None);
        assert_eq!(comparison.p_value("high", "mid"), None);
        assert!(comparison.p_value("low", "mid").is_some());
        assert_eq!(
            comparison.p_value("low", "mid"),
            comparison.p_value("mid", "low")
        );
        assert_eq!(comparison.p_values[1][1], None);
        assert_eq!(comparison.intervals.len(), 3);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let groups = [("a", a.as_slice()), ("b", b.as_slice())];
        let perm = PermutationOptions::new(400).seed(17);
        let boot = BootstrapOptions::new(500);

        let first = pairwise_ks_comparison(&groups, &perm, &boot).unwrap();
        let second = pairwise_ks_comparison(&groups, &perm, &boot).unwrap();
        assert_eq!(first, second);
        assert!(first.p_value("a", "b").is_some());
        assert!(first.significant_pairs(0.0).is_empty());
    }

    #[test]
    fn test_bootstrap_seed_gives_each_group_its_own_stream() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [11.0, 12.0, 13.0, 14.0, 15.0];
        let groups = [("a", &a[..]), ("b", &b[..])];
        let perm = PermutationOptions::new(100);
        let boot = BootstrapOptions::new(200).seed(5);

        let comparison = pairwise_ks_comparison(&groups, &perm, &boot).unwrap();
        let (ia, ib) = (&comparison.intervals[0], &comparison.intervals[1]);
        // identical index streams would shift every bound by exactly 10
        assert!((ib.estimate - ia.estimate - 10.0).abs() > 1e-9);

        let again = pairwise_ks_comparison(&groups, &perm, &boot).unwrap();
        assert_eq!(comparison.intervals, again.intervals);
    }

    #[test]
    fn test_dedicated_pool_matches_serial() {
        let a: Vec<f64> = (0..25).map(|i| (i as f64 * 0.7).sin()).collect();
        let b: Vec<f64> = (0..25).map(|i| (i as f64 * 0.3).cos() * 0.8).collect();
        let c: Vec<f64> = (0..25).map(|i| (i as f64 * 0.5).sin() + 0.1).collect();
        let groups = [("a", a.as_slice()), ("b", b.as_slice()), ("c", c.as_slice())];

        let serial = pairwise_ks_comparison(
            &groups,
            &PermutationOptions::new(1_200).seed(9).parallel(false),
            &BootstrapOptions::new(1_200).parallel(false),
        )
        .unwrap();
        let pooled = pairwise_ks_comparison(
            &groups,
            &PermutationOptions::new(1_200).seed(9).worker_threads(3),
            &BootstrapOptions::new(1_200).worker_threads(3),
        )
        .unwrap();
        assert_eq!(serial, pooled);
    }

    #[test]
    fn test_requires_two_groups() {
        let a = [1.0, 2.0];
        let result = pairwise_ks_comparison(
            &[("a", &a[..])],
            &PermutationOptions::new(10),
            &BootstrapOptions::new(10),
        );
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }
}
