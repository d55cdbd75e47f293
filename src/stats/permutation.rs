//! Resampling engine shared by permutation tests and the bootstrap
//!
//! Iterations are split into fixed blocks of [`BLOCK_SIZE`]. Block `b` draws
//! from its own generator seeded with `stream_seed(base, b)`, and results are
//! reassembled in block order. The output for a given seed is therefore the
//! same whether the blocks ran serially, on the global rayon pool, or on a
//! dedicated pool of any size.

use crate::config::StatsConfig;
use crate::core::error::{Error, Result};
use crate::stats::hypothesis::{AlternativeHypothesis, TestResult};
use crate::utils::rand_compat::{resolve_seed, stream_rng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Iterations drawn from one random stream
pub const BLOCK_SIZE: usize = 512;

/// Relative tolerance when comparing a resampled statistic with the observed
/// one. Arrangements equivalent to the observed one can differ from it in the
/// last bits because sums are accumulated in a different order.
pub const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Options for permutation tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationOptions {
    /// Number of random relabelings
    pub n_permutations: usize,
    /// Base seed (None = fresh seed per call)
    pub seed: Option<u64>,
    /// Run blocks on rayon
    pub parallel: bool,
    /// Dedicated pool size (0 = rayon global pool). The pool is built for
    /// each call, so repeated calls pay its start-up cost every time
    pub worker_threads: usize,
    /// Significance level for `TestResult::reject_null`
    pub alpha: f64,
}

impl Default for PermutationOptions {
    fn default() -> Self {
        Self {
            n_permutations: 10_000,
            seed: None,
            parallel: true,
            worker_threads: 0,
            alpha: 0.05,
        }
    }
}

impl PermutationOptions {
    /// Options with `n_permutations` relabelings and defaults elsewhere
    pub fn new(n_permutations: usize) -> Self {
        Self {
            n_permutations,
            ..Self::default()
        }
    }

    /// Set the base seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable parallel execution
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Use a dedicated pool with this many threads
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Set the significance level
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

impl From<&StatsConfig> for PermutationOptions {
    fn from(config: &StatsConfig) -> Self {
        Self {
            n_permutations: config.permutation.n_permutations,
            seed: config.permutation.seed,
            parallel: config.performance.threading.parallel_enabled,
            worker_threads: config.performance.threading.worker_threads,
            alpha: config.decision.alpha,
        }
    }
}

/// Run `draw` `n_iterations` times with block-seeded generators and collect
/// the results in iteration order.
pub fn resample<T, F>(
    n_iterations: usize,
    seed: Option<u64>,
    parallel: bool,
    worker_threads: usize,
    draw: F,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&mut StdRng) -> T + Sync,
{
    if n_iterations == 0 {
        return Err(Error::InvalidValue(
            "Number of resampling iterations must be positive".into(),
        ));
    }

    let base = resolve_seed(seed);
    let n_blocks = n_iterations.div_ceil(BLOCK_SIZE);

    log::debug!(
        "Resampling {} iterations in {} blocks (parallel={}, base seed {})",
        n_iterations,
        n_blocks,
        parallel,
        base
    );

    let run_block = |block: usize| -> Vec<T> {
        let mut rng = stream_rng(base, block as u64);
        let start = block * BLOCK_SIZE;
        let end = (start + BLOCK_SIZE).min(n_iterations);
        (start..end).map(|_| draw(&mut rng)).collect()
    };

    let blocks: Vec<Vec<T>> = if !parallel || n_blocks == 1 {
        (0..n_blocks).map(run_block).collect()
    } else if worker_threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .build()?;
        pool.install(|| (0..n_blocks).into_par_iter().map(run_block).collect())
    } else {
        (0..n_blocks).into_par_iter().map(run_block).collect()
    };

    Ok(blocks.into_iter().flatten().collect())
}

/// Run `statistic` on `n_permutations` shuffles of `values`.
///
/// Each iteration shuffles a private copy, so `statistic` sees a uniformly
/// random arrangement of the same multiset every time.
pub fn shuffled_statistics<F>(
    values: &[f64],
    options: &PermutationOptions,
    statistic: F,
) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    resample(
        options.n_permutations,
        options.seed,
        options.parallel,
        options.worker_threads,
        |rng| {
            let mut shuffled = values.to_vec();
            shuffled.shuffle(rng);
            statistic(&shuffled)
        },
    )
}

/// Fraction of null statistics at least as extreme as `observed`.
///
/// NaN entries never count as extreme; tests use them to mark relabelings for
/// which the statistic is undefined.
pub fn empirical_p_value(
    null_statistics: &[f64],
    observed: f64,
    alternative: AlternativeHypothesis,
) -> f64 {
    if null_statistics.is_empty() {
        return 1.0;
    }

    let count = null_statistics
        .iter()
        .filter(|&&stat| is_extreme(stat, observed, alternative))
        .count();

    count as f64 / null_statistics.len() as f64
}

fn is_extreme(stat: f64, observed: f64, alternative: AlternativeHypothesis) -> bool {
    match alternative {
        AlternativeHypothesis::TwoSided => {
            let target = observed.abs();
            stat.abs() >= target - RELATIVE_TOLERANCE * target.max(1.0)
        }
        AlternativeHypothesis::Greater => {
            stat >= observed - RELATIVE_TOLERANCE * observed.abs().max(1.0)
        }
        AlternativeHypothesis::Less => {
            stat <= observed + RELATIVE_TOLERANCE * observed.abs().max(1.0)
        }
    }
}

/// Assemble a [`TestResult`] from an observed statistic and its null draws
pub fn permutation_result(
    test_name: &str,
    observed: f64,
    null_statistics: &[f64],
    alternative: AlternativeHypothesis,
    options: &PermutationOptions,
    additional_info: HashMap<String, f64>,
) -> TestResult {
    let p_value = empirical_p_value(null_statistics, observed, alternative);

    TestResult {
        statistic: observed,
        p_value,
        test_name: test_name.to_string(),
        alternative,
        n_permutations: null_statistics.len(),
        degrees_of_freedom: None,
        reject_null: p_value < options.alpha,
        additional_info,
    }
}

/// Permutation test for comparing two groups with an arbitrary statistic
pub fn permutation_test<F>(
    group1: &[f64],
    group2: &[f64],
    test_statistic_fn: F,
    alternative: AlternativeHypothesis,
    options: &PermutationOptions,
) -> Result<TestResult>
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync,
{
    if group1.is_empty() || group2.is_empty() {
        return Err(Error::InsufficientData(
            "Both groups must contain data".into(),
        ));
    }

    // Calculate observed test statistic
    let observed_statistic = test_statistic_fn(group1, group2);

    // Combine all data
    let mut combined_data = Vec::with_capacity(group1.len() + group2.len());
    combined_data.extend_from_slice(group1);
    combined_data.extend_from_slice(group2);

    let n1 = group1.len();
    let permutation_stats = shuffled_statistics(&combined_data, options, |shuffled| {
        test_statistic_fn(&shuffled[..n1], &shuffled[n1..])
    })?;

    let mut additional_info = HashMap::new();
    additional_info.insert("n1".to_string(), n1 as f64);
    additional_info.insert("n2".to_string(), group2.len() as f64);

    Ok(permutation_result(
        "Permutation test",
        observed_statistic,
        &permutation_stats,
        alternative,
        options,
        additional_info,
    ))
}
