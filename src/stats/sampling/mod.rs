//! Bootstrap resampling and percentile confidence intervals

use crate::config::StatsConfig;
use crate::error::{Error, Result};
use crate::stats::descriptive::percentile;
use crate::stats::permutation::resample;
use crate::stats::ranking::check_finite_order;
use crate::utils::rand_compat::GenRangeCompat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Options for bootstrap confidence intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapOptions {
    /// Number of resamples drawn with replacement
    pub n_resamples: usize,
    /// Two-sided coverage of the interval, in (0, 1)
    pub confidence_level: f64,
    /// Base seed (None = fresh seed per call)
    pub seed: Option<u64>,
    /// Run resampling blocks on rayon
    pub parallel: bool,
    /// Dedicated pool size (0 = rayon global pool)
    pub worker_threads: usize,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            n_resamples: 10_000,
            confidence_level: 0.95,
            seed: None,
            parallel: true,
            worker_threads: 0,
        }
    }
}

impl BootstrapOptions {
    pub fn new(n_resamples: usize) -> Self {
        Self {
            n_resamples,
            ..Self::default()
        }
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }
}

impl From<&StatsConfig> for BootstrapOptions {
    fn from(config: &StatsConfig) -> Self {
        Self {
            n_resamples: config.bootstrap.n_resamples,
            confidence_level: config.bootstrap.confidence_level,
            seed: config.permutation.seed,
            parallel: config.performance.threading.parallel_enabled,
            worker_threads: config.performance.threading.worker_threads,
        }
    }
}

/// Percentile bootstrap interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapInterval {
    /// Mean of the resampled statistics
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub n_resamples: usize,
}

impl BootstrapInterval {
    /// Length of the intersection with `other`; zero or negative when the
    /// intervals are disjoint or only touch
    pub fn overlap_width(&self, other: &BootstrapInterval) -> f64 {
        self.upper.min(other.upper) - self.lower.max(other.lower)
    }

    pub fn overlaps(&self, other: &BootstrapInterval) -> bool {
        self.overlap_width(other) > 0.0
    }

    /// Whether `value` lies within the closed interval
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Percentile bootstrap confidence interval of `statistic`.
///
/// Draws `n_resamples` resamples of the same size as `sample` with
/// replacement and evaluates `statistic` on each. The bounds are the
/// `(1 − level)/2` and `(1 + level)/2` percentiles of the resampled values,
/// interpolated linearly between order statistics.
pub fn bootstrap_confidence_interval<F>(
    sample: &[f64],
    statistic: F,
    options: &BootstrapOptions,
) -> Result<BootstrapInterval>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    if sample.is_empty() {
        return Err(Error::EmptyData("Bootstrap requires data".into()));
    }
    check_finite_order(sample)?;

    let level = options.confidence_level;
    if !(level > 0.0 && level < 1.0) {
        return Err(Error::InvalidValue(format!(
            "Confidence level must be in (0, 1), got {}",
            level
        )));
    }

    let tail = (1.0 - level) / 2.0;
    if (options.n_resamples as f64) * tail < 1.0 {
        log::warn!(
            "{} resamples cannot resolve the {:.2}% tails of a {}% interval",
            options.n_resamples,
            tail * 100.0,
            level * 100.0
        );
    }

    let n = sample.len();
    let mut statistics = resample(
        options.n_resamples,
        options.seed,
        options.parallel,
        options.worker_threads,
        |rng| {
            let draw: Vec<f64> = (0..n).map(|_| sample[rng.gen_range(0..n)]).collect();
            statistic(&draw)
        },
    )?;

    if let Some(bad) = statistics.iter().find(|s| !s.is_finite()) {
        return Err(Error::Domain(format!(
            "Statistic returned {} on a bootstrap resample",
            bad
        )));
    }

    statistics.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let estimate = statistics.iter().sum::<f64>() / statistics.len() as f64;
    let lower = percentile(&statistics, tail * 100.0)?;
    let upper = percentile(&statistics, (1.0 - tail) * 100.0)?;

    Ok(BootstrapInterval {
        estimate,
        lower,
        upper,
        confidence_level: level,
        n_resamples: statistics.len(),
    })
}

/// Bootstrap confidence interval of the arithmetic mean
pub fn bootstrap_mean_ci(sample: &[f64], options: &BootstrapOptions) -> Result<BootstrapInterval> {
    bootstrap_confidence_interval(
        sample,
        |s| s.iter().sum::<f64>() / s.len() as f64,
        options,
    )
}
