//! Rank-based statistics and resampling tests
//!
//! Every test here is distribution-free: rank statistics (Spearman,
//! Kruskal-Wallis, Mann-Whitney U), the chi-square statistic of a
//! contingency table and the two-sample Kolmogorov-Smirnov distance. Their
//! significance comes from permutation, and confidence intervals from the
//! bootstrap, both driven by the block-seeded engine in [`permutation`].

// Feature modules
pub mod categorical;
pub mod comparison;
pub mod correlation;
pub mod descriptive;
pub mod hypothesis;
pub mod mann_whitney;
pub mod nonparametric;
pub mod permutation;
pub mod ranking;
pub mod regression;
pub mod sampling;

use serde::{Deserialize, Serialize};

// Re-export public types and functions
pub use categorical::{
    chi_square_permutation_test, chi_square_statistic, CategoricalRecord, ContingencyTable,
};
pub use comparison::{pairwise_ks_comparison, PairwiseComparison};
pub use correlation::{spearman_correlation, spearman_permutation_test};
pub use descriptive::{mean, median, percentile};
pub use hypothesis::{AlternativeHypothesis, TestResult};
pub use mann_whitney::{mann_whitney_u, split_at_covariate_median, BatchRecord};
pub use nonparametric::{kruskal_wallis_h, kruskal_wallis_test, ks_permutation_test, ks_statistic};
pub use permutation::{empirical_p_value, permutation_test, PermutationOptions};
pub use ranking::{expected_rank_sum, pooled_ranks, rank_data};
pub use regression::{simple_linear_regression, SimpleRegression};
pub use sampling::{
    bootstrap_confidence_interval, bootstrap_mean_ci, BootstrapInterval, BootstrapOptions,
};

/// Mann-Whitney U test (non-parametric test) results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyResult {
    /// Pooled ranks of the first batch, in record order
    pub first_ranks: Vec<f64>,
    /// Pooled ranks of the second batch, in record order
    pub second_ranks: Vec<f64>,
    /// Rank sum R1
    pub rank_sum_first: f64,
    /// Rank sum R2
    pub rank_sum_second: f64,
    pub n1: usize,
    pub n2: usize,
    /// `n1·n2 + n1(n1+1)/2 − R1`
    pub u1: f64,
    /// `n1·n2 + n2(n2+1)/2 − R2`
    pub u2: f64,
    /// Normal approximation of `min(U1, U2)`
    pub z_score: f64,
    /// Threshold on `|z_score|`
    pub critical_z: f64,
    /// Whether `|z_score| > critical_z`
    pub reject_null: bool,
}

impl MannWhitneyResult {
    /// The smaller of the two U values
    pub fn u_statistic(&self) -> f64 {
        self.u1.min(self.u2)
    }
}
