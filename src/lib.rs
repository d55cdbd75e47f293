//! # rankstats
//!
//! Distribution-free statistics for small observational datasets: rank
//! assignment, Spearman correlation, Kruskal-Wallis, chi-square on
//! multi-valued categorical records, two-sample Kolmogorov-Smirnov and
//! Mann-Whitney U, with permutation p-values and bootstrap confidence
//! intervals.
//!
//! ```
//! use rankstats::stats::{kruskal_wallis_test, PermutationOptions};
//!
//! let a = [1.0, 2.0, 3.0];
//! let b = [4.0, 5.0, 6.0];
//! let c = [7.0, 8.0, 9.0];
//! let options = PermutationOptions::new(2_000).seed(42);
//! let result = kruskal_wallis_test(&[&a, &b, &c], &options).unwrap();
//! assert!((result.statistic - 7.2).abs() < 1e-9);
//! ```

// Core module with the crate error type
pub mod core;

pub mod config;
pub mod error;
pub mod ml;
pub mod stats;

// Internal utilities and compatibility layers
#[doc(hidden)]
pub mod utils;

// Re-export core types
pub use core::error::{Error, Result};

pub use config::StatsConfig;
pub use ml::{KMeans, UnsupervisedModel};
pub use stats::{
    AlternativeHypothesis, BootstrapInterval, BootstrapOptions, MannWhitneyResult,
    PermutationOptions, TestResult,
};

// Export version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
