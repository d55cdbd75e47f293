//! Hypothesis test results
//!
//! Every permutation-based test in this crate reports through [`TestResult`]:
//! the observed statistic, its empirical p-value and the component values
//! (rank sums, group sizes, ...) that produced it.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Statistical hypothesis test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test statistic value
    pub statistic: f64,
    /// Empirical p-value of the test, a multiple of `1 / n_permutations`
    pub p_value: f64,
    /// Test description
    pub test_name: String,
    /// Alternative hypothesis used when counting extreme permutations
    pub alternative: AlternativeHypothesis,
    /// Number of random relabelings drawn
    pub n_permutations: usize,
    /// Degrees of freedom (if applicable)
    pub degrees_of_freedom: Option<f64>,
    /// Whether to reject the null hypothesis at the configured alpha
    pub reject_null: bool,
    /// Additional test-specific information
    pub additional_info: HashMap<String, f64>,
}

/// Alternative hypothesis specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlternativeHypothesis {
    /// Two-sided test, compares magnitudes (|T| ≥ |t|)
    TwoSided,
    /// Greater than test (T ≥ t)
    Greater,
    /// Less than test (T ≤ t)
    Less,
}

impl TestResult {
    /// Look up a named component value
    pub fn info(&self, key: &str) -> Option<f64> {
        self.additional_info.get(key).copied()
    }

    /// Serialize the result for reports
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
