//! Mann-Whitney U test on two batches of labelled records
//!
//! Outcomes of both batches are ranked together, so ties across batches share
//! one averaged rank, and the normal approximation gives the Z score.

use crate::core::error::{Error, Result};
use crate::stats::descriptive::median;
use crate::stats::ranking::pooled_ranks;
use crate::stats::MannWhitneyResult;
use serde::{Deserialize, Serialize};

/// One observation: an identifying label, the covariate used to form
/// batches, and the outcome that is ranked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub label: String,
    pub covariate: f64,
    pub outcome: f64,
}

impl BatchRecord {
    pub fn new(label: impl Into<String>, covariate: f64, outcome: f64) -> Self {
        BatchRecord {
            label: label.into(),
            covariate,
            outcome,
        }
    }
}

/// Mann-Whitney U test between two batches.
///
/// With `R1`, `R2` the pooled rank sums,
/// `U1 = n1·n2 + n1(n1+1)/2 − R1` and `U2 = n1·n2 + n2(n2+1)/2 − R2`, so
/// `U1 + U2 = n1·n2`. The Z score uses `min(U1, U2)` against the mean
/// `n1·n2/2` and standard deviation `sqrt(n1·n2(n1+n2+1)/12)`, and the null
/// is rejected when `|Z| > critical_z`.
///
/// A record belongs to the batch of the slice it is passed in;
/// `BatchRecord::label` is carried for reporting and never read here.
pub fn mann_whitney_u(
    first: &[BatchRecord],
    second: &[BatchRecord],
    critical_z: f64,
) -> Result<MannWhitneyResult> {
    if !critical_z.is_finite() || critical_z <= 0.0 {
        return Err(Error::InvalidValue(format!(
            "Critical z must be positive and finite, got {}",
            critical_z
        )));
    }

    let n1 = first.len() as f64;
    let n2 = second.len() as f64;

    let std_u = (n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    if std_u == 0.0 {
        return Err(Error::Domain(format!(
            "Standard deviation of U is zero (batch sizes {} and {})",
            first.len(),
            second.len()
        )));
    }

    let first_outcomes: Vec<f64> = first.iter().map(|r| r.outcome).collect();
    let second_outcomes: Vec<f64> = second.iter().map(|r| r.outcome).collect();
    let mut ranks = pooled_ranks(&[&first_outcomes, &second_outcomes])?.into_iter();
    let first_ranks = ranks.next().unwrap_or_default();
    let second_ranks = ranks.next().unwrap_or_default();

    let r1: f64 = first_ranks.iter().sum();
    let r2: f64 = second_ranks.iter().sum();

    let u1 = n1 * n2 + n1 * (n1 + 1.0) / 2.0 - r1;
    let u2 = n1 * n2 + n2 * (n2 + 1.0) / 2.0 - r2;

    let mean_u = n1 * n2 / 2.0;
    let z_score = (u1.min(u2) - mean_u) / std_u;

    log::debug!(
        "Mann-Whitney: n1={}, n2={}, U1={}, U2={}, Z={:.4}",
        first.len(),
        second.len(),
        u1,
        u2,
        z_score
    );

    Ok(MannWhitneyResult {
        first_ranks,
        second_ranks,
        rank_sum_first: r1,
        rank_sum_second: r2,
        n1: first.len(),
        n2: second.len(),
        u1,
        u2,
        z_score,
        critical_z,
        reject_null: z_score.abs() > critical_z,
    })
}

/// Split `(covariate, outcome)` pairs into two batches at the covariate
/// median.
///
/// Pairs with a covariate strictly above the median form the first batch,
/// labelled `above_label`; all others form the second, labelled
/// `below_label`.
pub fn split_at_covariate_median(
    observations: &[(f64, f64)],
    above_label: &str,
    below_label: &str,
) -> Result<(Vec<BatchRecord>, Vec<BatchRecord>)> {
    let covariates: Vec<f64> = observations.iter().map(|&(c, _)| c).collect();
    let cutoff = median(&covariates)?;

    let (above, below): (Vec<_>, Vec<_>) = observations
        .iter()
        .partition(|&&(covariate, _)| covariate > cutoff);

    let to_batch = |pairs: Vec<&(f64, f64)>, label: &str| -> Vec<BatchRecord> {
        pairs
            .into_iter()
            .map(|&(covariate, outcome)| BatchRecord::new(label, covariate, outcome))
            .collect()
    };

    Ok((to_batch(above, above_label), to_batch(below, below_label)))
}
