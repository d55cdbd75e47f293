//! Spearman rank correlation with a permutation significance test

use crate::core::error::{Error, Result};
use crate::stats::hypothesis::{AlternativeHypothesis, TestResult};
use crate::stats::permutation::{permutation_result, shuffled_statistics, PermutationOptions};
use crate::stats::ranking::rank_data;
use std::collections::HashMap;

/// Spearman's ρ of two equal-length samples.
///
/// `ρ = 1 - 6·Σd² / (n(n²-1))` where `d` are the differences between
/// tie-averaged ranks. Requires `n ≥ 2`.
pub fn spearman_correlation(a: &[f64], b: &[f64]) -> Result<f64> {
    let (rank_a, rank_b) = paired_ranks(a, b)?;
    Ok(rho_from_ranks(&rank_a, &rank_b))
}

/// Spearman correlation with a two-sided permutation p-value.
///
/// `b` is shuffled against the fixed `a`; the p-value is the fraction of
/// shuffles with `|ρ| ≥ |ρ_observed|`.
pub fn spearman_permutation_test(
    a: &[f64],
    b: &[f64],
    options: &PermutationOptions,
) -> Result<TestResult> {
    let (rank_a, rank_b) = paired_ranks(a, b)?;
    let observed = rho_from_ranks(&rank_a, &rank_b);

    // Ranking commutes with shuffling, so the ranks of b are shuffled directly
    let null_rhos = shuffled_statistics(&rank_b, options, |shuffled| {
        rho_from_ranks(&rank_a, shuffled)
    })?;

    let mut additional_info = HashMap::new();
    additional_info.insert("n".to_string(), a.len() as f64);
    additional_info.insert(
        "sum_squared_rank_diff".to_string(),
        squared_rank_diff(&rank_a, &rank_b),
    );

    Ok(permutation_result(
        "Spearman rank correlation",
        observed,
        &null_rhos,
        AlternativeHypothesis::TwoSided,
        options,
        additional_info,
    ))
}

fn paired_ranks(a: &[f64], b: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    if a.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Spearman correlation needs at least 2 pairs, got {}",
            a.len()
        )));
    }

    Ok((rank_data(a)?, rank_data(b)?))
}

fn squared_rank_diff(rank_a: &[f64], rank_b: &[f64]) -> f64 {
    rank_a
        .iter()
        .zip(rank_b)
        .map(|(ra, rb)| (ra - rb).powi(2))
        .sum()
}

fn rho_from_ranks(rank_a: &[f64], rank_b: &[f64]) -> f64 {
    let n = rank_a.len() as f64;
    let rho = 1.0 - 6.0 * squared_rank_diff(rank_a, rank_b) / (n * (n * n - 1.0));
    rho.clamp(-1.0, 1.0)
}
