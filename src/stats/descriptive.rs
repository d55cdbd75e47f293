//! Descriptive statistics used by the tests and the bootstrap
//!
//! Means, medians and linearly interpolated percentiles of `f64` samples.

use crate::core::error::{Error, Result};
use crate::stats::ranking::check_finite_order;
use std::cmp::Ordering;

/// Ascending copy of a NaN-free sample
pub fn sorted(data: &[f64]) -> Result<Vec<f64>> {
    check_finite_order(data)?;
    let mut values = data.to_vec();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Ok(values)
}

/// Arithmetic mean
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::EmptyData("Cannot compute mean of empty data".into()));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Median of an unsorted sample; the mean of the two middle values when the
/// size is even
pub fn median(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::EmptyData(
            "Cannot compute median of empty data".into(),
        ));
    }
    let values = sorted(data)?;
    percentile(&values, 50.0)
}

/// Calculate percentile of sorted data
///
/// `p` is in `[0, 100]`. Between order statistics the value is linearly
/// interpolated at rank `p/100 · (n − 1)`.
pub fn percentile(sorted_data: &[f64], p: f64) -> Result<f64> {
    if sorted_data.is_empty() {
        return Err(Error::EmptyData(
            "Cannot compute percentile for empty data".into(),
        ));
    }

    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidValue(format!(
            "Percentile must be between 0 and 100, got {}",
            p
        )));
    }

    let n = sorted_data.len();
    let index = (p / 100.0) * (n - 1) as f64;
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        Ok(sorted_data[lower_index])
    } else {
        let weight = index - lower_index as f64;
        Ok(sorted_data[lower_index] * (1.0 - weight) + sorted_data[upper_index] * weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        assert_eq!(percentile(&data, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&data, 50.0).unwrap(), 3.0);
        assert_eq!(percentile(&data, 100.0).unwrap(), 5.0);
        assert_eq!(percentile(&data, 12.5).unwrap(), 1.5);
        assert!(percentile(&data, 101.0).is_err());
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[5.0, 1.0, 3.0]).unwrap(), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert!(matches!(median(&[]), Err(Error::EmptyData(_))));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
        assert!(mean(&[]).is_err());
    }
}
