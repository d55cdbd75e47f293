//! Statistics module for categorical data
//!
//! Contingency tables built from multi-valued categorical records, the
//! Pearson chi-square statistic, and a permutation test of independence.

use std::collections::{BTreeSet, HashMap};

use rand::seq::SliceRandom;

use crate::core::error::{Error, Result};
use crate::stats::hypothesis::{AlternativeHypothesis, TestResult};
use crate::stats::permutation::{permutation_result, resample, PermutationOptions};

/// Expected cell count below which the chi-square approximation is unreliable
const MIN_EXPECTED_COUNT: f64 = 5.0;

/// One observation of a multi-valued categorical field.
///
/// `group` selects the table row; every entry of `categories` increments one
/// column of that row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalRecord {
    pub group: String,
    pub categories: Vec<String>,
}

impl CategoricalRecord {
    pub fn new<G, I, S>(group: G, categories: I) -> Self
    where
        G: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CategoricalRecord {
            group: group.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a raw multi-valued field such as `"Facebook, Instagram"`.
    ///
    /// Entries are trimmed and blank entries dropped, so an empty field gives
    /// a record with no categories.
    pub fn parse(group: &str, field: &str, separator: &str) -> Self {
        let categories = field
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        CategoricalRecord {
            group: group.to_string(),
            categories,
        }
    }
}

/// ContingencyTable represents a cross-tabulation of categorical data
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    /// The observed frequencies in the table
    pub observed: Vec<Vec<u64>>,
    /// Row labels
    pub row_labels: Vec<String>,
    /// Column labels
    pub col_labels: Vec<String>,
    /// Row totals
    pub row_totals: Vec<u64>,
    /// Column totals
    pub col_totals: Vec<u64>,
    /// Grand total
    pub total: u64,
}

impl ContingencyTable {
    /// Create a new contingency table from observed frequencies
    pub fn new(
        observed: Vec<Vec<u64>>,
        row_labels: Option<Vec<String>>,
        col_labels: Option<Vec<String>>,
    ) -> Result<Self> {
        if observed.is_empty() || observed[0].is_empty() {
            return Err(Error::EmptyData(
                "Observed frequencies cannot be empty".into(),
            ));
        }

        let rows = observed.len();
        let cols = observed[0].len();

        if let Some(row) = observed.iter().find(|row| row.len() != cols) {
            return Err(Error::DimensionMismatch(format!(
                "All rows must have {} columns, found a row with {}",
                cols,
                row.len()
            )));
        }

        let row_labels = resolve_labels(row_labels, rows, "row", "Row")?;
        let col_labels = resolve_labels(col_labels, cols, "column", "Col")?;

        let (row_totals, col_totals, total) = marginal_totals(&observed);

        Ok(ContingencyTable {
            observed,
            row_labels,
            col_labels,
            row_totals,
            col_totals,
            total,
        })
    }

    /// Cross-tabulate records by group and category.
    ///
    /// Rows are the sorted distinct groups and columns the sorted distinct
    /// categories across all records.
    pub fn from_records(records: &[CategoricalRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyData("No records to tabulate".into()));
        }

        let layout = TableLayout::from_records(records)?;
        let observed = layout.count(records.len(), |i| i);

        ContingencyTable::new(
            observed,
            Some(layout.row_labels),
            Some(layout.col_labels),
        )
    }

    pub fn n_rows(&self) -> usize {
        self.observed.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    /// Calculate expected frequencies under independence assumption
    pub fn expected_frequencies(&self) -> Vec<Vec<f64>> {
        let total = self.total as f64;
        self.row_totals
            .iter()
            .map(|&r| {
                self.col_totals
                    .iter()
                    .map(|&c| r as f64 * c as f64 / total)
                    .collect()
            })
            .collect()
    }

    /// `(rows − 1)(cols − 1)`
    pub fn degrees_of_freedom(&self) -> usize {
        (self.n_rows().saturating_sub(1)) * (self.n_cols().saturating_sub(1))
    }

    /// Pearson chi-square statistic of this table
    pub fn chi_square(&self) -> Result<f64> {
        chi_square_statistic(self)
    }

    /// Calculate Cramer's V - a measure of association between categorical variables
    pub fn cramers_v(&self) -> Result<f64> {
        let min_dim = (self.n_rows() - 1).min(self.n_cols() - 1);
        if min_dim == 0 {
            return Err(Error::Domain(
                "Cannot calculate Cramer's V with only one row or column".into(),
            ));
        }

        let chi2 = chi_square_statistic(self)?;
        Ok((chi2 / (self.total as f64 * min_dim as f64)).sqrt())
    }
}

fn resolve_labels(
    labels: Option<Vec<String>>,
    expected: usize,
    axis: &str,
    prefix: &str,
) -> Result<Vec<String>> {
    match labels {
        Some(labels) if labels.len() != expected => Err(Error::DimensionMismatch(format!(
            "Number of {} labels ({}) does not match table size ({})",
            axis,
            labels.len(),
            expected
        ))),
        Some(labels) => Ok(labels),
        None => Ok((0..expected).map(|i| format!("{}_{}", prefix, i)).collect()),
    }
}

fn marginal_totals(observed: &[Vec<u64>]) -> (Vec<u64>, Vec<u64>, u64) {
    let cols = observed.first().map_or(0, Vec::len);
    let row_totals: Vec<u64> = observed.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<u64> = (0..cols)
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();
    let total = row_totals.iter().sum();
    (row_totals, col_totals, total)
}

/// Pearson χ², or `None` when some expected count is zero
fn pearson_chi_square(observed: &[Vec<u64>]) -> Option<f64> {
    let (row_totals, col_totals, total) = marginal_totals(observed);
    if total == 0 || row_totals.contains(&0) || col_totals.contains(&0) {
        return None;
    }

    let total = total as f64;
    let mut chi2 = 0.0;
    for (row, &r) in observed.iter().zip(&row_totals) {
        for (&o, &c) in row.iter().zip(&col_totals) {
            let e = r as f64 * c as f64 / total;
            chi2 += (o as f64 - e).powi(2) / e;
        }
    }
    Some(chi2)
}

/// Pearson chi-square statistic `Σ (O − E)² / E`.
///
/// Fails with [`Error::Domain`] when any expected count is zero, i.e. when a
/// row or column of the table is empty.
pub fn chi_square_statistic(table: &ContingencyTable) -> Result<f64> {
    let chi2 = pearson_chi_square(&table.observed).ok_or_else(|| {
        Error::Domain(
            "Contingency table has an empty row or column; expected counts would be zero".into(),
        )
    })?;

    let min_expected = table
        .expected_frequencies()
        .iter()
        .flatten()
        .fold(f64::INFINITY, |acc, &e| acc.min(e));
    if min_expected < MIN_EXPECTED_COUNT {
        log::warn!(
            "Smallest expected count is {:.2} (< {}); chi-square may be unreliable",
            min_expected,
            MIN_EXPECTED_COUNT
        );
    }

    Ok(chi2)
}

/// Row and column indices of every record, resolved once
struct TableLayout {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    row_of: Vec<usize>,
    cols_of: Vec<Vec<usize>>,
}

impl TableLayout {
    fn from_records(records: &[CategoricalRecord]) -> Result<Self> {
        let row_labels: Vec<String> = records
            .iter()
            .map(|r| r.group.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let col_labels: Vec<String> = records
            .iter()
            .flat_map(|r| r.categories.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if col_labels.is_empty() {
            return Err(Error::EmptyData(
                "Records contain no categories".into(),
            ));
        }

        let row_index: HashMap<&str, usize> = row_labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        let col_index: HashMap<&str, usize> = col_labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        let row_of = records
            .iter()
            .map(|r| row_index[r.group.as_str()])
            .collect();
        let cols_of = records
            .iter()
            .map(|r| {
                r.categories
                    .iter()
                    .map(|c| col_index[c.as_str()])
                    .collect()
            })
            .collect();

        Ok(TableLayout {
            row_labels,
            col_labels,
            row_of,
            cols_of,
        })
    }

    /// Count the table where record `i` keeps its group and takes the
    /// categories of record `source(i)`
    fn count<F>(&self, n_records: usize, source: F) -> Vec<Vec<u64>>
    where
        F: Fn(usize) -> usize,
    {
        let mut counts = vec![vec![0u64; self.col_labels.len()]; self.row_labels.len()];
        for record in 0..n_records {
            let row = self.row_of[record];
            for &col in &self.cols_of[source(record)] {
                counts[row][col] += 1;
            }
        }
        counts
    }
}

/// Chi-square test of independence between group and category with a
/// permutation p-value.
///
/// Each permutation shuffles the category lists across records while every
/// record keeps its group, rebuilds the table on the observed row and column
/// labels and recomputes χ². Permuted tables with an empty row have no
/// defined statistic and never count as extreme.
pub fn chi_square_permutation_test(
    records: &[CategoricalRecord],
    options: &PermutationOptions,
) -> Result<TestResult> {
    if records.is_empty() {
        return Err(Error::EmptyData("No records to tabulate".into()));
    }

    let layout = TableLayout::from_records(records)?;
    let n_records = records.len();

    let table = ContingencyTable::new(
        layout.count(n_records, |i| i),
        Some(layout.row_labels.clone()),
        Some(layout.col_labels.clone()),
    )?;
    let observed = chi_square_statistic(&table)?;

    let null_chi2 = resample(
        options.n_permutations,
        options.seed,
        options.parallel,
        options.worker_threads,
        |rng| {
            let mut order: Vec<usize> = (0..n_records).collect();
            order.shuffle(rng);
            let counts = layout.count(n_records, |i| order[i]);
            pearson_chi_square(&counts).unwrap_or(f64::NAN)
        },
    )?;

    let degenerate = null_chi2.iter().filter(|v| v.is_nan()).count();
    if degenerate > 0 {
        log::warn!(
            "{} of {} permuted tables had an empty row and were not counted as extreme",
            degenerate,
            null_chi2.len()
        );
    }

    let mut additional_info = HashMap::new();
    additional_info.insert("n_records".to_string(), n_records as f64);
    additional_info.insert("n_rows".to_string(), table.n_rows() as f64);
    additional_info.insert("n_cols".to_string(), table.n_cols() as f64);
    additional_info.insert("total_count".to_string(), table.total as f64);
    additional_info.insert("degenerate_permutations".to_string(), degenerate as f64);

    let mut result = permutation_result(
        "Chi-square permutation test",
        observed,
        &null_chi2,
        AlternativeHypothesis::Greater,
        options,
        additional_info,
    );
    result.degrees_of_freedom = Some(table.degrees_of_freedom() as f64);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_table_has_zero_chi_square() {
        let table = ContingencyTable::new(vec![vec![10, 10], vec![10, 10]], None, None).unwrap();
        assert_eq!(table.chi_square().unwrap(), 0.0);
        assert_eq!(table.degrees_of_freedom(), 1);
        assert_eq!(table.row_labels, vec!["Row_0", "Row_1"]);
    }

    #[test]
    fn test_chi_square_value() {
        // E = [[12, 18], [28, 42]]
        let table = ContingencyTable::new(vec![vec![10, 20], vec![30, 40]], None, None).unwrap();
        let expected = 4.0 / 12.0 + 4.0 / 18.0 + 4.0 / 28.0 + 4.0 / 42.0;
        assert!((table.chi_square().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_expected_cell_is_domain_error() {
        let table = ContingencyTable::new(vec![vec![0, 0], vec![3, 4]], None, None).unwrap();
        assert!(matches!(table.chi_square(), Err(Error::Domain(_))));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let result = ContingencyTable::new(vec![vec![1, 2], vec![3]], None, None);
        assert!(matches!(result, Err(Error::DimensionMismatch(_))));
    }

    #[test]
    fn test_parse_multi_valued_field() {
        let record = CategoricalRecord::parse("18-24", "Facebook, Instagram,  , TikTok", ",");
        assert_eq!(record.categories, vec!["Facebook", "Instagram", "TikTok"]);

        let empty = CategoricalRecord::parse("25-34", "", ", ");
        assert!(empty.categories.is_empty());
    }

    #[test]
    fn test_from_records_counts_every_category() {
        let records = vec![
            CategoricalRecord::new("young", ["Facebook", "Instagram"]),
            CategoricalRecord::new("old", ["Facebook"]),
            CategoricalRecord::new("young", ["Instagram"]),
        ];
        let table = ContingencyTable::from_records(&records).unwrap();

        assert_eq!(table.row_labels, vec!["old", "young"]);
        assert_eq!(table.col_labels, vec!["Facebook", "Instagram"]);
        assert_eq!(table.observed, vec![vec![1, 0], vec![1, 2]]);
        assert_eq!(table.total, 4);
    }

    #[test]
    fn test_permutation_detects_association() {
        let mut records = Vec::new();
        for _ in 0..10 {
            records.push(CategoricalRecord::new("a", ["x"]));
            records.push(CategoricalRecord::new("b", ["y"]));
        }

        let options = PermutationOptions::new(1_000).seed(9);
        let result = chi_square_permutation_test(&records, &options).unwrap();

        assert!((result.statistic - 20.0).abs() < 1e-9);
        assert!(result.p_value < 0.05);
        assert_eq!(result.degrees_of_freedom, Some(1.0));
    }

    #[test]
    fn test_cramers_v_perfect_association() {
        let table = ContingencyTable::new(vec![vec![5, 0], vec![0, 5]], None, None).unwrap();
        assert!((table.cramers_v().unwrap() - 1.0).abs() < 1e-12);
    }
}
