//! Machine Learning Module
//!
//! Unsupervised grouping of observations ahead of the rank-based tests.

pub mod clustering;

use crate::error::Result;

pub use clustering::KMeans;

/// Trait for unsupervised machine learning models
pub trait UnsupervisedModel {
    /// Fit model to training data
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()>;

    /// Transform data using the fitted model
    fn transform(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Fit and transform in one step
    fn fit_transform(&mut self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit(data)?;
        self.transform(data)
    }
}
