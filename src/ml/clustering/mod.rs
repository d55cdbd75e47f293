//! Clustering algorithms
//!
//! K-means over rows of numeric features, used to group observations before
//! they are compared with the rank tests.

use crate::core::error::{Error, Result};
use crate::ml::UnsupervisedModel;
use crate::utils::rand_compat::resolve_seed;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// K-means clustering algorithm
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Number of clusters
    pub n_clusters: usize,
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Largest centroid move that still counts as converged
    pub tol: f64,
    /// Random seed for initialization
    pub random_seed: Option<u64>,
    /// Cluster assignments for each sample
    pub labels: Option<Vec<usize>>,
    /// Cluster centers
    pub centroids: Option<Vec<Vec<f64>>>,
    /// Inertia (within-cluster sum of squares)
    pub inertia: Option<f64>,
    /// Lloyd iterations run by the last fit
    pub n_iter: usize,
}

impl KMeans {
    /// Create a new K-means instance
    pub fn new(n_clusters: usize) -> Self {
        KMeans {
            n_clusters,
            max_iter: 10,
            tol: 1e-4,
            random_seed: None,
            labels: None,
            centroids: None,
            inertia: None,
            n_iter: 0,
        }
    }

    /// Set maximum number of iterations
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set tolerance for convergence
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for initialization
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Predict cluster labels for new data
    pub fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let centroids = self.fitted_centroids()?;
        let n_features = centroids[0].len();
        validate_rows(data, Some(n_features))?;

        Ok(data
            .iter()
            .map(|sample| nearest_centroid(sample, centroids).0)
            .collect())
    }

    fn fitted_centroids(&self) -> Result<&Vec<Vec<f64>>> {
        self.centroids
            .as_ref()
            .ok_or_else(|| Error::InvalidValue("KMeans not fitted".into()))
    }
}

impl UnsupervisedModel for KMeans {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        let n_features = validate_rows(data, None)?;
        let n_samples = data.len();

        if self.n_clusters == 0 || self.n_clusters > n_samples {
            return Err(Error::InvalidInput(format!(
                "Number of clusters must be in 1..={}, got {}",
                n_samples, self.n_clusters
            )));
        }

        // Initialize centroids with k distinct samples
        let mut rng = StdRng::seed_from_u64(resolve_seed(self.random_seed));
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut rng);
        let mut centroids: Vec<Vec<f64>> = indices[..self.n_clusters]
            .iter()
            .map(|&idx| data[idx].clone())
            .collect();

        let mut labels = vec![0; n_samples];
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;

            for (label, sample) in labels.iter_mut().zip(data) {
                *label = nearest_centroid(sample, &centroids).0;
            }

            let mut new_centroids = vec![vec![0.0; n_features]; self.n_clusters];
            let mut counts = vec![0usize; self.n_clusters];

            for (sample, &cluster) in data.iter().zip(&labels) {
                counts[cluster] += 1;
                for (sum, &val) in new_centroids[cluster].iter_mut().zip(sample) {
                    *sum += val;
                }
            }

            for (centroid, &count) in new_centroids.iter_mut().zip(&counts) {
                if count > 0 {
                    for val in centroid.iter_mut() {
                        *val /= count as f64;
                    }
                }
            }

            // Empty clusters restart at the point furthest from its centroid
            for i in 0..self.n_clusters {
                if counts[i] == 0 {
                    let mut max_dist = -1.0;
                    let mut max_idx = 0;
                    for (j, sample) in data.iter().enumerate() {
                        let dist = squared_distance(sample, &centroids[labels[j]]);
                        if dist > max_dist {
                            max_dist = dist;
                            max_idx = j;
                        }
                    }
                    log::debug!("Cluster {} is empty, reseeding at sample {}", i, max_idx);
                    new_centroids[i] = data[max_idx].clone();
                }
            }

            let max_shift = centroids
                .iter()
                .zip(&new_centroids)
                .map(|(old, new)| squared_distance(old, new).sqrt())
                .fold(0.0, f64::max);

            centroids = new_centroids;

            if max_shift < self.tol {
                break;
            }
        }

        // Final assignment against the returned centroids
        let mut inertia = 0.0;
        for (label, sample) in labels.iter_mut().zip(data) {
            let (cluster, dist) = nearest_centroid(sample, &centroids);
            *label = cluster;
            inertia += dist;
        }

        self.labels = Some(labels);
        self.centroids = Some(centroids);
        self.inertia = Some(inertia);
        self.n_iter = n_iter;

        Ok(())
    }

    /// Distance from every sample to every centroid
    fn transform(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let centroids = self.fitted_centroids()?;
        validate_rows(data, Some(centroids[0].len()))?;

        Ok(data
            .iter()
            .map(|sample| {
                centroids
                    .iter()
                    .map(|c| squared_distance(sample, c).sqrt())
                    .collect()
            })
            .collect())
    }
}

/// Check that rows are non-empty, equally sized and NaN-free; returns the
/// number of features
fn validate_rows(data: &[Vec<f64>], n_features: Option<usize>) -> Result<usize> {
    let first = data
        .first()
        .ok_or_else(|| Error::EmptyData("Clustering requires data".into()))?;
    let expected = n_features.unwrap_or(first.len());
    if expected == 0 {
        return Err(Error::InvalidInput("Samples have no features".into()));
    }

    for (i, row) in data.iter().enumerate() {
        if row.len() != expected {
            return Err(Error::DimensionMismatch(format!(
                "Sample {} has {} features, expected {}",
                i,
                row.len(),
                expected
            )));
        }
        if row.iter().any(|v| v.is_nan()) {
            return Err(Error::InvalidValue(format!("Sample {} contains NaN", i)));
        }
    }

    Ok(expected)
}

/// Index of the closest centroid and the squared distance to it
fn nearest_centroid(sample: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut min_dist = f64::MAX;
    let mut min_cluster = 0;

    for (j, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(sample, centroid);
        if dist < min_dist {
            min_dist = dist;
            min_cluster = j;
        }
    }

    (min_cluster, min_dist)
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.2, 0.1],
            vec![0.1, 0.3],
            vec![10.0, 10.0],
            vec![10.2, 9.9],
            vec![9.8, 10.1],
        ]
    }

    #[test]
    fn test_kmeans_separates_blobs() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).random_seed(42);
        kmeans.fit(&data).unwrap();

        let labels = kmeans.labels.clone().unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert!(kmeans.inertia.unwrap() < 1.0);
        assert!(kmeans.n_iter <= 10);

        let predicted = kmeans.predict(&[vec![9.0, 9.0], vec![1.0, 0.0]]).unwrap();
        assert_eq!(predicted[0], labels[3]);
        assert_eq!(predicted[1], labels[0]);
    }

    #[test]
    fn test_same_seed_same_clustering() {
        let data = two_blobs();
        let mut a = KMeans::new(3).random_seed(7);
        let mut b = KMeans::new(3).random_seed(7);
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_transform_shape() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).random_seed(1);
        let distances = kmeans.fit_transform(&data).unwrap();
        assert_eq!(distances.len(), 6);
        assert!(distances.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut kmeans = KMeans::new(3);
        assert!(matches!(
            kmeans.fit(&[vec![1.0], vec![2.0]]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            kmeans.fit(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::DimensionMismatch(_))
        ));
        assert!(matches!(kmeans.predict(&[vec![1.0]]), Err(Error::InvalidValue(_))));
    }
}
