//! Unsupervised building blocks for the efficiency analysis.

pub mod features;
pub mod kmeans;
pub mod pca;

use nalgebra::DMatrix;

use crate::config::ClusteringConfig;
use crate::error::Result;

pub use features::{FeatureTable, StandardScaler};
pub use kmeans::{silhouette_score, KMeans};
pub use pca::Projection;

/// Labels and within-cluster sum of squares of one clustering.
#[derive(Debug, Clone)]
pub struct Partition {
    pub labels: Vec<usize>,
    pub inertia: f64,
}

/// Numerical capability the analyzer depends on. Rows of `features` are
/// observations.
pub trait ClusteringBackend: Send + Sync {
    fn fit_predict(&self, features: &DMatrix<f64>, k: usize) -> Result<Partition>;

    fn project(&self, features: &DMatrix<f64>, n_components: usize) -> Result<Projection>;
}

/// Seeded K-means and eigendecomposition PCA.
#[derive(Debug, Clone, Default)]
pub struct LloydBackend {
    kmeans: KMeans,
}

impl LloydBackend {
    pub fn new(kmeans: KMeans) -> Self {
        Self { kmeans }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(KMeans::from_config(config))
    }
}

impl ClusteringBackend for LloydBackend {
    fn fit_predict(&self, features: &DMatrix<f64>, k: usize) -> Result<Partition> {
        let fit = self.kmeans.fit(features, k)?;
        Ok(Partition {
            labels: fit.labels,
            inertia: fit.inertia,
        })
    }

    fn project(&self, features: &DMatrix<f64>, n_components: usize) -> Result<Projection> {
        pca::project(features, n_components)
    }
}
