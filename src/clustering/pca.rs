//! Principal component projection over a covariance eigendecomposition.

use nalgebra::DMatrix;

use crate::error::{EfficiencyError, Result};

#[derive(Debug, Clone)]
pub struct Projection {
    /// One row per observation, one column per component.
    pub coordinates: DMatrix<f64>,
    pub explained_variance_ratio: Vec<f64>,
    /// Component loadings, one row per component.
    pub components: Vec<Vec<f64>>,
}

impl Projection {
    pub fn total_explained_variance(&self) -> f64 {
        self.explained_variance_ratio.iter().sum()
    }

    pub fn coordinate(&self, row: usize, component: usize) -> f64 {
        self.coordinates[(row, component)]
    }
}

/// Project `data` onto its first `n_components` principal axes.
///
/// Components are ordered by decreasing variance. Each axis is oriented so
/// that its largest-magnitude loading is positive, which keeps coordinates
/// stable across runs.
pub fn project(data: &DMatrix<f64>, n_components: usize) -> Result<Projection> {
    let (n, d) = data.shape();
    if n < 2 || n_components == 0 || n_components > d {
        return Err(EfficiencyError::Numeric(format!(
            "cannot extract {n_components} components from a {n}x{d} matrix"
        )));
    }

    let means: Vec<f64> = data.column_iter().map(|c| c.sum() / n as f64).collect();
    let centered = DMatrix::from_fn(n, d, |i, j| data[(i, j)] - means[j]);
    let covariance = centered.transpose() * &centered / (n - 1) as f64;

    let eigen = covariance.symmetric_eigen();
    let mut order: Vec<usize> = (0..d).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let total: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();
    let mut components = Vec::with_capacity(n_components);
    let mut explained_variance_ratio = Vec::with_capacity(n_components);
    for &idx in order.iter().take(n_components) {
        let mut axis: Vec<f64> = eigen.eigenvectors.column(idx).iter().copied().collect();
        let pivot = axis
            .iter()
            .copied()
            .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
        if pivot < 0.0 {
            axis.iter_mut().for_each(|v| *v = -*v);
        }
        components.push(axis);
        explained_variance_ratio.push(if total > 0.0 {
            eigen.eigenvalues[idx].max(0.0) / total
        } else {
            0.0
        });
    }

    let coordinates = DMatrix::from_fn(n, n_components, |i, c| {
        centered
            .row(i)
            .iter()
            .zip(&components[c])
            .map(|(x, w)| x * w)
            .sum::<f64>()
    });

    Ok(Projection {
        coordinates,
        explained_variance_ratio,
        components,
    })
}
