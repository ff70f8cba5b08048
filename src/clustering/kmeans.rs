//! Lloyd's K-means with k-means++ seeding, plus the silhouette score.

use nalgebra::DMatrix;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::ClusteringConfig;
use crate::error::{EfficiencyError, Result};

#[derive(Debug, Clone)]
pub struct KMeans {
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    /// Relative to the mean feature variance of the data.
    pub tolerance: f64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    /// `k` rows, one centroid each.
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub iterations: usize,
}

impl KMeans {
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            seed: config.seed,
            n_init: config.n_init.max(1),
            max_iter: config.max_iter.max(1),
            tolerance: config.tolerance,
        }
    }

    /// Best of `n_init` seeded runs by inertia. Ties keep the earlier run.
    pub fn fit(&self, data: &DMatrix<f64>, k: usize) -> Result<KMeansFit> {
        let points = rows(data);
        if k == 0 || k > points.len() {
            return Err(EfficiencyError::Numeric(format!(
                "cannot form {k} clusters from {} points",
                points.len()
            )));
        }

        let tol = self.tolerance * mean_variance(data);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;
        for run in 0..self.n_init {
            let seeds = plus_plus_seeds(&points, k, &mut rng);
            let fit = self.lloyd(&points, seeds, tol);
            debug!(run, inertia = fit.inertia, iterations = fit.iterations, "k-means run");
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best.ok_or_else(|| EfficiencyError::Numeric("k-means produced no run".to_string()))
    }

    fn lloyd(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, tol: f64) -> KMeansFit {
        let k = centroids.len();
        let dims = points[0].len();
        let mut labels = assign(points, &centroids);
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;
            let mut sums = vec![vec![0.0; dims]; k];
            let mut counts = vec![0usize; k];
            for (p, &l) in points.iter().zip(&labels) {
                counts[l] += 1;
                for (s, v) in sums[l].iter_mut().zip(p) {
                    *s += v;
                }
            }

            let mut updated: Vec<Vec<f64>> = sums
                .into_iter()
                .zip(&counts)
                .map(|(s, &c)| {
                    if c == 0 {
                        s
                    } else {
                        s.into_iter().map(|v| v / c as f64).collect()
                    }
                })
                .collect();

            // Empty clusters take the point farthest from its own centroid.
            for c in 0..k {
                if counts[c] > 0 {
                    continue;
                }
                let Some(far) = farthest_point(points, &labels, &counts, &updated) else {
                    continue;
                };
                updated[c] = points[far].clone();
                counts[labels[far]] -= 1;
                labels[far] = c;
                counts[c] = 1;
            }

            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| squared_distance(a, b))
                .sum();
            centroids = updated;
            labels = assign(points, &centroids);
            if shift <= tol {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .sum();
        KMeansFit {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }
}

fn rows(data: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..data.nrows())
        .map(|i| data.row(i).iter().copied().collect())
        .collect()
}

fn mean_variance(data: &DMatrix<f64>) -> f64 {
    if data.nrows() == 0 || data.ncols() == 0 {
        return 0.0;
    }
    let n = data.nrows() as f64;
    let total: f64 = data
        .column_iter()
        .map(|c| {
            let mean = c.sum() / n;
            c.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / data.ncols() as f64
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Nearest centroid per point; ties go to the lower index.
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_d = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(p, centroid);
                if d < best_d {
                    best = c;
                    best_d = d;
                }
            }
            best
        })
        .collect()
}

/// Farthest point from its centroid among clusters that can spare one.
fn farthest_point(
    points: &[Vec<f64>],
    labels: &[usize],
    counts: &[usize],
    centroids: &[Vec<f64>],
) -> Option<usize> {
    let mut far = None;
    let mut far_d = f64::NEG_INFINITY;
    for (i, (p, &l)) in points.iter().zip(labels).enumerate() {
        if counts[l] < 2 {
            continue;
        }
        let d = squared_distance(p, &centroids[l]);
        if d > far_d {
            far = Some(i);
            far_d = d;
        }
    }
    far
}

/// k-means++: first seed uniform, the rest drawn proportionally to the
/// squared distance from the nearest chosen seed.
fn plus_plus_seeds(points: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut chosen = vec![rng.gen_range(0..n)];
    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[chosen[0]]))
        .collect();

    while chosen.len() < k {
        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = n - 1;
            for (i, d) in nearest.iter().enumerate() {
                acc += d;
                if acc > target {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // all remaining points coincide with a seed
            (0..n).find(|i| !chosen.contains(i)).unwrap_or(0)
        };
        chosen.push(next);
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &points[next]));
        }
    }

    chosen.into_iter().map(|i| points[i].clone()).collect()
}

/// Mean silhouette coefficient with Euclidean distance.
///
/// `None` unless there are at least two labels and fewer labels than points.
/// A point alone in its cluster scores 0.
pub fn silhouette_score(data: &DMatrix<f64>, labels: &[usize]) -> Option<f64> {
    let points = rows(data);
    let n = points.len();
    let k = labels.iter().copied().max()? + 1;
    let distinct = (0..k).filter(|c| labels.contains(c)).count();
    if distinct < 2 || distinct >= n {
        return None;
    }

    let sizes: Vec<usize> = (0..k).map(|c| labels.iter().filter(|&&l| l == c).count()).collect();
    let mut total = 0.0;
    for i in 0..n {
        let mut sums = vec![0.0; k];
        for j in 0..n {
            if i != j {
                sums[labels[j]] += squared_distance(&points[i], &points[j]).sqrt();
            }
        }
        let own = labels[i];
        if sizes[own] <= 1 {
            continue;
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }
    Some(total / n as f64)
}
