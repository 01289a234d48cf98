use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// Cluster assignment of a k-means run
#[derive(Debug, Clone)]
pub struct ClusterFit {
    pub labels: Vec<usize>,
    /// Sum of squared distances of every row to its centroid
    pub inertia: f64,
}

/// Pack equally sized feature rows into a matrix
///
/// Returns `None` for no rows or ragged rows.
pub fn feature_matrix(rows: &[Vec<f64>]) -> Option<Array2<f64>> {
    let n_cols = rows.first()?.len();
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), n_cols), flat).ok()
}

/// Scale every column to zero mean and unit variance in place
///
/// Columns with zero variance become all zeros.
pub fn standardize(records: &mut Array2<f64>) {
    let Some(mean) = records.mean_axis(Axis(0)) else {
        return;
    };
    let std = records.std_axis(Axis(0), 0.0);

    for mut row in records.rows_mut() {
        for ((value, m), s) in row.iter_mut().zip(mean.iter()).zip(std.iter()) {
            *value = if *s > 0.0 { (*value - m) / s } else { 0.0 };
        }
    }
}

/// Seeded k-means++ with `n_runs` restarts; the lowest inertia run wins
///
/// Returns `None` when `k` is zero, exceeds the number of rows, or the
/// fit fails.
pub fn fit_kmeans(records: &Array2<f64>, k: usize, n_runs: usize, seed: u64) -> Option<ClusterFit> {
    if k == 0 || k > records.nrows() {
        return None;
    }

    let dataset = DatasetBase::from(records.clone());
    let model = match KMeans::params_with_rng(k, ChaCha8Rng::seed_from_u64(seed))
        .n_runs(n_runs.max(1))
        .max_n_iterations(MAX_ITERATIONS)
        .tolerance(TOLERANCE)
        .fit(&dataset)
    {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!("k-means with k = {} failed: {}", k, e);
            return None;
        }
    };

    let labels: Array1<usize> = model.predict(records);
    Some(ClusterFit {
        labels: labels.to_vec(),
        inertia: model.inertia(),
    })
}
