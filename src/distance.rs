use crate::cluster::Cluster;
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Euclidean distance between two vectors of equal length
#[inline]
pub fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    let mut sum = 0.0f64;
    for j in 0..a.len() {
        let d = a[j] - b[j];
        sum += d * d;
    }
    sum.sqrt()
}

/// Id of the cluster whose centroid is closest to `point`.
///
/// Clusters are scanned in ascending id order and the incumbent is only
/// replaced on strict improvement, so the lowest id wins ties. Returns 0 when
/// no distance is smaller than infinity.
pub fn nearest_center(point: &ArrayView1<f64>, clusters: &[Cluster]) -> usize {
    let mut min_dist = f64::INFINITY;
    let mut best = 0;

    for (i, cluster) in clusters.iter().enumerate() {
        let dist = euclidean_distance(&cluster.centroid().view(), point);
        if dist < min_dist {
            min_dist = dist;
            best = i;
        }
    }

    best
}

/// Parallel version of [`nearest_center`].
///
/// Each worker reduces its share of the clusters to a local best, then the
/// partial results are combined keeping the lower id on equal distance.
/// Returns exactly what [`nearest_center`] returns.
pub fn nearest_center_par(point: &ArrayView1<f64>, clusters: &[Cluster]) -> usize {
    clusters
        .par_iter()
        .enumerate()
        .map(|(i, cluster)| (i, euclidean_distance(&cluster.centroid().view(), point)))
        .reduce_with(closer)
        .filter(|&(_, dist)| dist < f64::INFINITY)
        .map_or(0, |(i, _)| i)
}

#[inline]
fn closer(a: (usize, f64), b: (usize, f64)) -> (usize, f64) {
    if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) || (a.1.is_nan() && !b.1.is_nan()) {
        b
    } else {
        a
    }
}

/// Compute centroid shift (sum of L2 norms of centroid movements)
pub fn compute_centroid_shift(
    old_centroids: &ArrayView2<f64>,
    new_centroids: &ArrayView2<f64>,
) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_c, new_c)| euclidean_distance(&old_c, &new_c))
        .sum()
}
