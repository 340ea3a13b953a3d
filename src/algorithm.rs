use crate::cluster::Cluster;
use crate::config::{Execution, KMeansConfig};
use crate::distance::{compute_centroid_shift, nearest_center, nearest_center_par};
use crate::error::KMeansError;
use log::{info, log, log_enabled, warn, Level};
use ndarray::{Array1, Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// From this many clusters on, parallel runs also split each nearest-center
/// search across workers.
const PAR_CENTER_THRESHOLD: usize = 64;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No point's nearest centroid differs from its assignment
    Converged,
    /// The iteration cap was reached first
    Capped,
    /// k exceeded the number of points, nothing was clustered
    Declined,
}

/// Result of a k-means run
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Clusters in ascending id order. Empty for a declined run.
    pub clusters: Vec<Cluster>,
    /// Cluster id per point, -1 for unassigned
    pub labels: Array1<i64>,
    pub n_iterations: usize,
    pub termination: Termination,
    /// Seed the initial centers were drawn with
    pub seed: u64,
}

impl KMeansResult {
    fn declined(n_samples: usize, seed: u64) -> Self {
        Self {
            clusters: Vec::new(),
            labels: Array1::from_elem(n_samples, -1),
            n_iterations: 0,
            termination: Termination::Declined,
            seed,
        }
    }

    /// Centroids stacked as a (k, n_features) matrix
    pub fn centroids(&self) -> Array2<f64> {
        stack_centroids(&self.clusters)
    }
}

/// The mutable state of one clustering run: the point matrix, each point's
/// current cluster, and the clusters.
///
/// Each step of Lloyd's algorithm is exposed on its own so the state can be
/// inspected between steps. Outside of [`LloydState::assign`], every labelled
/// point is a member of exactly the cluster its label names.
pub struct LloydState<'a> {
    data: ArrayView2<'a, f64>,
    labels: Vec<Option<usize>>,
    clusters: Vec<Cluster>,
    execution: Execution,
}

impl<'a> LloydState<'a> {
    /// Pick `k` distinct points uniformly at random as the initial centers.
    ///
    /// Returns `None` when `k` exceeds the number of points.
    pub fn initialize<R: Rng + ?Sized>(
        data: ArrayView2<'a, f64>,
        k: usize,
        execution: Execution,
        rng: &mut R,
    ) -> Option<Self> {
        let n_samples = data.nrows();
        if k > n_samples {
            return None;
        }

        let seeds = choose_seed_points(n_samples, k, rng);
        Some(Self::seeded(data, &seeds, execution))
    }

    /// Build the state with one cluster per seed point. Cluster `i` starts at
    /// the coordinates of `seeds[i]`, which becomes its only member.
    ///
    /// # Errors
    ///
    /// Returns [`KMeansError::InvalidSeeds`] if a seed is not a row of `data`
    /// or appears more than once.
    pub fn from_seed_points(
        data: ArrayView2<'a, f64>,
        seeds: &[usize],
        execution: Execution,
    ) -> Result<Self, KMeansError> {
        let n_samples = data.nrows();
        let mut used = vec![false; n_samples];

        for &point in seeds {
            if point >= n_samples {
                return Err(KMeansError::InvalidSeeds(format!(
                    "point {} is out of range for {} points",
                    point, n_samples
                )));
            }
            if used[point] {
                return Err(KMeansError::InvalidSeeds(format!(
                    "point {} is used more than once",
                    point
                )));
            }
            used[point] = true;
        }

        Ok(Self::seeded(data, seeds, execution))
    }

    /// Seeds must be distinct rows of `data`.
    fn seeded(data: ArrayView2<'a, f64>, seeds: &[usize], execution: Execution) -> Self {
        let mut labels = vec![None; data.nrows()];
        let clusters = seeds
            .iter()
            .enumerate()
            .map(|(id, &point)| {
                labels[point] = Some(id);
                Cluster::new(id, point, data.row(point))
            })
            .collect();

        Self {
            data,
            labels,
            clusters,
            execution,
        }
    }

    fn nearest(&self, point: usize) -> usize {
        let row = self.data.row(point);
        if self.execution.is_parallel() && self.clusters.len() >= PAR_CENTER_THRESHOLD {
            nearest_center_par(&row, &self.clusters)
        } else {
            nearest_center(&row, &self.clusters)
        }
    }

    /// Move every point to the cluster with the nearest centroid.
    ///
    /// Nearest centers are computed for all points first (in parallel when
    /// configured), then migrations are applied in ascending point id: the
    /// point leaves its old cluster, gets relabelled, and joins the new one.
    /// Returns the number of points that migrated.
    pub fn assign(&mut self) -> usize {
        if self.clusters.is_empty() {
            return 0;
        }

        let n_samples = self.data.nrows();
        let this = &*self;
        let targets: Vec<usize> = if this.execution.is_parallel() {
            (0..n_samples).into_par_iter().map(|i| this.nearest(i)).collect()
        } else {
            (0..n_samples).map(|i| this.nearest(i)).collect()
        };

        let mut migrations = 0;
        for (point, target) in targets.into_iter().enumerate() {
            let current = self.labels[point];
            if current == Some(target) {
                continue;
            }

            if let Some(old) = current {
                self.clusters[old].remove_point(point);
            }
            self.labels[point] = Some(target);
            self.clusters[target].add_point(point);
            migrations += 1;
        }

        migrations
    }

    /// Recompute every centroid as the mean of its members. Empty clusters
    /// keep their centroid.
    pub fn update_centroids(&mut self) {
        let data = self.data;
        if self.execution.is_parallel() {
            self.clusters
                .par_iter_mut()
                .for_each(|cluster| cluster.recompute_centroid(&data));
        } else {
            self.clusters
                .iter_mut()
                .for_each(|cluster| cluster.recompute_centroid(&data));
        }
    }

    /// True when every point is already in the cluster with the nearest
    /// centroid. Does not modify anything.
    pub fn has_converged(&self) -> bool {
        let n_samples = self.data.nrows();
        let misplaced = |i: usize| self.labels[i] != Some(self.nearest(i));

        if self.execution.is_parallel() {
            !(0..n_samples).into_par_iter().any(misplaced)
        } else {
            !(0..n_samples).any(misplaced)
        }
    }

    /// Run assignment, centroid update and convergence check until the check
    /// passes or `max_iters` iterations have run. At least one iteration
    /// always runs.
    ///
    /// Returns the iteration the loop stopped at and why.
    pub fn iterate(&mut self, max_iters: usize, verbose: bool) -> (usize, Termination) {
        let level = if verbose { Level::Info } else { Level::Debug };
        let mut iteration = 1;

        loop {
            let iter_start = Instant::now();
            let prev_centroids = log_enabled!(level).then(|| self.centroids());

            let migrations = self.assign();
            self.update_centroids();
            let converged = self.has_converged();

            if let Some(prev) = prev_centroids {
                let shift = compute_centroid_shift(&prev.view(), &self.centroids().view());
                log!(
                    level,
                    "  Iteration {}/{}: migrations = {}, shift = {:.6}, time = {:.4}s",
                    iteration,
                    max_iters,
                    migrations,
                    shift,
                    iter_start.elapsed().as_secs_f64()
                );
            }

            if converged {
                return (iteration, Termination::Converged);
            }
            if iteration >= max_iters {
                return (iteration, Termination::Capped);
            }

            iteration += 1;
        }
    }

    /// Current cluster of each point
    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Centroids stacked as a (k, n_features) matrix
    pub fn centroids(&self) -> Array2<f64> {
        if self.clusters.is_empty() {
            return Array2::zeros((0, self.data.ncols()));
        }
        stack_centroids(&self.clusters)
    }

    /// Check that each labelled point appears exactly once, in the cluster
    /// its label names, and that unlabelled points appear nowhere.
    pub fn is_consistent(&self) -> bool {
        let n_samples = self.data.nrows();
        let mut seen = vec![0usize; n_samples];

        for cluster in &self.clusters {
            for &point in cluster.members() {
                if point >= n_samples || self.labels[point] != Some(cluster.id()) {
                    return false;
                }
                seen[point] += 1;
            }
        }

        self.labels
            .iter()
            .zip(&seen)
            .all(|(label, &count)| count == usize::from(label.is_some()))
    }

    fn into_result(self, n_iterations: usize, termination: Termination, seed: u64) -> KMeansResult {
        let labels = self
            .labels
            .iter()
            .map(|label| label.map_or(-1, |c| c as i64))
            .collect();

        KMeansResult {
            clusters: self.clusters,
            labels,
            n_iterations,
            termination,
            seed,
        }
    }
}

/// Run Lloyd's k-means on `data` (rows are points).
///
/// A `k` larger than the number of points is not an error: the run is
/// declined and the result carries [`Termination::Declined`] with no clusters.
pub fn run_lloyd(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
) -> Result<KMeansResult, KMeansError> {
    if config.k == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    let seed = config.seed.unwrap_or_else(seed_from_clock);
    in_pool(config.execution, || drive(*data, config, seed))
}

fn drive(data: ArrayView2<f64>, config: &KMeansConfig, seed: u64) -> KMeansResult {
    let n_samples = data.nrows();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let Some(mut state) = LloydState::initialize(data, config.k, config.execution, &mut rng) else {
        warn!(
            "Not clustering: k ({}) is greater than the number of points ({})",
            config.k, n_samples
        );
        return KMeansResult::declined(n_samples, seed);
    };

    info!(
        "Training k-means: {} samples, {} features, {} clusters, {} thread(s), seed {}",
        n_samples,
        data.ncols(),
        config.k,
        config.execution.n_threads(),
        seed
    );

    let (n_iterations, termination) = state.iterate(config.max_iters, config.verbose);
    info!("Stopped at iteration {} ({:?})", n_iterations, termination);

    state.into_result(n_iterations, termination, seed)
}

/// Run `op` on the calling thread for serial execution, or inside a fresh
/// rayon pool of the configured size for parallel execution.
pub(crate) fn in_pool<T, F>(execution: Execution, op: F) -> Result<T, KMeansError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match execution {
        Execution::Serial => Ok(op()),
        Execution::Parallel { n_threads } => {
            if n_threads == 0 {
                return Err(KMeansError::InvalidThreadCount(
                    "parallel execution needs at least one thread".to_string(),
                ));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()?;
            Ok(pool.install(op))
        }
    }
}

/// Rejection sampling: draw indices until `k` distinct ones are found.
fn choose_seed_points<R: Rng + ?Sized>(n_samples: usize, k: usize, rng: &mut R) -> Vec<usize> {
    let mut selected = Vec::with_capacity(k);
    while selected.len() < k {
        let candidate = rng.gen_range(0..n_samples);
        if !selected.contains(&candidate) {
            selected.push(candidate);
        }
    }
    selected
}

fn stack_centroids(clusters: &[Cluster]) -> Array2<f64> {
    let n_features = clusters.first().map_or(0, |c| c.centroid().len());
    let mut centroids = Array2::zeros((clusters.len(), n_features));
    for (i, cluster) in clusters.iter().enumerate() {
        centroids.row_mut(i).assign(cluster.centroid());
    }
    centroids
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| {
            d.as_secs()
                .wrapping_mul(1_000_000_000)
                .wrapping_add(u64::from(d.subsec_nanos()))
        })
        .unwrap_or(0)
}
