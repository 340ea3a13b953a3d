use crate::algorithm::{in_pool, run_lloyd, KMeansResult, Termination};
use crate::cluster::Cluster;
use crate::config::KMeansConfig;
use crate::distance::nearest_center;
use crate::error::KMeansError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Lloyd's k-means clustering compatible with ndarray.
///
/// Runs serially or on a dedicated rayon pool depending on the configured
/// [`Execution`](crate::Execution). Both modes give the same clustering for
/// the same seed.
///
/// # Example
///
/// ```
/// use lloyd_kmeans::{KMeans, KMeansConfig};
/// use ndarray::array;
///
/// let data = array![[0.0], [1.0], [9.0], [10.0]];
///
/// let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(7));
/// kmeans.train(&data.view()).unwrap();
///
/// let labels = kmeans.predict(&data.view()).unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[1], labels[2]);
/// ```
pub struct KMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Number of features (dimensions)
    d: usize,

    /// Trained centroids (None if not yet fitted or the run was declined)
    centroids: Option<Array2<f64>>,

    /// Outcome of the last run
    result: Option<KMeansResult>,
}

impl KMeans {
    /// Create a new KMeans instance with default configuration.
    ///
    /// # Arguments
    ///
    /// * `d` - Number of features (dimensions) in the data
    /// * `k` - Number of clusters
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0.
    pub fn new(d: usize, k: usize) -> Self {
        assert!(k > 0, "k must be greater than 0");

        Self {
            config: KMeansConfig::new(k),
            d,
            centroids: None,
            result: None,
        }
    }

    /// Create a new KMeans instance with custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0.
    pub fn with_config(config: KMeansConfig) -> Self {
        assert!(config.k > 0, "k must be greater than 0");

        Self {
            d: 0, // Will be set on first train call
            config,
            centroids: None,
            result: None,
        }
    }

    /// Train the model on the given data.
    ///
    /// Returns how the run ended. A [`Termination::Declined`] run (more
    /// clusters than points) is not an error but leaves the model unfitted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data dimensions don't match (for subsequent calls)
    /// - The worker pool cannot be built
    pub fn train(&mut self, data: &ArrayView2<f64>) -> Result<Termination, KMeansError> {
        let n_features = data.ncols();

        // Set dimensions on first call, validate on subsequent calls
        if self.d == 0 {
            self.d = n_features;
        } else if n_features != self.d {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let result = run_lloyd(data, &self.config)?;
        let termination = result.termination;

        self.centroids = match termination {
            Termination::Declined => None,
            _ => Some(result.centroids()),
        };
        self.result = Some(result);
        Ok(termination)
    }

    /// Fit the model to the data. Equivalent to `train()`.
    ///
    /// Returns `&mut Self` for method chaining.
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, KMeansError> {
        self.train(data)?;
        Ok(self)
    }

    /// Predict the nearest cluster of each row of `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<i64>, KMeansError> {
        let clusters = self.fitted_clusters()?;

        let n_features = data.ncols();
        if n_features != self.d {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let execution = self.config.execution;
        in_pool(execution, || {
            let label = |row: ArrayView1<f64>| nearest_center(&row, clusters) as i64;
            if execution.is_parallel() {
                let labels: Vec<i64> = data
                    .axis_iter(Axis(0))
                    .into_par_iter()
                    .map(label)
                    .collect();
                Array1::from(labels)
            } else {
                data.axis_iter(Axis(0)).map(label).collect()
            }
        })
    }

    /// Fit the model and predict cluster assignments in one call.
    pub fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<i64>, KMeansError> {
        self.train(data)?;
        self.predict(data)
    }

    fn fitted_clusters(&self) -> Result<&[Cluster], KMeansError> {
        match &self.result {
            Some(result) if result.termination != Termination::Declined => Ok(&result.clusters),
            _ => Err(KMeansError::NotFitted),
        }
    }

    /// Centroids of the fitted model, `None` before a successful run.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    /// Clusters with their members, `None` before a successful run.
    pub fn clusters(&self) -> Option<&[Cluster]> {
        self.fitted_clusters().ok()
    }

    /// Full outcome of the last run, including declined runs.
    pub fn result(&self) -> Option<&KMeansResult> {
        self.result.as_ref()
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}
