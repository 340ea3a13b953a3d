//! # lloyd-kmeans
//!
//! Lloyd's k-means clustering over an in-memory point matrix, compatible with
//! ndarray, with a serial and a multi-threaded execution mode.
//!
//! ## Features
//!
//! - **Classic Lloyd iteration**: random distinct seed points, nearest-center
//!   assignment, mean recomputation, and a stop as soon as no point would move
//! - **Parallel computation**: Uses a dedicated rayon pool per run; serial and
//!   parallel runs give the same clustering for the same seed
//! - **Reproducible**: Explicit seeds, with a clock-derived seed reported back
//!   when none is given
//! - **Inspectable**: [`LloydState`] exposes each step on its own
//!
//! ## Example
//!
//! ```rust
//! use lloyd_kmeans::{KMeans, KMeansConfig, Termination};
//! use ndarray::array;
//!
//! let data = array![[0.0], [1.0], [9.0], [10.0]];
//!
//! let config = KMeansConfig::new(2)
//!     .with_max_iters(10)
//!     .with_seed(42)
//!     .with_threads(2);
//!
//! let mut kmeans = KMeans::with_config(config);
//! let termination = kmeans.train(&data.view()).unwrap();
//! assert_eq!(termination, Termination::Converged);
//!
//! let centroids = kmeans.centroids().unwrap();
//! assert_eq!(centroids.nrows(), 2);
//! ```
//!
//! ## Degenerate input
//!
//! Asking for more clusters than there are points is not an error: the run
//! is declined and reported as [`Termination::Declined`].

mod algorithm;
mod cluster;
mod config;
mod distance;
mod error;
pub mod io;
mod kmeans;
pub mod report;

pub use algorithm::{run_lloyd, KMeansResult, LloydState, Termination};
pub use cluster::Cluster;
pub use config::{Execution, KMeansConfig};
pub use distance::{euclidean_distance, nearest_center, nearest_center_par};
pub use error::KMeansError;
pub use kmeans::KMeans;
