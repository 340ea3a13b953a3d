//! Plain-text inputs: the run configuration file, the point matrix file and
//! the worker-count prompt.

use crate::config::KMeansConfig;
use crate::error::KMeansError;
use ndarray::Array2;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Contents of the run configuration file: four whitespace-separated
/// integers `total_points total_values K max_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputConfig {
    pub total_points: usize,
    pub total_values: usize,
    pub k: usize,
    pub max_iterations: usize,
}

impl InputConfig {
    pub fn parse(text: &str) -> Result<Self, KMeansError> {
        let mut tokens = text.split_whitespace();
        let mut next = |name: &str| -> Result<usize, KMeansError> {
            let token = tokens
                .next()
                .ok_or_else(|| KMeansError::Parse(format!("missing {} in configuration", name)))?;
            parse_token(token, name)
        };

        Ok(Self {
            total_points: next("total_points")?,
            total_values: next("total_values")?,
            k: next("K")?,
            max_iterations: next("max_iterations")?,
        })
    }

    /// Clustering parameters for this input; seed and execution keep their
    /// defaults.
    pub fn to_kmeans_config(&self) -> KMeansConfig {
        KMeansConfig::new(self.k).with_max_iters(self.max_iterations)
    }
}

/// Read and parse the run configuration file.
pub fn read_input_config(path: impl AsRef<Path>) -> Result<InputConfig, KMeansError> {
    InputConfig::parse(&read_file(path.as_ref())?)
}

/// Parse `total_points` rows of `total_values` whitespace-separated numbers.
/// Row `i` becomes point `i`. Line breaks are not significant and trailing
/// values are ignored.
pub fn parse_points(
    text: &str,
    total_points: usize,
    total_values: usize,
) -> Result<Array2<f64>, KMeansError> {
    let expected = total_points.checked_mul(total_values).ok_or_else(|| {
        KMeansError::Parse(format!(
            "{} points x {} dimensions does not fit in memory",
            total_points, total_values
        ))
    })?;
    let values = text
        .split_whitespace()
        .take(expected)
        .map(|token| parse_token::<f64>(token, "coordinate"))
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() < expected {
        return Err(KMeansError::Parse(format!(
            "expected {} values ({} points x {} dimensions), found {}",
            expected,
            total_points,
            total_values,
            values.len()
        )));
    }

    Array2::from_shape_vec((total_points, total_values), values)
        .map_err(|e| KMeansError::Parse(e.to_string()))
}

/// Read and parse the point matrix file.
pub fn read_points(
    path: impl AsRef<Path>,
    total_points: usize,
    total_values: usize,
) -> Result<Array2<f64>, KMeansError> {
    parse_points(&read_file(path.as_ref())?, total_points, total_values)
}

/// Parse the worker count typed at the prompt.
pub fn parse_thread_count(line: &str) -> Result<usize, KMeansError> {
    let n_threads: usize = parse_token(line.trim(), "thread count")?;
    if n_threads == 0 {
        return Err(KMeansError::InvalidThreadCount(
            "at least one thread is required".to_string(),
        ));
    }
    Ok(n_threads)
}

fn read_file(path: &Path) -> Result<String, KMeansError> {
    fs::read_to_string(path).map_err(|source| KMeansError::Input {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_token<T: FromStr>(token: &str, name: &str) -> Result<T, KMeansError> {
    token
        .parse()
        .map_err(|_| KMeansError::Parse(format!("invalid {}: {:?}", name, token)))
}
