/// How the per-iteration work of a run is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    /// Everything runs on the calling thread.
    #[default]
    Serial,

    /// Work is spread over a dedicated rayon pool of exactly `n_threads` workers.
    Parallel { n_threads: usize },
}

impl Execution {
    /// Number of workers used by this execution mode.
    pub fn n_threads(&self) -> usize {
        match self {
            Execution::Serial => 1,
            Execution::Parallel { n_threads } => *n_threads,
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Execution::Parallel { .. })
    }
}

/// Configuration for Lloyd's k-means
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of iterations. The loop always runs at least one
    /// iteration, so 0 behaves like 1.
    pub max_iters: usize,

    /// Random seed for picking the initial centers.
    /// `None` derives a seed from the wall clock; the seed actually used is
    /// reported in the result.
    pub seed: Option<u64>,

    /// Serial or parallel scheduling
    pub execution: Execution,

    /// Log per-iteration progress at info level instead of debug
    pub verbose: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 100,
            seed: None,
            execution: Execution::Serial,
            verbose: false,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the execution mode
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Shorthand for `Execution::Parallel { n_threads }`
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.execution = Execution::Parallel { n_threads };
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
