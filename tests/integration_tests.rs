use approx::assert_relative_eq;
use lloyd_kmeans::io::{read_input_config, read_points};
use lloyd_kmeans::report::write_report;
use lloyd_kmeans::{
    run_lloyd, Execution, KMeans, KMeansConfig, KMeansError, LloydState, Termination,
};
use ndarray::{array, Array2, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::PathBuf;

/// Generate synthetic clustered data with known centers
fn generate_clustered_data(
    n_samples: usize,
    n_features: usize,
    n_clusters: usize,
    seed: u64,
) -> (Array2<f64>, Array2<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Generate random cluster centers
    let centers = Array2::random_using(
        (n_clusters, n_features),
        Uniform::new(-10.0, 10.0),
        &mut rng,
    );

    let noise = Array2::random_using((n_samples, n_features), Uniform::new(-0.5, 0.5), &mut rng);
    let mut data = Array2::zeros((n_samples, n_features));
    for i in 0..n_samples {
        let center = centers.row(i % n_clusters);
        for j in 0..n_features {
            data[[i, j]] = center[j] + noise[[i, j]];
        }
    }

    (data, centers)
}

/// Every centroid of a non-empty cluster equals the mean of its members
fn assert_centroids_are_means(state: &LloydState, data: &ArrayView2<f64>) {
    for cluster in state.clusters() {
        if cluster.is_empty() {
            continue;
        }
        for j in 0..data.ncols() {
            let mean = cluster.members().iter().map(|&p| data[[p, j]]).sum::<f64>()
                / cluster.len() as f64;
            assert_relative_eq!(cluster.centroid()[j], mean, epsilon = 1e-9);
        }
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lloyd-kmeans-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_basic_train() {
    let data = Array2::random((1000, 16), Uniform::new(-1.0, 1.0));
    let mut kmeans = KMeans::new(16, 10);

    let result = kmeans.train(&data.view());
    assert!(result.is_ok(), "Training should succeed");

    let centroids = kmeans.centroids().unwrap();
    assert_eq!(centroids.nrows(), 10, "Should have k centroids");
    assert_eq!(centroids.ncols(), 16, "Centroids should have correct dimensions");
}

#[test]
fn test_basic_fit_predict() {
    let data = Array2::random((300, 8), Uniform::new(-1.0, 1.0));
    let mut kmeans = KMeans::with_config(KMeansConfig::new(4).with_threads(3));

    let labels = kmeans.fit_predict(&data.view()).unwrap();
    assert_eq!(labels.len(), 300, "Should have one label per sample");
    for &label in labels.iter() {
        assert!((0..4).contains(&label), "Labels should be in range [0, k)");
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_two_groups_on_a_line() {
    let data = array![[0.0], [1.0], [9.0], [10.0]];

    for seed in 0..20 {
        for execution in [Execution::Serial, Execution::Parallel { n_threads: 2 }] {
            let config = KMeansConfig::new(2)
                .with_max_iters(10)
                .with_seed(seed)
                .with_execution(execution);
            let result = run_lloyd(&data.view(), &config).unwrap();

            assert_eq!(result.termination, Termination::Converged);
            assert!(result.n_iterations <= 3, "took {} iterations", result.n_iterations);

            let labels = &result.labels;
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);

            let low = result.clusters[labels[0] as usize].centroid()[0];
            let high = result.clusters[labels[2] as usize].centroid()[0];
            assert_relative_eq!(low, 0.5, epsilon = 1e-12);
            assert_relative_eq!(high, 9.5, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_identical_points_single_cluster() {
    let data = Array2::from_elem((5, 2), 3.0);
    let config = KMeansConfig::new(1).with_max_iters(10).with_seed(123);

    let result = run_lloyd(&data.view(), &config).unwrap();

    assert_eq!(result.termination, Termination::Converged);
    assert_eq!(result.n_iterations, 1);
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].len(), 5);
    assert_eq!(result.clusters[0].centroid(), &array![3.0, 3.0]);
}

#[test]
fn test_more_clusters_than_points_is_declined() {
    let data = array![[0.0, 1.0], [2.0, 3.0]];
    for execution in [Execution::Serial, Execution::Parallel { n_threads: 2 }] {
        let config = KMeansConfig::new(3).with_seed(1).with_execution(execution);
        let result = run_lloyd(&data.view(), &config).unwrap();

        assert_eq!(result.termination, Termination::Declined);
        assert!(result.clusters.is_empty());
    }
}

#[test]
fn test_single_iteration_cap() {
    let (data, _) = generate_clustered_data(500, 4, 6, 7);
    let config = KMeansConfig::new(6).with_max_iters(1).with_seed(11);

    let result = run_lloyd(&data.view(), &config).unwrap();

    assert_eq!(result.n_iterations, 1);
    assert!(matches!(
        result.termination,
        Termination::Converged | Termination::Capped
    ));
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_membership_and_means_hold_each_iteration() {
    let (data, _) = generate_clustered_data(600, 5, 4, 3);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut state = LloydState::initialize(
        data.view(),
        8,
        Execution::Parallel { n_threads: 4 },
        &mut rng,
    )
    .unwrap();
    assert!(state.is_consistent());

    for _ in 0..10 {
        state.assign();
        assert!(state.is_consistent(), "membership broken after assignment");

        state.update_centroids();
        assert_centroids_are_means(&state, &data.view());

        let converged = state.has_converged();
        assert_eq!(converged, state.has_converged());
        if converged {
            break;
        }
    }
}

#[test]
fn test_every_point_in_exactly_one_cluster() {
    let data = Array2::random((400, 3), Uniform::new(-5.0, 5.0));
    let config = KMeansConfig::new(7).with_seed(5).with_threads(4);
    let result = run_lloyd(&data.view(), &config).unwrap();

    let mut seen = vec![0; 400];
    for cluster in &result.clusters {
        for &p in cluster.members() {
            assert_eq!(result.labels[p], cluster.id() as i64);
            seen[p] += 1;
        }
    }
    assert!(seen.iter().all(|&count| count == 1));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_serial_matches_parallel() {
    let (data, _) = generate_clustered_data(1000, 8, 5, 42);

    let serial = run_lloyd(&data.view(), &KMeansConfig::new(5).with_seed(2024)).unwrap();

    for n_threads in [1, 4] {
        let config = KMeansConfig::new(5).with_seed(2024).with_threads(n_threads);
        let parallel = run_lloyd(&data.view(), &config).unwrap();

        assert_eq!(serial.labels, parallel.labels);
        assert_eq!(serial.n_iterations, parallel.n_iterations);
        assert_eq!(serial.termination, parallel.termination);
        for (a, b) in serial.clusters.iter().zip(&parallel.clusters) {
            assert_eq!(a.members(), b.members());
            for (x, y) in a.centroid().iter().zip(b.centroid().iter()) {
                assert_relative_eq!(*x, *y, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_serial_matches_parallel_many_clusters() {
    // Enough clusters for the nearest-center search itself to run in parallel
    let data = Array2::random((2000, 4), Uniform::new(-1.0, 1.0));

    let config = KMeansConfig::new(80).with_seed(8).with_max_iters(5);

    let serial = run_lloyd(&data.view(), &config).unwrap();
    let parallel = run_lloyd(&data.view(), &config.clone().with_threads(4)).unwrap();

    assert_eq!(serial.labels, parallel.labels);
}

#[test]
fn test_reproducibility_with_seed() {
    let data = Array2::random((500, 8), Uniform::new(-1.0, 1.0));

    let mut kmeans1 = KMeans::with_config(KMeansConfig::new(5).with_seed(12345));
    let mut kmeans2 = KMeans::with_config(KMeansConfig::new(5).with_seed(12345));

    kmeans1.train(&data.view()).unwrap();
    kmeans2.train(&data.view()).unwrap();

    assert_eq!(kmeans1.centroids().unwrap(), kmeans2.centroids().unwrap());
}

#[test]
fn test_clock_seed_is_reported() {
    let data = Array2::random((100, 2), Uniform::new(-1.0, 1.0));
    let first = run_lloyd(&data.view(), &KMeansConfig::new(3)).unwrap();

    let replay = run_lloyd(&data.view(), &KMeansConfig::new(3).with_seed(first.seed)).unwrap();
    assert_eq!(first.labels, replay.labels);
}

#[test]
fn test_clustering_recovers_separated_groups() {
    // Three tight groups far apart, rows assigned round-robin
    let centers = array![[-10.0, -10.0, -10.0], [0.0, 0.0, 0.0], [10.0, 10.0, 10.0]];
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let noise = Array2::random_using((900, 3), Uniform::new(-0.5, 0.5), &mut rng);
    let mut data = Array2::zeros((900, 3));
    for i in 0..900 {
        for j in 0..3 {
            data[[i, j]] = centers[[i % 3, j]] + noise[[i, j]];
        }
    }

    // One seed point from each group
    let mut state =
        LloydState::from_seed_points(data.view(), &[0, 1, 2], Execution::Parallel { n_threads: 2 })
            .unwrap();
    let (_, termination) = state.iterate(100, false);

    assert_eq!(termination, Termination::Converged);
    for (i, label) in state.labels().iter().enumerate() {
        assert_eq!(*label, Some(i % 3));
    }
    for (cluster, center) in state.clusters().iter().zip(centers.outer_iter()) {
        assert_eq!(cluster.len(), 300);
        for (c, t) in cluster.centroid().iter().zip(center.iter()) {
            assert!((c - t).abs() < 0.5);
        }
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_zero_k_error() {
    let data = array![[1.0]];
    let result = run_lloyd(&data.view(), &KMeansConfig::new(0));
    assert!(matches!(result, Err(KMeansError::InvalidK(_))));
}

#[test]
fn test_zero_threads_error() {
    let data = array![[1.0], [2.0]];
    let result = run_lloyd(&data.view(), &KMeansConfig::new(1).with_threads(0));
    assert!(matches!(result, Err(KMeansError::InvalidThreadCount(_))));
}

#[test]
fn test_dimension_mismatch_on_retrain() {
    let mut kmeans = KMeans::new(2, 1);
    let wrong = array![[1.0, 2.0, 3.0]];
    assert!(matches!(
        kmeans.train(&wrong.view()),
        Err(KMeansError::InvalidDimensions(_))
    ));
}

// ============================================================================
// Files and Report
// ============================================================================

#[test]
fn test_files_to_report() {
    let dir = scratch_dir("report");
    let config_path = dir.join("config.txt");
    let points_path = dir.join("points.txt");
    fs::write(&config_path, "4 1 2 10\n").unwrap();
    fs::write(&points_path, "0.0\n1.0\n9.0\n10.0\n").unwrap();

    let input = read_input_config(&config_path).unwrap();
    let data = read_points(&points_path, input.total_points, input.total_values).unwrap();
    let config = input.to_kmeans_config().with_seed(6);
    let result = run_lloyd(&data.view(), &config).unwrap();

    let mut out = Vec::new();
    write_report(&mut out, &result, &data.view()).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.starts_with(&format!("Break in iteration {}\n\n", result.n_iterations)));
    assert!(report.contains("Cluster 1\n"));
    assert!(report.contains("Cluster 2\n"));
    assert!(report.contains("Cluster values: 0.5 \n"));
    assert!(report.contains("Cluster values: 9.5 \n"));
    assert_eq!(report.matches("Point ").count(), 4);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_points_file() {
    let dir = scratch_dir("missing");
    let result = read_points(dir.join("nope.txt"), 4, 1);
    assert!(matches!(result, Err(KMeansError::Input { .. })));
    fs::remove_dir_all(&dir).unwrap();
}
