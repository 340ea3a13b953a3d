//! Basic example demonstrating lloyd-kmeans usage
//!
//! Run with: cargo run --example basic --release

use lloyd_kmeans::{KMeans, KMeansConfig};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== lloyd-kmeans example ===\n");

    // Generate synthetic data: 3 clusters in 2D for easy visualization
    let n_samples = 300;
    let n_features = 2;
    let n_clusters = 3;

    println!("Generating {} samples with {} features...", n_samples, n_features);

    let mut data = Array2::<f64>::zeros((n_samples, n_features));

    // Cluster centers
    let centers = [[-5.0, -5.0], [0.0, 5.0], [5.0, -5.0]];

    let noise = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));
    for i in 0..n_samples {
        let cluster_idx = i % 3;
        data[[i, 0]] = centers[cluster_idx][0] + noise[[i, 0]];
        data[[i, 1]] = centers[cluster_idx][1] + noise[[i, 1]];
    }

    println!("True cluster centers:");
    for (i, center) in centers.iter().enumerate() {
        println!("  Cluster {}: ({:.2}, {:.2})", i, center[0], center[1]);
    }
    println!();

    let config = KMeansConfig::new(n_clusters)
        .with_max_iters(100)
        .with_seed(42)
        .with_threads(4)
        .with_verbose(true);

    println!("Running k-means with k={}...\n", n_clusters);

    let mut kmeans = KMeans::with_config(config);
    let termination = kmeans.train(&data.view()).expect("Training failed");
    let result = kmeans.result().expect("no result after training");
    println!(
        "\n{:?} after {} iterations",
        termination, result.n_iterations
    );

    println!("\nLearned centroids:");
    let Some(clusters) = kmeans.clusters() else {
        println!("  (none)");
        return;
    };
    for cluster in clusters {
        let c = cluster.centroid();
        println!(
            "  Centroid {}: ({:.4}, {:.4}) with {} points ({:.1}%)",
            cluster.id(),
            c[0],
            c[1],
            cluster.len(),
            (cluster.len() as f64 / n_samples as f64) * 100.0
        );
    }
    println!();

    // Predict labels
    let labels = kmeans.predict(&data.view()).expect("Prediction failed");

    println!("First 10 sample assignments:");
    for i in 0..10 {
        println!(
            "  Sample {} at ({:.2}, {:.2}) -> Cluster {}",
            i,
            data[[i, 0]],
            data[[i, 1]],
            labels[i]
        );
    }

    println!("\n=== Done! ===");
}
