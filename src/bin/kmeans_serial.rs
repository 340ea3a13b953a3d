//! Serial k-means over a configuration file and a point file.
//!
//! Usage: `kmeans-serial [config.txt] [points.txt] [seed]`
//!
//! The configuration file holds `total_points total_values K max_iterations`.
//! Prints the clusters, then the elapsed wall-clock time.

use env_logger::Env;
use lloyd_kmeans::io::{read_input_config, read_points};
use lloyd_kmeans::report::write_report;
use lloyd_kmeans::{run_lloyd, Execution};
use std::env;
use std::io::{self, Write};
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map_or("config.txt", String::as_str);
    let points_path = args.get(2).map_or("points.txt", String::as_str);

    let input = read_input_config(config_path)?;
    let data = read_points(points_path, input.total_points, input.total_values)?;

    let mut config = input.to_kmeans_config().with_execution(Execution::Serial);
    if let Some(seed) = args.get(3) {
        config = config.with_seed(seed.parse()?);
    }

    let start = Instant::now();

    let result = run_lloyd(&data.view(), &config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &result, &data.view())?;

    writeln!(out, "Execution time: {} milliseconds", start.elapsed().as_millis())?;

    Ok(())
}
