//! Benchmark nested partitioning at large scales.
//!
//! Run with: cargo run --release --bin bench_partition
//!
//! Usage:
//!   bench_partition                Run default size (100k)
//!   bench_partition 100k 500k 1m  Run multiple sizes
//!   bench_partition --cap 5000    Use a different population cap
//!   bench_partition -n 10         Run 10 iterations (for profiling)

use clap::Parser;
use nested_partition::{partition, validation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if s.ends_with('m') {
        (&s[..s.len() - 1], 1_000_000)
    } else if s.ends_with('k') {
        (&s[..s.len() - 1], 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser)]
#[command(about = "Benchmark nested partitioning")]
struct Args {
    /// Query-set sizes to run (e.g. 100k, 1m).
    #[arg(value_parser = parse_count)]
    sizes: Vec<usize>,

    /// Search-space points per query point.
    #[arg(long, default_value_t = 4.0)]
    density: f64,

    /// Population cap per partition.
    #[arg(long, default_value_t = 10_000)]
    cap: usize,

    /// Buffer radius, in units of mean query spacing.
    #[arg(long, default_value_t = 2.0)]
    buffer: f64,

    /// Iterations per size (for profiling).
    #[arg(short = 'n', long, default_value_t = 1)]
    iters: usize,

    /// Validate the output of each run (slow for large sizes).
    #[arg(long)]
    validate: bool,
}

fn random_cube_points<R: Rng>(n: usize, side: f64, rng: &mut R) -> Vec<[f64; 3]> {
    (0..n)
        .map(|_| {
            [
                rng.gen_range(0.0..side),
                rng.gen_range(0.0..side),
                rng.gen_range(0.0..side),
            ]
        })
        .collect()
}

fn main() {
    let args = Args::parse();
    let sizes = if args.sizes.is_empty() {
        vec![100_000]
    } else {
        args.sizes.clone()
    };

    for &n in &sizes {
        // Unit mean spacing: side grows with the cube root of n.
        let side = (n as f64).cbrt();
        let buffer_radius = args.buffer;
        let num_search = (n as f64 * args.density) as usize;

        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let query = random_cube_points(n, side, &mut rng);
        let search = random_cube_points(num_search, side, &mut rng);

        for iter in 0..args.iters {
            let start = Instant::now();
            let output = match partition(&query, &search, buffer_radius, args.cap) {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("n={}: partitioning failed: {}", n, e);
                    return;
                }
            };
            let elapsed = start.elapsed();

            let d = &output.diagnostics;
            println!(
                "n={} iter={} partitions={} (octree={}, grid={}) depth={} max_pop={} elapsed={:.3?}",
                n,
                iter,
                d.num_partitions,
                d.num_octree_leaves,
                d.num_grid_cells,
                d.tree_depth,
                d.max_search_population,
                elapsed
            );

            if args.validate {
                let report = validation::check_partitions(
                    &query,
                    &search,
                    buffer_radius,
                    args.cap,
                    &output.partitions,
                );
                println!("  valid={} {:?}", report.is_valid(), report);
            }
        }
    }
}
