//! Partitioning contract tests: disjoint cover, population bound, and
//! buffered containment, across input shapes and configurations.

mod support;

use nested_partition::{partition, partition_with, validation, PartitionConfig};
use support::points::{clustered_points, planar_points, random_cube_points};

fn assert_exact_cover(query_len: usize, partitions: &[nested_partition::Partition]) {
    let mut seen = vec![0usize; query_len];
    for p in partitions {
        for &qi in &p.query_indices {
            seen[qi as usize] += 1;
        }
    }
    let missing = seen.iter().filter(|&&c| c == 0).count();
    let duplicated = seen.iter().filter(|&&c| c > 1).count();
    assert_eq!(missing, 0, "{} query indices never emitted", missing);
    assert_eq!(duplicated, 0, "{} query indices emitted twice", duplicated);
}

#[test]
fn test_uniform_cloud_contract() {
    let query = random_cube_points(2000, 50.0, 12345);
    let search = random_cube_points(6000, 50.0, 54321);
    let cap = 300;

    let output = partition(&query, &search, 1.5, cap).unwrap();
    assert!(output.partitions.len() > 1, "expected subdivision");
    assert_exact_cover(query.len(), &output.partitions);

    for p in &output.partitions {
        assert!(p.search_len() <= cap, "population bound violated");
        assert!(!p.query_indices.is_empty(), "empty partition emitted");
    }

    let report = validation::check_partitions(&query, &search, 1.5, cap, &output.partitions);
    assert!(report.is_valid(), "validation failed: {:?}", report);
}

#[test]
fn test_clustered_cloud_contract() {
    let query = clustered_points(3000, 7, 80.0, 99);
    let search = clustered_points(9000, 7, 80.0, 99);
    let cap = 500;

    let output = partition(&query, &search, 2.0, cap).unwrap();
    assert_exact_cover(query.len(), &output.partitions);

    let report = validation::check_partitions(&query, &search, 2.0, cap, &output.partitions);
    assert!(report.is_valid(), "validation failed: {:?}", report);
}

#[test]
fn test_planar_cloud_contract() {
    // Zero extent on one axis exercises the degenerate-span paths.
    let query = planar_points(1500, 40.0, 3.0, 7);
    let search = planar_points(4000, 40.0, 3.0, 8);
    let cap = 200;

    let output = partition(&query, &search, 1.0, cap).unwrap();
    assert_exact_cover(query.len(), &output.partitions);
    for p in &output.partitions {
        assert!(p.search_len() <= cap);
    }
}

#[test]
fn test_disjoint_sets_of_clouds() {
    // Search space nowhere near the query set: partitions may be empty of
    // search points but the query cover must still be exact.
    let query = random_cube_points(500, 10.0, 1);
    let search: Vec<[f64; 3]> = random_cube_points(500, 10.0, 2)
        .into_iter()
        .map(|p| [p[0] + 1000.0, p[1], p[2]])
        .collect();

    let output = partition(&query, &search, 1.0, 50).unwrap();
    assert_exact_cover(query.len(), &output.partitions);
    let total_search: usize = output.partitions.iter().map(|p| p.search_len()).sum();
    assert_eq!(total_search, 0);
}

#[test]
fn test_single_partition_when_cap_generous() {
    let query = random_cube_points(300, 20.0, 5);
    let search = random_cube_points(300, 20.0, 6);

    let output = partition(&query, &search, 1.0, 10_000).unwrap();
    assert_eq!(output.partitions.len(), 1);
    assert_eq!(output.diagnostics.tree_depth, 1);
    assert_eq!(output.diagnostics.num_octree_leaves, 1);
    assert_eq!(output.diagnostics.num_grid_cells, 0);
}

#[test]
fn test_large_minimum_factor_forces_grid() {
    let query = random_cube_points(800, 30.0, 11);
    let search = random_cube_points(2400, 30.0, 12);
    let cap = 150;

    let mut config = PartitionConfig::new(cap);
    // Octant edges can never exceed this, so every subdivision goes to grid.
    config.minimum_factor = 1e9;
    let output = partition_with(&query, &search, 1.0, config).unwrap();

    assert_eq!(output.diagnostics.num_octree_leaves, 0);
    assert!(output.diagnostics.num_grid_cells > 0);
    assert_exact_cover(query.len(), &output.partitions);
    for p in &output.partitions {
        assert!(p.search_len() <= cap);
    }
}

#[test]
fn test_small_minimum_factor_prefers_octree() {
    let query = random_cube_points(2000, 50.0, 21);
    let search = random_cube_points(6000, 50.0, 22);

    let mut config = PartitionConfig::new(300);
    config.minimum_factor = 1e-6;
    let output = partition_with(&query, &search, 1.5, config).unwrap();

    assert!(output.diagnostics.num_octree_leaves > 0);
    assert_exact_cover(query.len(), &output.partitions);
}

#[test]
fn test_runs_are_deterministic() {
    let query = random_cube_points(1000, 30.0, 31);
    let search = random_cube_points(3000, 30.0, 32);

    let a = partition(&query, &search, 1.0, 200).unwrap();
    let b = partition(&query, &search, 1.0, 200).unwrap();
    assert_eq!(a.partitions, b.partitions);
}

#[test]
fn test_diagnostics_consistent_with_partitions() {
    let query = random_cube_points(1200, 40.0, 41);
    let search = random_cube_points(3600, 40.0, 42);

    let output = partition(&query, &search, 1.5, 250).unwrap();
    let d = &output.diagnostics;
    assert_eq!(d.num_partitions, output.partitions.len());
    assert_eq!(
        d.num_partitions,
        d.num_octree_leaves + d.num_grid_cells
    );
    assert_eq!(
        d.max_search_population,
        output
            .partitions
            .iter()
            .map(|p| p.search_len())
            .max()
            .unwrap_or(0)
    );
    assert!(d.tree_depth >= 1);
}
