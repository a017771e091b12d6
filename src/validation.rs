//! Coverage and containment validation for partition runs.
//!
//! Provides functions to verify the combinatorial contract of a partition
//! list against the clouds that produced it. Useful for debugging, testing,
//! and catching geometry issues in caller-supplied data.
//!
//! The box-based containment checks assume each partition's search set was
//! gathered around the bounding box of its query points, which holds for
//! [`NestedOctree`](crate::NestedOctree) and
//! [`NestedGrid`](crate::NestedGrid) output. The experimental agglomerative
//! partitioner grows non-box-shaped clusters; validate only the coverage
//! fields for it.

use glam::DVec3;
use rustc_hash::FxHashSet;

use crate::types::{Partition, Point3Like};

/// Detailed validation report for one partition run.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Number of partitions checked.
    pub num_partitions: usize,

    /// Query indices appearing in no partition.
    pub missing_query_indices: usize,
    /// Query indices appearing in more than one partition.
    pub duplicate_query_indices: usize,

    /// Partitions whose search population exceeds the cap.
    pub overpopulated_partitions: usize,
    /// Largest search population seen in any partition.
    pub max_search_population: usize,

    /// Search indices lying farther than the buffer radius (per axis) from
    /// the bounding box of their partition's query points.
    pub stray_search_points: usize,
    /// Search points within the buffered bounding box of some partition's
    /// query points but absent from that partition's search set.
    pub missing_search_neighbors: usize,
}

impl ValidationReport {
    /// True when the run satisfies the full partitioning contract:
    /// exact disjoint query cover, population bound, and buffered
    /// containment in both directions.
    pub fn is_valid(&self) -> bool {
        self.missing_query_indices == 0
            && self.duplicate_query_indices == 0
            && self.overpopulated_partitions == 0
            && self.stray_search_points == 0
            && self.missing_search_neighbors == 0
    }
}

#[inline]
fn inside(p: DVec3, low: DVec3, high: DVec3) -> bool {
    p.cmpge(low).all() && p.cmple(high).all()
}

/// Check a partition list against the clouds and parameters that produced it.
pub fn check_partitions<P: Point3Like>(
    query_set: &[P],
    search_space: &[P],
    buffer_radius: f64,
    max_population: usize,
    partitions: &[Partition],
) -> ValidationReport {
    let query: Vec<DVec3> = query_set.iter().map(|p| p.to_dvec3()).collect();
    let search: Vec<DVec3> = search_space.iter().map(|p| p.to_dvec3()).collect();

    let mut coverage = vec![0usize; query.len()];
    let mut overpopulated = 0;
    let mut max_seen = 0;
    let mut stray = 0;
    let mut missing_neighbors = 0;

    for partition in partitions {
        for &qi in &partition.query_indices {
            coverage[qi as usize] += 1;
        }

        max_seen = max_seen.max(partition.search_len());
        if partition.search_len() > max_population {
            overpopulated += 1;
        }

        if partition.query_indices.is_empty() {
            continue;
        }
        let mut low = DVec3::INFINITY;
        let mut high = DVec3::NEG_INFINITY;
        for &qi in &partition.query_indices {
            low = low.min(query[qi as usize]);
            high = high.max(query[qi as usize]);
        }
        let low = low - buffer_radius;
        let high = high + buffer_radius;

        for &si in &partition.search_indices {
            if !inside(search[si as usize], low, high) {
                stray += 1;
            }
        }

        let members: FxHashSet<u32> = partition.search_indices.iter().copied().collect();
        for (si, p) in search.iter().enumerate() {
            if inside(*p, low, high) && !members.contains(&(si as u32)) {
                missing_neighbors += 1;
            }
        }
    }

    ValidationReport {
        num_partitions: partitions.len(),
        missing_query_indices: coverage.iter().filter(|&&c| c == 0).count(),
        duplicate_query_indices: coverage.iter().filter(|&&c| c > 1).count(),
        overpopulated_partitions: overpopulated,
        max_search_population: max_seen,
        stray_search_points: stray,
        missing_search_neighbors: missing_neighbors,
    }
}
