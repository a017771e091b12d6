//! Terminal grid strategy: uniform cube tiling with a shrinking edge length.

use glam::DVec3;
use rustc_hash::FxHashMap;

use super::region::{subset_bounds, subset_indices};
use crate::error::PartitionError;
use crate::types::{Partition, Point3Like};

/// Halvings of the starting edge before giving up on the population bound.
///
/// Only coincident duplicate points can survive this many halvings with an
/// oversized cell; infinite-density inputs are out of scope, and the
/// remaining oversized cells are emitted as-is.
const MAX_HALVINGS: usize = 64;

/// Tile a region with cubes and emit one partition per cube holding at least
/// one query point, shrinking the cube edge by halves until every occupied
/// cube's search population fits under `max_population`.
///
/// Each cube's search set is filtered against the bounding box of the cube's
/// own query points, expanded by `buffer_radius`: every search point within
/// the buffer of the cube's queries is included, and nothing farther out.
pub(crate) fn build_cells(
    query_set: &[DVec3],
    search_space: &[DVec3],
    buffer_radius: f64,
    max_population: usize,
    minimum_corner: DVec3,
    maximum_corner: DVec3,
    q_subset: &[u32],
    s_subset: &[u32],
) -> Vec<Partition> {
    debug_assert!(!q_subset.is_empty(), "grid over an empty query subset");

    let span = maximum_corner - minimum_corner;
    let region_edge = span.max_element();
    if !(region_edge > 0.0) {
        // Degenerate region: all query points coincide. One cell, one pass.
        let search_indices = subset_indices(
            search_space,
            s_subset,
            minimum_corner - buffer_radius,
            maximum_corner + buffer_radius,
        );
        return vec![Partition {
            query_indices: q_subset.to_vec(),
            search_indices,
        }];
    }

    let mut edge = region_edge;
    let mut last = Vec::new();
    for _ in 0..MAX_HALVINGS {
        let counts = [
            (span.x / edge).ceil().max(1.0) as u64,
            (span.y / edge).ceil().max(1.0) as u64,
            (span.z / edge).ceil().max(1.0) as u64,
        ];

        // Bin each query point into exactly one cube (half-open cells; the
        // outermost cube absorbs points on the far boundary).
        let mut cells: FxHashMap<u64, Vec<u32>> = FxHashMap::default();
        for &qi in q_subset {
            let p = query_set[qi as usize];
            let rel = (p - minimum_corner) / edge;
            let ix = (rel.x.floor() as u64).min(counts[0] - 1);
            let iy = (rel.y.floor() as u64).min(counts[1] - 1);
            let iz = (rel.z.floor() as u64).min(counts[2] - 1);
            let flat = (ix * counts[1] + iy) * counts[2] + iz;
            cells.entry(flat).or_default().push(qi);
        }

        // Deterministic emission order regardless of hash layout.
        let mut occupied: Vec<u64> = cells.keys().copied().collect();
        occupied.sort_unstable();

        let mut partitions = Vec::with_capacity(occupied.len());
        let mut bounded = true;
        for flat in occupied {
            let query_indices = match cells.remove(&flat) {
                Some(q) => q,
                None => continue,
            };
            let (low, high) = subset_bounds(query_set, &query_indices);
            let search_indices = subset_indices(
                search_space,
                s_subset,
                low - buffer_radius,
                high + buffer_radius,
            );
            if search_indices.len() > max_population {
                bounded = false;
            }
            partitions.push(Partition {
                query_indices,
                search_indices,
            });
        }

        if bounded {
            return partitions;
        }
        last = partitions;
        edge *= 0.5;
    }

    last
}

/// Single-level nested partitioner: a set of identical cubes covering the
/// region of interest, with the cube edge reduced until the search-space
/// population constraint is met in every occupied cube.
pub struct NestedGrid {
    cells: Vec<Partition>,
}

impl NestedGrid {
    /// Partition `query_set` against `search_space` over the query set's
    /// bounding box.
    ///
    /// Both clouds need at least 2 points; `buffer_radius` must be positive.
    pub fn new<P: Point3Like>(
        query_set: &[P],
        search_space: &[P],
        buffer_radius: f64,
        max_population: usize,
    ) -> Result<Self, PartitionError> {
        let query = validate_cloud(query_set)?;
        let search = validate_cloud(search_space)?;
        if !buffer_radius.is_finite() || buffer_radius <= 0.0 {
            return Err(PartitionError::OutOfBounds(format!(
                "buffer radius must be positive, got {}",
                buffer_radius
            )));
        }

        let all_q: Vec<u32> = (0..query.len() as u32).collect();
        let all_s: Vec<u32> = (0..search.len() as u32).collect();
        let (low, high) = subset_bounds(&query, &all_q);
        let cells = build_cells(
            &query,
            &search,
            buffer_radius,
            max_population,
            low,
            high,
            &all_q,
            &all_s,
        );
        Ok(NestedGrid { cells })
    }

    /// Iterate over all cubes in the grid holding at least one query point.
    pub fn partition_generator(&self) -> impl Iterator<Item = &Partition> {
        self.cells.iter()
    }

    /// Number of occupied grid cubes.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Shape check shared by the partitioner constructors.
pub(crate) fn validate_cloud<P: Point3Like>(points: &[P]) -> Result<Vec<DVec3>, PartitionError> {
    if points.len() < 2 {
        return Err(PartitionError::InsufficientPoints {
            got: points.len(),
            need: 2,
        });
    }
    Ok(points.iter().map(|p| p.to_dvec3()).collect())
}
