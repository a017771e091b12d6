//! Joint region filter over a query set and a buffered search space.

use glam::DVec3;

use crate::types::Point3Like;

#[inline]
fn inside(p: DVec3, low: DVec3, high: DVec3) -> bool {
    p.cmpge(low).all() && p.cmple(high).all()
}

/// Indices of all points between `low` and `high` (closed box).
fn region_indices(points: &[DVec3], low: DVec3, high: DVec3) -> Vec<u32> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| inside(**p, low, high))
        .map(|(i, _)| i as u32)
        .collect()
}

/// Filter an already-filtered index subset against a new box, preserving the
/// original (global) indices.
///
/// If no candidate would be excluded by the box, the subset is returned
/// unchanged without per-point tests.
pub(crate) fn subset_indices(
    points: &[DVec3],
    subset: &[u32],
    low: DVec3,
    high: DVec3,
) -> Vec<u32> {
    if subset.is_empty() {
        return Vec::new();
    }

    let mut lowest = DVec3::INFINITY;
    let mut highest = DVec3::NEG_INFINITY;
    for &i in subset {
        let p = points[i as usize];
        lowest = lowest.min(p);
        highest = highest.max(p);
    }
    if inside(lowest, low, high) && inside(highest, low, high) {
        return subset.to_vec();
    }

    subset
        .iter()
        .copied()
        .filter(|&i| inside(points[i as usize], low, high))
        .collect()
}

/// Bounding box of an index subset of `points`.
pub(crate) fn subset_bounds(points: &[DVec3], subset: &[u32]) -> (DVec3, DVec3) {
    debug_assert!(!subset.is_empty(), "bounding box of an empty subset");
    let mut low = DVec3::INFINITY;
    let mut high = DVec3::NEG_INFINITY;
    for &i in subset {
        let p = points[i as usize];
        low = low.min(p);
        high = high.max(p);
    }
    (low, high)
}

/// Indices of every query-set and search-space point in a region of interest.
///
/// Query points are kept when they lie inside the closed box
/// `[minimum_corner, maximum_corner]`; search-space points are kept when they
/// lie inside the same box expanded by `buffer_radius` on every axis.
pub fn nested_regions<P: Point3Like>(
    query_set: &[P],
    search_space: &[P],
    buffer_radius: f64,
    minimum_corner: [f64; 3],
    maximum_corner: [f64; 3],
) -> (Vec<u32>, Vec<u32>) {
    let query: Vec<DVec3> = query_set.iter().map(|p| p.to_dvec3()).collect();
    let search: Vec<DVec3> = search_space.iter().map(|p| p.to_dvec3()).collect();
    let low = DVec3::from_array(minimum_corner);
    let high = DVec3::from_array(maximum_corner);

    let query_indices = region_indices(&query, low, high);
    let search_indices = region_indices(
        &search,
        low - buffer_radius,
        high + buffer_radius,
    );

    (query_indices, search_indices)
}
