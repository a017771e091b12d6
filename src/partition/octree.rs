//! Recursive octree strategy for nested partitioning.
//!
//! Each node computes its own bounds from the query points it owns, so the
//! hierarchy is not strictly an octree: the union of the children's bounding
//! boxes is nearly always smaller than the parent's, and the buffered search
//! sets shrink with them.

use glam::DVec3;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Conditionally parallel iterator over an owned Vec.
macro_rules! maybe_par_into_iter {
    ($v:expr) => {{
        #[cfg(feature = "parallel")]
        {
            ($v).into_par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            ($v).into_iter()
        }
    }};
}

use super::grid::{build_cells, validate_cloud};
use super::region::{subset_bounds, subset_indices};
use super::{PartitionNode, PartitionTree, Partitions};
use crate::error::PartitionError;
use crate::types::{Partition, Point3Like};

/// Default ratio between octant edge length and buffer radius below which a
/// region is handed to the grid strategy instead of recursing.
pub const DEFAULT_MINIMUM_FACTOR: f64 = 3.0;

/// Algorithm used to compute the query/search subsets of the 8 octants.
///
/// Only `Naive` (an independent region filter per octant) is implemented.
/// The optimized variants are reserved names; if supplied, they must produce
/// identical results and may only differ in performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OctantStrategy {
    /// Brute force: filter each octant pair independently.
    #[default]
    Naive,
    TakeOne,
    TakeThree,
}

impl FromStr for OctantStrategy {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(OctantStrategy::Naive),
            "take_one" => Ok(OctantStrategy::TakeOne),
            "take_three" => Ok(OctantStrategy::TakeThree),
            other => Err(PartitionError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Recursive nested partitioner.
///
/// Subdivides the query set's bounding region into octants until a region's
/// buffered search population fits under the cap, delegating regions whose
/// edge is small relative to the buffer radius to [`NestedGrid`]-style cube
/// tiling.
///
/// [`NestedGrid`]: super::NestedGrid
pub struct NestedOctree {
    query_set: Vec<DVec3>,
    search_space: Vec<DVec3>,
    buffer_radius: f64,
    minimum_corner: DVec3,
    maximum_corner: DVec3,
    tree: Option<PartitionTree>,
}

struct BuildCtx<'a> {
    query_set: &'a [DVec3],
    search_space: &'a [DVec3],
    buffer_radius: f64,
    max_population: usize,
    minimum_factor: f64,
}

/// One occupied octant waiting to be built into a subtree.
struct OctantInput {
    q: Vec<u32>,
    s: Vec<u32>,
    minimum_corner: DVec3,
    maximum_corner: DVec3,
    grid: bool,
}

impl NestedOctree {
    /// Set the boundaries of the region to be partitioned: the exact bounding
    /// box of the query set, unpadded.
    ///
    /// Both clouds need at least 2 points; `buffer_radius` must be positive.
    pub fn new<P: Point3Like>(
        query_set: &[P],
        search_space: &[P],
        buffer_radius: f64,
    ) -> Result<Self, PartitionError> {
        let query = validate_cloud(query_set)?;
        let search = validate_cloud(search_space)?;
        if !buffer_radius.is_finite() || buffer_radius <= 0.0 {
            return Err(PartitionError::OutOfBounds(format!(
                "buffer radius must be positive, got {}",
                buffer_radius
            )));
        }

        let all: Vec<u32> = (0..query.len() as u32).collect();
        let (minimum_corner, maximum_corner) = subset_bounds(&query, &all);

        Ok(NestedOctree {
            query_set: query,
            search_space: search,
            buffer_radius,
            minimum_corner,
            maximum_corner,
            tree: None,
        })
    }

    /// Build the partition tree with the default minimum factor and the
    /// naive octant strategy.
    pub fn partition(&mut self, max_population: usize) -> Result<(), PartitionError> {
        self.partition_with(max_population, DEFAULT_MINIMUM_FACTOR, OctantStrategy::Naive)
    }

    /// Build the partition tree.
    ///
    /// A region whose octant edge exceeds `minimum_factor * buffer_radius`
    /// recurses; otherwise it is tiled by the grid strategy. Larger factors
    /// switch to the grid earlier.
    pub fn partition_with(
        &mut self,
        max_population: usize,
        minimum_factor: f64,
        strategy: OctantStrategy,
    ) -> Result<(), PartitionError> {
        match strategy {
            OctantStrategy::Naive => {}
            OctantStrategy::TakeOne => {
                return Err(PartitionError::Unimplemented("take_one octant strategy"))
            }
            OctantStrategy::TakeThree => {
                return Err(PartitionError::Unimplemented("take_three octant strategy"))
            }
        }
        if !minimum_factor.is_finite() || minimum_factor <= 0.0 {
            return Err(PartitionError::OutOfBounds(format!(
                "minimum factor must be positive, got {}",
                minimum_factor
            )));
        }

        let ctx = BuildCtx {
            query_set: &self.query_set,
            search_space: &self.search_space,
            buffer_radius: self.buffer_radius,
            max_population,
            minimum_factor,
        };
        let all_q: Vec<u32> = (0..self.query_set.len() as u32).collect();
        let all_s: Vec<u32> = (0..self.search_space.len() as u32).collect();
        let (nodes, root) = build_tree(&ctx, all_q, all_s);
        self.tree = Some(PartitionTree { nodes, root });
        Ok(())
    }

    /// Depth-first iterator over every leaf's
    /// `(query_indices, search_indices)` pair.
    ///
    /// Empty until [`partition`](Self::partition) has been called.
    pub fn partition_generator(&self) -> Partitions<'_> {
        match &self.tree {
            Some(tree) => tree.partitions(),
            None => Partitions::empty(),
        }
    }

    /// Bounding region of the query set.
    #[inline]
    pub fn bounds(&self) -> (DVec3, DVec3) {
        (self.minimum_corner, self.maximum_corner)
    }

    pub(crate) fn tree(&self) -> Option<&PartitionTree> {
        self.tree.as_ref()
    }
}

/// Build the subtree for one region, returning a private arena and the index
/// of its root node.
///
/// The region is the bounding box of `q_subset`; `s_subset` must contain at
/// least every search point within the buffer radius of that box.
fn build_tree(ctx: &BuildCtx<'_>, q_subset: Vec<u32>, s_subset: Vec<u32>) -> (Vec<PartitionNode>, u32) {
    let (low, high) = subset_bounds(ctx.query_set, &q_subset);
    let search_local = subset_indices(
        ctx.search_space,
        &s_subset,
        low - ctx.buffer_radius,
        high + ctx.buffer_radius,
    );

    // If the population is low enough in the extant bounding box, we're done.
    if search_local.len() <= ctx.max_population {
        return (
            vec![PartitionNode::Leaf(Partition {
                query_indices: q_subset,
                search_indices: search_local,
            })],
            0,
        );
    }

    // Octant edge: half the longest side of the bounding box.
    let edge = (high - low).max_element() * 0.5;
    if !(edge > 0.0) {
        // All query points coincide; octants cannot separate them. Hand the
        // degenerate region to the grid strategy.
        let cells = build_cells(
            ctx.query_set,
            ctx.search_space,
            ctx.buffer_radius,
            ctx.max_population,
            low,
            high,
            &q_subset,
            &search_local,
        );
        return (vec![PartitionNode::Grid { cells }], 0);
    }
    let center = low + DVec3::splat(edge);

    // Assign each query point to exactly one octant (half-open split at the
    // center plane, so boundary points are never duplicated).
    let mut octant_queries: [Vec<u32>; 8] = Default::default();
    for &qi in &q_subset {
        let p = ctx.query_set[qi as usize];
        let octant = (p.x >= center.x) as usize
            | (((p.y >= center.y) as usize) << 1)
            | (((p.z >= center.z) as usize) << 2);
        octant_queries[octant].push(qi);
    }

    let mut octants = Vec::with_capacity(8);
    for (octant, q) in octant_queries.into_iter().enumerate() {
        // No partition is emitted for an octant without query points.
        if q.is_empty() {
            continue;
        }
        let offset = DVec3::new(
            (octant & 1) as f64,
            ((octant >> 1) & 1) as f64,
            ((octant >> 2) & 1) as f64,
        ) * edge;
        let cube_low = low + offset;
        let cube_high = cube_low + edge;
        let s = subset_indices(
            ctx.search_space,
            &search_local,
            cube_low - ctx.buffer_radius,
            cube_high + ctx.buffer_radius,
        );
        octants.push(OctantInput {
            q,
            s,
            minimum_corner: cube_low,
            maximum_corner: cube_high,
            grid: edge <= ctx.minimum_factor * ctx.buffer_radius,
        });
    }

    // Octant subtrees read shared immutable inputs and write disjoint
    // outputs, so they can build independently.
    let built: Vec<(Vec<PartitionNode>, u32)> = maybe_par_into_iter!(octants)
        .map(|input| {
            if input.grid {
                let cells = build_cells(
                    ctx.query_set,
                    ctx.search_space,
                    ctx.buffer_radius,
                    ctx.max_population,
                    input.minimum_corner,
                    input.maximum_corner,
                    &input.q,
                    &input.s,
                );
                (vec![PartitionNode::Grid { cells }], 0)
            } else {
                build_tree(ctx, input.q, input.s)
            }
        })
        .collect();

    // Splice the child arenas into one, remapping child indices.
    let total: usize = built.iter().map(|(nodes, _)| nodes.len()).sum();
    let mut nodes = Vec::with_capacity(total + 1);
    let mut children = Vec::with_capacity(built.len());
    for (sub_nodes, sub_root) in built {
        let offset = nodes.len() as u32;
        for mut node in sub_nodes {
            if let PartitionNode::Octree { children } = &mut node {
                for child in children.iter_mut() {
                    *child += offset;
                }
            }
            nodes.push(node);
        }
        children.push(sub_root + offset);
    }
    nodes.push(PartitionNode::Octree { children });
    let root = (nodes.len() - 1) as u32;
    (nodes, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_leaf_when_population_fits() {
        let query = [[0.0, 0.0, 0.0], [4.0, 4.0, 4.0], [2.0, 1.0, 3.0]];
        let search = [[1.0, 1.0, 1.0], [3.0, 3.0, 3.0], [90.0, 90.0, 90.0]];
        let mut octree = NestedOctree::new(&query, &search, 1.0).unwrap();
        octree.partition(100).unwrap();

        let partitions: Vec<_> = octree.partition_generator().collect();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].query_indices, vec![0, 1, 2]);
        // The far search point is outside the buffered bounding box.
        assert_eq!(partitions[0].search_indices, vec![0, 1]);
    }

    #[test]
    fn test_generator_empty_before_partition() {
        let query = [[0.0, 0.0, 0.0], [4.0, 4.0, 4.0]];
        let octree = NestedOctree::new(&query, &query, 1.0).unwrap();
        assert_eq!(octree.partition_generator().count(), 0);
    }

    #[test]
    fn test_constructor_validation() {
        let two = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let one = [[0.0, 0.0, 0.0]];

        assert!(matches!(
            NestedOctree::new(&one, &two, 1.0),
            Err(PartitionError::InsufficientPoints { got: 1, need: 2 })
        ));
        assert!(matches!(
            NestedOctree::new(&two, &one, 1.0),
            Err(PartitionError::InsufficientPoints { .. })
        ));
        assert!(matches!(
            NestedOctree::new(&two, &two, -1.0),
            Err(PartitionError::OutOfBounds(_))
        ));
        assert!(matches!(
            NestedOctree::new(&two, &two, 0.0),
            Err(PartitionError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_strategy_parsing_and_unimplemented() {
        assert_eq!(
            "naive".parse::<OctantStrategy>().unwrap(),
            OctantStrategy::Naive
        );
        assert!(matches!(
            "take_one".parse::<OctantStrategy>(),
            Ok(OctantStrategy::TakeOne)
        ));
        assert!(matches!(
            "quadratic".parse::<OctantStrategy>(),
            Err(PartitionError::UnknownAlgorithm(_))
        ));

        let two = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let mut octree = NestedOctree::new(&two, &two, 0.5).unwrap();
        assert!(matches!(
            octree.partition_with(10, 3.0, OctantStrategy::TakeOne),
            Err(PartitionError::Unimplemented(_))
        ));
        assert!(matches!(
            octree.partition_with(10, 3.0, OctantStrategy::TakeThree),
            Err(PartitionError::Unimplemented(_))
        ));
    }

    #[test]
    fn test_coincident_queries_fall_back_to_grid() {
        // More coincident search points than the cap: subdivision can never
        // separate them, and the degenerate-region path must still terminate.
        let query = vec![[1.0, 1.0, 1.0]; 4];
        let search = vec![[1.0, 1.0, 1.0]; 10];
        let mut octree = NestedOctree::new(&query, &search, 0.5).unwrap();
        octree.partition(3).unwrap();

        let total_queries: usize = octree
            .partition_generator()
            .map(|p| p.query_len())
            .sum();
        assert_eq!(total_queries, 4);
    }
}
