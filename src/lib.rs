//! Spatial partitioning of co-located point clouds for proximity queries.
//!
//! Given a "query" point cloud and a "search" point cloud sharing one
//! coordinate frame, this crate splits the query set into disjoint spatial
//! groups, each paired with the subset of search points within a fixed buffer
//! distance, such that no group's search subset exceeds a population cap.
//! Downstream stages (nearest-neighbor search, collision detection) can then
//! process each pair independently instead of the full cross-product.
//!
//! Two building blocks are exposed alongside the partitioners:
//! [`VoxelFilter`], a bit-packed voxel addressing codec over a uniform grid,
//! and [`nested_regions`], the buffered joint region filter every
//! partitioning step relies on.
//!
//! # Example
//!
//! ```
//! use nested_partition::partition;
//!
//! let query = vec![
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [1.0, 1.0, 1.0],
//! ];
//! let search = vec![
//!     [0.5, 0.0, 0.0],
//!     [0.9, 1.0, 1.0],
//!     [50.0, 50.0, 50.0], // far away, never gathered
//! ];
//!
//! let output = partition(&query, &search, 0.5, 10).expect("partitioning should succeed");
//!
//! let covered: usize = output.partitions.iter().map(|p| p.query_len()).sum();
//! assert_eq!(covered, query.len());
//! for p in &output.partitions {
//!     assert!(p.search_len() <= 10);
//! }
//! ```

mod error;
mod types;
pub mod validation;

mod partition;
mod voxel;

pub use error::PartitionError;
pub use partition::{
    nested_regions, NestedGrid, NestedOctree, OctantStrategy, Partitions,
    ProceduralNestedPartitioner,
};
pub use types::{Partition, Point3Like};
pub use voxel::{VoxelFilter, MAX_ADDRESS_LENGTH};

use partition::octree::DEFAULT_MINIMUM_FACTOR;
use partition::PartitionNode;

/// Configuration for a partitioning run.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Maximum search-space population per partition.
    pub max_population: usize,
    /// Ratio between octant edge length and buffer radius below which a
    /// region is tiled by the grid strategy instead of recursing.
    pub minimum_factor: f64,
    /// Octant-candidate algorithm (only the naive one is implemented).
    pub strategy: OctantStrategy,
}

impl PartitionConfig {
    /// Defaults for everything except the population cap, which has no
    /// sensible universal value.
    pub fn new(max_population: usize) -> Self {
        Self {
            max_population,
            minimum_factor: DEFAULT_MINIMUM_FACTOR,
            strategy: OctantStrategy::Naive,
        }
    }
}

/// Output from a partitioning run: the partitions plus shape diagnostics.
#[derive(Debug, Clone)]
pub struct PartitionOutput {
    /// The emitted partitions, in depth-first traversal order.
    pub partitions: Vec<Partition>,
    /// Diagnostic information about the partition tree.
    pub diagnostics: PartitionDiagnostics,
}

/// Diagnostic information about a partition tree.
#[derive(Debug, Clone, Default)]
pub struct PartitionDiagnostics {
    /// Total partitions emitted.
    pub num_partitions: usize,
    /// Partitions emitted by octree leaves.
    pub num_octree_leaves: usize,
    /// Partitions emitted by grid cells.
    pub num_grid_cells: usize,
    /// Largest search population in any partition.
    pub max_search_population: usize,
    /// Height of the partition tree; 1 means the root was already a leaf.
    pub tree_depth: usize,
}

/// Partition two clouds with the default minimum factor and octant strategy.
///
/// Convenience wrapper over [`NestedOctree`]; see [`partition_with`] for
/// knobs.
pub fn partition<P: Point3Like>(
    query_set: &[P],
    search_space: &[P],
    buffer_radius: f64,
    max_population: usize,
) -> Result<PartitionOutput, PartitionError> {
    partition_with(
        query_set,
        search_space,
        buffer_radius,
        PartitionConfig::new(max_population),
    )
}

/// Partition two clouds with explicit configuration.
pub fn partition_with<P: Point3Like>(
    query_set: &[P],
    search_space: &[P],
    buffer_radius: f64,
    config: PartitionConfig,
) -> Result<PartitionOutput, PartitionError> {
    let mut octree = NestedOctree::new(query_set, search_space, buffer_radius)?;
    octree.partition_with(config.max_population, config.minimum_factor, config.strategy)?;

    let partitions: Vec<Partition> = octree.partition_generator().cloned().collect();

    let mut diagnostics = PartitionDiagnostics {
        num_partitions: partitions.len(),
        max_search_population: partitions.iter().map(|p| p.search_len()).max().unwrap_or(0),
        ..PartitionDiagnostics::default()
    };
    if let Some(tree) = octree.tree() {
        diagnostics.tree_depth = tree.depth();
        for node in &tree.nodes {
            match node {
                PartitionNode::Leaf(_) => diagnostics.num_octree_leaves += 1,
                PartitionNode::Grid { cells } => diagnostics.num_grid_cells += cells.len(),
                PartitionNode::Octree { .. } => {}
            }
        }
    }

    Ok(PartitionOutput {
        partitions,
        diagnostics,
    })
}
