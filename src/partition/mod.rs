//! Nested partitioning of co-located point clouds.
//!
//! Given a query set and a search space, the partitioners here split both
//! simultaneously: query partitions enclose all query points without overlap,
//! while each paired search partition extends past the query partition's
//! bounds by a fixed buffer radius and is capped in population. Downstream
//! proximity stages then process each pair independently instead of the full
//! cross-product of both clouds.
//!
//! Three strategies:
//! - [`NestedOctree`]: recursive octant subdivision, handing small regions to
//!   the grid strategy (the default, via [`crate::partition`]).
//! - [`NestedGrid`]: uniform cube tiling with a shrinking edge length.
//! - [`ProceduralNestedPartitioner`]: experimental cell-agglomeration over a
//!   voxel grid.

pub(crate) mod grid;
pub(crate) mod octree;
pub(crate) mod procedural;
pub(crate) mod region;

pub use grid::NestedGrid;
pub use octree::{NestedOctree, OctantStrategy};
pub use procedural::ProceduralNestedPartitioner;
pub use region::nested_regions;

use crate::types::Partition;

/// Node of a built partition tree.
///
/// Children are arena indices rather than boxed pointers, so subtrees built
/// independently (possibly in parallel) can be spliced together and traversal
/// needs no unsafe or recursion.
#[derive(Debug, Clone)]
pub(crate) enum PartitionNode {
    /// Internal node: up to 8 occupied octants.
    Octree { children: Vec<u32> },
    /// Terminal grid node: one partition per occupied grid cube.
    Grid { cells: Vec<Partition> },
    /// Terminal node holding a single partition.
    Leaf(Partition),
}

/// Arena-backed tree of partition nodes.
#[derive(Debug, Clone)]
pub(crate) struct PartitionTree {
    pub(crate) nodes: Vec<PartitionNode>,
    pub(crate) root: u32,
}

impl PartitionTree {
    /// Depth-first iterator over every leaf partition.
    pub(crate) fn partitions(&self) -> Partitions<'_> {
        Partitions {
            nodes: &self.nodes,
            stack: vec![Cursor::Node(self.root)],
        }
    }

    /// Height of the tree; a lone leaf has depth 1.
    pub(crate) fn depth(&self) -> usize {
        self.depth_of(self.root)
    }

    fn depth_of(&self, node: u32) -> usize {
        match &self.nodes[node as usize] {
            PartitionNode::Leaf(_) | PartitionNode::Grid { .. } => 1,
            PartitionNode::Octree { children } => {
                1 + children
                    .iter()
                    .map(|&c| self.depth_of(c))
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

enum Cursor<'a> {
    Node(u32),
    Cells(std::slice::Iter<'a, Partition>),
}

/// Depth-first iterator over the partitions of a built tree.
///
/// Yields every leaf's `(query_indices, search_indices)` pair in a fixed
/// order, exhausts after the last leaf, and is restartable only by asking the
/// partitioner for a fresh iterator.
pub struct Partitions<'a> {
    nodes: &'a [PartitionNode],
    stack: Vec<Cursor<'a>>,
}

impl<'a> Partitions<'a> {
    /// Iterator over nothing; used before a tree has been built.
    pub(crate) fn empty() -> Self {
        Partitions {
            nodes: &[],
            stack: Vec::new(),
        }
    }
}

impl<'a> Iterator for Partitions<'a> {
    type Item = &'a Partition;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Cursor::Cells(mut iter) => {
                    if let Some(cell) = iter.next() {
                        self.stack.push(Cursor::Cells(iter));
                        return Some(cell);
                    }
                }
                Cursor::Node(id) => match &self.nodes[id as usize] {
                    PartitionNode::Leaf(partition) => return Some(partition),
                    PartitionNode::Grid { cells } => {
                        self.stack.push(Cursor::Cells(cells.iter()));
                    }
                    PartitionNode::Octree { children } => {
                        for &child in children.iter().rev() {
                            self.stack.push(Cursor::Node(child));
                        }
                    }
                },
            }
        }
    }
}
