//! Error types for voxel addressing and nested partitioning.

use std::fmt;

/// Errors that can occur while building a voxel grid or partitioning point clouds.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionError {
    /// Not enough points to define a grid or a partition region.
    /// All constructors need at least 2 points.
    InsufficientPoints { got: usize, need: usize },

    /// Point clouds must be 2D or 3D.
    DimensionMismatch(usize),

    /// The requested edge length is too fine: addressing the bounding region
    /// would take more than 64 bits in total.
    UnaddressableRegion { bits: u32 },

    /// A point falls outside an established grid's bounds, or a scalar
    /// parameter (buffer radius, edge length, minimum factor) is outside its
    /// valid range.
    OutOfBounds(String),

    /// An octant-candidate strategy name that this crate does not recognize.
    UnknownAlgorithm(String),

    /// An acknowledged-incomplete code path was invoked before being supplied.
    Unimplemented(&'static str),
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionError::InsufficientPoints { got, need } => {
                write!(f, "insufficient points: need at least {}, got {}", need, got)
            }
            PartitionError::DimensionMismatch(dim) => {
                write!(f, "only 2D and 3D point clouds are supported, got {}D", dim)
            }
            PartitionError::UnaddressableRegion { bits } => {
                write!(
                    f,
                    "edge length is too small to address this region: needs {} bits, have 64",
                    bits
                )
            }
            PartitionError::OutOfBounds(msg) => {
                write!(f, "out of bounds: {}", msg)
            }
            PartitionError::UnknownAlgorithm(name) => {
                write!(f, "{} is not a recognized octant strategy", name)
            }
            PartitionError::Unimplemented(what) => {
                write!(f, "{} has not been implemented yet", what)
            }
        }
    }
}

impl std::error::Error for PartitionError {}
