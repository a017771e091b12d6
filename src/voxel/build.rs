//! Construction of the voxel grid: bounds, bit widths, shifts, and masks.

use super::{VoxelFilter, MAX_ADDRESS_LENGTH};
use crate::error::PartitionError;

/// Contiguous run of `width` low one-bits.
#[inline]
fn bit_run(width: u32) -> u64 {
    if width == 0 {
        0
    } else {
        u64::MAX >> (64 - width)
    }
}

impl<const N: usize> VoxelFilter<N> {
    /// Define a voxel grid of spacing `edge_length` enclosing `points`.
    ///
    /// The grid bounds are padded by half an edge length beyond the cloud's
    /// extent on every axis, so every input point lands strictly inside the
    /// region. Each axis is assigned `ceil(log2(span / edge_length))` address
    /// bits; construction fails with
    /// [`UnaddressableRegion`](PartitionError::UnaddressableRegion) if the
    /// total exceeds 64.
    pub fn new(points: &[[f64; N]], edge_length: f64) -> Result<Self, PartitionError> {
        if N != 2 && N != 3 {
            return Err(PartitionError::DimensionMismatch(N));
        }
        if points.len() < 2 {
            return Err(PartitionError::InsufficientPoints {
                got: points.len(),
                need: 2,
            });
        }
        if !edge_length.is_finite() || edge_length <= 0.0 {
            return Err(PartitionError::OutOfBounds(format!(
                "edge length must be positive and finite, got {}",
                edge_length
            )));
        }

        let mut minimum_corner = [f64::INFINITY; N];
        let mut maximum_corner = [f64::NEG_INFINITY; N];
        for p in points {
            for k in 0..N {
                minimum_corner[k] = minimum_corner[k].min(p[k]);
                maximum_corner[k] = maximum_corner[k].max(p[k]);
            }
        }
        for k in 0..N {
            minimum_corner[k] -= edge_length / 2.0;
            maximum_corner[k] += edge_length / 2.0;
        }

        // Address bits per axis, then check the total budget before
        // committing to shifts and masks.
        let mut widths = [0u32; N];
        let mut total_bits = 0u32;
        for k in 0..N {
            let span = maximum_corner[k] - minimum_corner[k];
            widths[k] = (span / edge_length).log2().ceil().max(0.0) as u32;
            total_bits += widths[k];
        }
        if total_bits > MAX_ADDRESS_LENGTH {
            return Err(PartitionError::UnaddressableRegion { bits: total_bits });
        }

        // Exclusive prefix sum: axis 0 occupies the low bits.
        let mut shifts = [0u32; N];
        for k in 1..N {
            shifts[k] = shifts[k - 1] + widths[k - 1];
        }

        let mut masks = [0u64; N];
        for k in 0..N {
            masks[k] = bit_run(widths[k]) << shifts[k];
        }

        Ok(VoxelFilter {
            minimum_corner,
            maximum_corner,
            edge_length,
            widths,
            shifts,
            masks,
        })
    }
}
