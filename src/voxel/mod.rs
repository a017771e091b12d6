//! Bit-packed voxel addressing over a uniform grid.
//!
//! A [`VoxelFilter`] defines a cubic grid of a given edge length enclosing a
//! 2D or 3D point cloud, and converts point coordinates (within the enclosed
//! region) into 64-bit integer addresses and back. Each axis gets a fixed run
//! of address bits, sized to the region's extent; the per-axis grid
//! coordinates are packed side by side into one `u64`.
//!
//! Decoding returns the *center* of the addressed cell, never the original
//! point: exact for cell identity, lossy for sub-cell position.

mod build;
mod codec;

/// Total address budget in bits.
pub const MAX_ADDRESS_LENGTH: u32 = 64;

/// Uniform voxel grid over a 2D or 3D bounding region, with bit-packed
/// integer cell addresses.
///
/// Stateless after construction; all operations borrow `self` immutably.
#[derive(Debug, Clone)]
pub struct VoxelFilter<const N: usize> {
    /// Per-axis lower bound, padded half an edge length below the cloud.
    minimum_corner: [f64; N],
    /// Per-axis upper bound, padded half an edge length above the cloud.
    maximum_corner: [f64; N],
    edge_length: f64,
    /// Address bits assigned to each axis. Sums to at most 64.
    widths: [u32; N],
    /// Exclusive prefix sum of `widths`; axis 0 is unshifted.
    shifts: [u32; N],
    /// Contiguous run of `widths[i]` one-bits, left-shifted by `shifts[i]`.
    /// Masks are pairwise disjoint.
    masks: [u64; N],
}

impl<const N: usize> VoxelFilter<N> {
    /// Per-axis lower bound of the addressable region.
    #[inline]
    pub fn minimum_corner(&self) -> [f64; N] {
        self.minimum_corner
    }

    /// Per-axis upper bound of the addressable region.
    #[inline]
    pub fn maximum_corner(&self) -> [f64; N] {
        self.maximum_corner
    }

    /// Spacing between adjacent voxel centers along one axis.
    #[inline]
    pub fn edge_length(&self) -> f64 {
        self.edge_length
    }

    /// Address bits assigned to each axis.
    #[inline]
    pub fn bit_widths(&self) -> [u32; N] {
        self.widths
    }

    /// Largest addressable grid coordinate along axis `k`.
    #[inline]
    fn max_coordinate(&self, k: usize) -> u64 {
        self.masks[k] >> self.shifts[k]
    }

    /// Addresses of voxels adjacent to `address`.
    ///
    /// With `facing_only = false`, every voxel differing by at most one cell
    /// on each axis is returned (up to 8 in 2D, 26 in 3D). With
    /// `facing_only = true`, only voxels sharing an edge (2D) or face (3D)
    /// are returned (up to 4 in 2D, 6 in 3D). Candidates that fall outside
    /// the addressable grid on any axis are excluded.
    pub fn neighbors(&self, address: u64, facing_only: bool) -> Vec<u64> {
        let mut coords = [0i64; N];
        for k in 0..N {
            coords[k] = ((address & self.masks[k]) >> self.shifts[k]) as i64;
        }

        let combinations = 3u32.pow(N as u32);
        let mut out = Vec::with_capacity(if facing_only {
            2 * N
        } else {
            combinations as usize - 1
        });

        'candidates: for code in 0..combinations {
            // Decompose the counter into per-axis offsets in {-1, 0, +1}.
            let mut offsets = [0i64; N];
            let mut rest = code;
            let mut nonzero = 0usize;
            for k in 0..N {
                offsets[k] = (rest % 3) as i64 - 1;
                rest /= 3;
                if offsets[k] != 0 {
                    nonzero += 1;
                }
            }

            if nonzero == 0 {
                continue;
            }
            if facing_only && nonzero != 1 {
                continue;
            }

            let mut neighbor = 0u64;
            for k in 0..N {
                let c = coords[k] + offsets[k];
                if c < 0 || c as u64 > self.max_coordinate(k) {
                    // Cell does not exist in the addressable grid.
                    continue 'candidates;
                }
                neighbor |= (c as u64) << self.shifts[k];
            }
            out.push(neighbor);
        }

        out
    }
}
