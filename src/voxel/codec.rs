//! Conversion between point coordinates and packed voxel addresses.

use rustc_hash::FxHashSet;

use super::VoxelFilter;
use crate::error::PartitionError;

impl<const N: usize> VoxelFilter<N> {
    /// Confirm that every point lies within the grid bounds.
    fn check_in_bounds(&self, points: &[[f64; N]]) -> Result<(), PartitionError> {
        for (i, p) in points.iter().enumerate() {
            for k in 0..N {
                if !(p[k] >= self.minimum_corner[k] && p[k] <= self.maximum_corner[k]) {
                    return Err(PartitionError::OutOfBounds(format!(
                        "point {} falls outside the grid bounding region on axis {}",
                        i, k
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn encode_one(&self, point: &[f64; N]) -> u64 {
        let mut address = 0u64;
        for k in 0..N {
            let g = ((point[k] - self.minimum_corner[k]) / self.edge_length).floor() as u64;
            // A point in the outer half-cell at the maximum corner lands in
            // the last cell rather than spilling into the next axis' bits.
            let g = g.min(self.max_coordinate(k));
            address |= g << self.shifts[k];
        }
        address
    }

    /// Transform real-world coordinates into packed voxel addresses.
    ///
    /// Fails with [`OutOfBounds`](PartitionError::OutOfBounds) if any point
    /// lies outside the grid's bounding region.
    pub fn encode(&self, points: &[[f64; N]]) -> Result<Vec<u64>, PartitionError> {
        self.check_in_bounds(points)?;
        Ok(points.iter().map(|p| self.encode_one(p)).collect())
    }

    /// Transform packed voxel addresses into real-world coordinates.
    ///
    /// Returns the center of each addressed cell (half an edge length past
    /// the cell's minimum corner on every axis).
    pub fn decode(&self, addresses: &[u64]) -> Vec<[f64; N]> {
        addresses
            .iter()
            .map(|&address| {
                let mut point = [0.0; N];
                for k in 0..N {
                    let g = (address & self.masks[k]) >> self.shifts[k];
                    point[k] = g as f64 * self.edge_length
                        + self.minimum_corner[k]
                        + self.edge_length * 0.5;
                }
                point
            })
            .collect()
    }

    /// Center coordinates of all distinct grid cells occupied by `points`.
    pub fn unique_voxels(&self, points: &[[f64; N]]) -> Result<Vec<[f64; N]>, PartitionError> {
        let addresses = self.encode(points)?;
        let unique: FxHashSet<u64> = addresses.into_iter().collect();
        let mut unique: Vec<u64> = unique.into_iter().collect();
        unique.sort_unstable();
        Ok(self.decode(&unique))
    }
}
