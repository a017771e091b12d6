//! Experimental agglomerative partitioner.
//!
//! Instead of subdividing top-down, this strategy voxelizes both clouds at
//! the buffer radius and grows clusters of face-adjacent query cells, adding
//! cells as long as the union of their buffered search populations stays
//! under the cap. With the voxel edge equal to the buffer radius, the 3x3x3
//! neighborhood of a cell is exactly its buffered search neighborhood.
//!
//! No guarantee is made that clusters are convex (or even pleasantly shaped);
//! each query cell is assigned to exactly one cluster, but that is all.
//! Treat this as experimental and validate the output for your distribution,
//! e.g. with [`crate::validation`]'s coverage checks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};

use super::grid::validate_cloud;
use crate::error::PartitionError;
use crate::types::{Partition, Point3Like};
use crate::voxel::VoxelFilter;

/// Default number of random candidate cells tried per growth round.
pub const DEFAULT_NUM_TRIES: usize = 5;

const DEFAULT_SEED: u64 = 0x9e3779b97f4a7c15;

/// Iterative cell-agglomeration partitioner.
///
/// Implements [`Iterator`]: each call to `next` grows and emits one cluster.
/// A cluster whose very first cell already exceeds `max_population` on its
/// own is emitted as a single-cell partition over the cap; the caller decides
/// what to do with it. This is the only case where a partition's search
/// population may exceed the cap.
pub struct ProceduralNestedPartitioner {
    filter: VoxelFilter<3>,
    query_cells: FxHashMap<u64, Vec<u32>>,
    search_cells: FxHashMap<u64, Vec<u32>>,
    /// Query cell addresses not yet emitted; lazily pruned as growth steals
    /// cells out of `query_cells`.
    unassigned: Vec<u64>,
    max_population: usize,
    num_tries: usize,
    rng: ChaCha8Rng,
}

impl ProceduralNestedPartitioner {
    /// Build the voxel space (edge length = `buffer_radius`) over both
    /// clouds and index them by cell.
    ///
    /// Fails with
    /// [`UnaddressableRegion`](PartitionError::UnaddressableRegion) when the
    /// buffer radius is too fine to address the combined extent in 64 bits.
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

        let combined: Vec<[f64; 3]> = query
            .iter()
            .chain(search.iter())
            .map(|p| p.to_array())
            .collect();
        let filter = VoxelFilter::new(&combined, buffer_radius)?;

        let query_addresses = filter.encode(&combined[..query.len()])?;
        let search_addresses = filter.encode(&combined[query.len()..])?;

        let mut query_cells: FxHashMap<u64, Vec<u32>> = FxHashMap::default();
        for (i, &address) in query_addresses.iter().enumerate() {
            query_cells.entry(address).or_default().push(i as u32);
        }
        let mut search_cells: FxHashMap<u64, Vec<u32>> = FxHashMap::default();
        for (i, &address) in search_addresses.iter().enumerate() {
            search_cells.entry(address).or_default().push(i as u32);
        }

        let mut unassigned: Vec<u64> = query_cells.keys().copied().collect();
        unassigned.sort_unstable();

        Ok(ProceduralNestedPartitioner {
            filter,
            query_cells,
            search_cells,
            unassigned,
            max_population,
            num_tries: DEFAULT_NUM_TRIES,
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
        })
    }

    /// Number of random candidate cells tried per growth round (default 5).
    pub fn with_num_tries(mut self, num_tries: usize) -> Self {
        self.num_tries = num_tries.max(1);
        self
    }

    /// Reseed the random cell choice for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Consume the partitioner, iterating over the clusters it creates.
    pub fn partition_generator(self) -> impl Iterator<Item = Partition> {
        self
    }

    /// A cell plus all 26 adjacent cells.
    fn neighborhood(&self, address: u64) -> Vec<u64> {
        let mut cells = self.filter.neighbors(address, false);
        cells.push(address);
        cells
    }

    /// Search-space population of a single cell.
    #[inline]
    fn cell_population(&self, address: u64) -> usize {
        self.search_cells.get(&address).map_or(0, |v| v.len())
    }

    /// Pick a random not-yet-assigned query cell.
    fn pick_seed(&mut self) -> Option<u64> {
        loop {
            if self.unassigned.is_empty() {
                return None;
            }
            let i = self.rng.gen_range(0..self.unassigned.len());
            let address = self.unassigned.swap_remove(i);
            // Cells absorbed by earlier clusters stay in the pool until
            // drawn; skip them here.
            if self.query_cells.contains_key(&address) {
                return Some(address);
            }
        }
    }

    /// Pop the accepted cells and assemble their partition.
    fn emit(&mut self, accepted: &[u64], search_set: FxHashSet<u64>) -> Partition {
        let mut query_indices = Vec::new();
        for address in accepted {
            if let Some(mut indices) = self.query_cells.remove(address) {
                query_indices.append(&mut indices);
            }
        }
        query_indices.sort_unstable();

        let mut addresses: Vec<u64> = search_set.into_iter().collect();
        addresses.sort_unstable();
        let mut search_indices = Vec::new();
        for address in addresses {
            if let Some(indices) = self.search_cells.get(&address) {
                search_indices.extend_from_slice(indices);
            }
        }
        search_indices.sort_unstable();

        Partition {
            query_indices,
            search_indices,
        }
    }
}

impl Iterator for ProceduralNestedPartitioner {
    type Item = Partition;

    fn next(&mut self) -> Option<Self::Item> {
        let seed = self.pick_seed()?;

        let mut search_set: FxHashSet<u64> = self.neighborhood(seed).into_iter().collect();
        let mut population: usize = search_set.iter().map(|&a| self.cell_population(a)).sum();

        let mut accepted = vec![seed];
        let mut accepted_set: FxHashSet<u64> = FxHashSet::default();
        accepted_set.insert(seed);

        if population > self.max_population {
            // Over the cap on its own; yield it and let the caller decide.
            return Some(self.emit(&accepted, search_set));
        }

        let mut rejected: FxHashSet<u64> = FxHashSet::default();
        let mut potential: Vec<u64> = Vec::new();
        let mut potential_set: FxHashSet<u64> = FxHashSet::default();
        let mut last_added = seed;

        loop {
            // Face neighbors of the last accepted cell become candidates.
            for neighbor in self.filter.neighbors(last_added, true) {
                if self.query_cells.contains_key(&neighbor)
                    && !accepted_set.contains(&neighbor)
                    && !rejected.contains(&neighbor)
                    && potential_set.insert(neighbor)
                {
                    potential.push(neighbor);
                }
            }
            // A round that contributes no candidates finishes the cluster.
            if potential.is_empty() {
                break;
            }

            let mut grew = false;
            for _ in 0..self.num_tries {
                if potential.is_empty() {
                    break;
                }
                let i = self.rng.gen_range(0..potential.len());
                let candidate = potential.swap_remove(i);
                potential_set.remove(&candidate);

                let new_cells: Vec<u64> = self
                    .neighborhood(candidate)
                    .into_iter()
                    .filter(|a| !search_set.contains(a))
                    .collect();
                let added: usize = new_cells.iter().map(|&a| self.cell_population(a)).sum();

                if population + added > self.max_population {
                    rejected.insert(candidate);
                } else {
                    search_set.extend(new_cells);
                    population += added;
                    accepted.push(candidate);
                    accepted_set.insert(candidate);
                    last_added = candidate;
                    grew = true;
                    break;
                }
            }
            if !grew {
                break;
            }
        }

        Some(self.emit(&accepted, search_set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cloud() -> Vec<[f64; 3]> {
        (0..30)
            .map(|i| {
                let f = i as f64;
                [f % 5.0, (f / 5.0).floor() % 3.0, (f / 15.0).floor() * 2.0]
            })
            .collect()
    }

    #[test]
    fn test_every_query_point_assigned_once() {
        let query = small_cloud();
        let search = small_cloud();
        let partitioner =
            ProceduralNestedPartitioner::new(&query, &search, 1.0, 20).unwrap().with_seed(7);

        let mut seen = vec![0usize; query.len()];
        for partition in partitioner.partition_generator() {
            assert!(!partition.query_indices.is_empty());
            for &qi in &partition.query_indices {
                seen[qi as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_generous_cap_respected() {
        let query = small_cloud();
        let search = small_cloud();
        // The cap exceeds the whole search space, so even a lone cell's
        // neighborhood fits and every cluster must respect the bound.
        let cap = search.len();
        let partitioner =
            ProceduralNestedPartitioner::new(&query, &search, 1.0, cap).unwrap().with_seed(3);
        for partition in partitioner {
            assert!(partition.search_len() <= cap);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let query = small_cloud();
        let search = small_cloud();
        let run = |seed| -> Vec<Partition> {
            ProceduralNestedPartitioner::new(&query, &search, 1.0, 12)
                .unwrap()
                .with_seed(seed)
                .collect()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_rejects_bad_input() {
        let two = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        assert!(matches!(
            ProceduralNestedPartitioner::new(&two, &two, 0.0, 5),
            Err(PartitionError::OutOfBounds(_))
        ));
    }
}
