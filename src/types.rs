//! Core types for nested partitioning.

use glam::DVec3;

/// One unit of work produced by a partitioner: the indices of all query-set
/// points inside a region, paired with the indices of all search-space points
/// inside the same region expanded by the buffer radius.
///
/// Indices refer to the original input arrays; no point data is copied.
/// Query index sets are disjoint across the partitions of one run; search
/// index sets may overlap, since buffered neighborhoods of adjacent regions
/// intersect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Indices into the query set.
    pub query_indices: Vec<u32>,
    /// Indices into the search space.
    pub search_indices: Vec<u32>,
}

impl Partition {
    /// Number of query-set points in this partition.
    #[inline]
    pub fn query_len(&self) -> usize {
        self.query_indices.len()
    }

    /// Number of search-space points in this partition.
    #[inline]
    pub fn search_len(&self) -> usize {
        self.search_indices.len()
    }
}

/// Trait for types that can be used as 3D input points.
///
/// This allows zero-copy input from various math libraries.
pub trait Point3Like {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn z(&self) -> f64;

    #[inline]
    fn to_dvec3(&self) -> DVec3 {
        DVec3::new(self.x(), self.y(), self.z())
    }
}

impl Point3Like for DVec3 {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
    #[inline]
    fn z(&self) -> f64 {
        self.z
    }
}

impl Point3Like for [f64; 3] {
    #[inline]
    fn x(&self) -> f64 {
        self[0]
    }
    #[inline]
    fn y(&self) -> f64 {
        self[1]
    }
    #[inline]
    fn z(&self) -> f64 {
        self[2]
    }
}

impl Point3Like for (f64, f64, f64) {
    #[inline]
    fn x(&self) -> f64 {
        self.0
    }
    #[inline]
    fn y(&self) -> f64 {
        self.1
    }
    #[inline]
    fn z(&self) -> f64 {
        self.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point3_like_trait() {
        fn accepts_like<P: Point3Like>(p: &P) -> f64 {
            p.x() + p.y() + p.z()
        }

        let v = DVec3::new(1.0, 2.0, 3.0);
        let arr = [1.0f64, 2.0, 3.0];
        let tuple = (1.0f64, 2.0f64, 3.0f64);

        assert_eq!(accepts_like(&v), 6.0);
        assert_eq!(accepts_like(&arr), 6.0);
        assert_eq!(accepts_like(&tuple), 6.0);
        assert_eq!(arr.to_dvec3(), v);
    }

    #[test]
    fn test_partition_lens() {
        let p = Partition {
            query_indices: vec![0, 1, 2],
            search_indices: vec![4],
        };
        assert_eq!(p.query_len(), 3);
        assert_eq!(p.search_len(), 1);
    }
}
