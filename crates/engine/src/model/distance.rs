//! Pairwise cluster distances over one specific coordinate set.

use crate::analysis::vecmath;
use crate::error::{EngineError, Result};
use crate::model::movie::ClusterId;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// A dense pairwise Euclidean distance table, never mutated after
/// construction.
///
/// Only the upper triangle is stored; lookups order the two indices so
/// `distance(i, j) == distance(j, i)` holds for all valid pairs and the
/// diagonal is zero.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    index_to_id: Vec<ClusterId>,
    id_to_index: HashMap<ClusterId, usize>,
    n: usize,
    table: Vec<f32>,
}

impl DistanceMatrix {
    /// Computes the full table for the given coordinate set.
    /// O(n^2 * k) time, O(n^2) space; rows are filled in parallel.
    pub fn compute(cluster_ids: &[ClusterId], coordinates: &[Vec<f32>]) -> Self {
        let n = cluster_ids.len();
        let start = Instant::now();
        let mut table = vec![0.0f32; n * n];
        table
            .par_chunks_mut(n.max(1))
            .enumerate()
            .take(n)
            .for_each(|(i, row)| {
                for j in (i + 1)..n {
                    row[j] = vecmath::norm2(&coordinates[i], &coordinates[j]);
                }
            });
        debug!(
            clusters = n,
            "distance matrix computed in {:?}",
            start.elapsed()
        );
        let id_to_index = cluster_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();
        Self {
            index_to_id: cluster_ids.to_vec(),
            id_to_index,
            n,
            table,
        }
    }

    pub fn num_clusters(&self) -> usize {
        self.n
    }

    pub fn cluster_id(&self, index: usize) -> ClusterId {
        self.index_to_id[index]
    }

    pub fn cluster_index(&self, id: ClusterId) -> Result<usize> {
        self.id_to_index
            .get(&id)
            .copied()
            .ok_or(EngineError::UnknownCluster(id))
    }

    /// Distance between two cluster indices (not ids)
    pub fn distance(&self, index1: usize, index2: usize) -> f32 {
        let (lo, hi) = (index1.min(index2), index1.max(index2));
        self.table[lo * self.n + hi]
    }

    /// Distance between two cluster ids. Prefer [`distance`] when indices
    /// are already at hand.
    ///
    /// [`distance`]: DistanceMatrix::distance
    pub fn distance_by_id(&self, id1: ClusterId, id2: ClusterId) -> Result<f32> {
        Ok(self.distance(self.cluster_index(id1)?, self.cluster_index(id2)?))
    }

    /// The submatrix over a subset of clusters. Distances are copied, so
    /// the restricted table carries exactly the same metric as the source.
    pub fn restrict(&self, cluster_ids: &[ClusterId]) -> Result<DistanceMatrix> {
        let indices = cluster_ids
            .iter()
            .map(|&id| self.cluster_index(id))
            .collect::<Result<Vec<_>>>()?;
        let n = indices.len();
        let mut table = vec![0.0f32; n * n];
        for (i, &src_i) in indices.iter().enumerate() {
            for (j, &src_j) in indices.iter().enumerate().skip(i + 1) {
                table[i * n + j] = self.distance(src_i, src_j);
            }
        }
        let id_to_index = cluster_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();
        Ok(DistanceMatrix {
            index_to_id: cluster_ids.to_vec(),
            id_to_index,
            n,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> DistanceMatrix {
        DistanceMatrix::compute(
            &[1, 2, 3],
            &[vec![0.0, 0.0], vec![3.0, 4.0], vec![6.0, 8.0]],
        )
    }

    #[test]
    fn test_known_distances() {
        let m = matrix();
        assert!((m.distance(0, 1) - 5.0).abs() < 1e-6);
        assert!((m.distance(1, 2) - 5.0).abs() < 1e-6);
        assert!((m.distance(0, 2) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry_and_zero_diagonal() {
        let m = matrix();
        for i in 0..m.num_clusters() {
            assert_eq!(m.distance(i, i), 0.0);
            for j in 0..m.num_clusters() {
                assert_eq!(m.distance(i, j), m.distance(j, i));
            }
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let m = matrix();
        assert!((m.distance_by_id(1, 3).unwrap() - 10.0).abs() < 1e-6);
        assert!(matches!(
            m.distance_by_id(1, 9),
            Err(EngineError::UnknownCluster(9))
        ));
    }

    #[test]
    fn test_restrict_keeps_metric() {
        let m = matrix();
        let local = m.restrict(&[3, 1]).unwrap();
        assert_eq!(local.num_clusters(), 2);
        assert_eq!(local.cluster_id(0), 3);
        assert!((local.distance_by_id(3, 1).unwrap() - 10.0).abs() < 1e-6);
        assert_eq!(local.distance(0, 0), 0.0);
    }

    #[test]
    fn test_restrict_unknown_id() {
        assert!(matrix().restrict(&[1, 42]).is_err());
    }
}
