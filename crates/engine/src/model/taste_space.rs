//! The taste space: one coordinate vector per movie cluster.

use crate::error::{EngineError, Result};
use crate::model::distance::DistanceMatrix;
use crate::model::movie::ClusterId;
use std::collections::HashMap;

/// An immutable set of (cluster id, coordinate) pairs with bidirectional
/// id <-> index lookup.
///
/// Invariants: all coordinate rows have the same length, indices are dense
/// `0..n`, and id-to-index is a bijection onto the indices.
#[derive(Debug, Clone)]
pub struct TasteSpace {
    index_to_id: Vec<ClusterId>,
    id_to_index: HashMap<ClusterId, usize>,
    coordinates: Vec<Vec<f32>>,
}

impl TasteSpace {
    pub fn new(cluster_ids: Vec<ClusterId>, coordinates: Vec<Vec<f32>>) -> Self {
        debug_assert_eq!(cluster_ids.len(), coordinates.len());
        let id_to_index = cluster_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();
        Self {
            index_to_id: cluster_ids,
            id_to_index,
            coordinates,
        }
    }

    pub fn coordinate(&self, index: usize) -> &[f32] {
        &self.coordinates[index]
    }

    pub fn coordinates(&self) -> &[Vec<f32>] {
        &self.coordinates
    }

    pub fn cluster_ids(&self) -> &[ClusterId] {
        &self.index_to_id
    }

    pub fn num_clusters(&self) -> usize {
        self.index_to_id.len()
    }

    /// Width of the embedding; zero for an empty space
    pub fn dimensions(&self) -> usize {
        self.coordinates.first().map_or(0, |row| row.len())
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

    /// Projects the space onto a subset of coordinate columns. Cluster ids
    /// and their order are preserved; only the selected columns survive, in
    /// the order given.
    pub fn subspace(&self, dimensions: &[usize]) -> TasteSpace {
        let projected = self
            .coordinates
            .iter()
            .map(|row| dimensions.iter().map(|&d| row[d]).collect())
            .collect();
        TasteSpace::new(self.index_to_id.clone(), projected)
    }

    /// Computes the pairwise distance table for the current coordinate set.
    ///
    /// This is the second phase of the two-phase construction: the space
    /// itself is cheap to build, the O(n^2 * k) table is built on demand and
    /// immutable once returned.
    pub fn compute_distances(&self) -> DistanceMatrix {
        DistanceMatrix::compute(&self.index_to_id, &self.coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> TasteSpace {
        TasteSpace::new(
            vec![10, 20, 30],
            vec![
                vec![1.0, 2.0, 3.0],
                vec![4.0, 5.0, 6.0],
                vec![7.0, 8.0, 9.0],
            ],
        )
    }

    #[test]
    fn test_index_id_round_trip() {
        let s = space();
        assert_eq!(s.num_clusters(), 3);
        assert_eq!(s.dimensions(), 3);
        for index in 0..s.num_clusters() {
            assert_eq!(s.cluster_index(s.cluster_id(index)).unwrap(), index);
        }
    }

    #[test]
    fn test_unknown_cluster() {
        assert!(matches!(
            space().cluster_index(99),
            Err(EngineError::UnknownCluster(99))
        ));
    }

    #[test]
    fn test_subspace_projects_columns() {
        let sub = space().subspace(&[2, 0]);
        assert_eq!(sub.cluster_ids(), &[10, 20, 30]);
        assert_eq!(sub.dimensions(), 2);
        assert_eq!(sub.coordinate(1), &[6.0, 4.0]);
    }

    #[test]
    fn test_subspace_identity_preserves_everything() {
        let s = space();
        let sub = s.subspace(&[0, 1, 2]).subspace(&[0, 1, 2]);
        assert_eq!(sub.cluster_ids(), s.cluster_ids());
        assert_eq!(sub.num_clusters(), s.num_clusters());
        for index in 0..s.num_clusters() {
            assert_eq!(sub.coordinate(index), s.coordinate(index));
        }
    }

    #[test]
    fn test_empty_space_dimensions() {
        let s = TasteSpace::new(vec![], vec![]);
        assert_eq!(s.dimensions(), 0);
        assert_eq!(s.num_clusters(), 0);
    }
}
