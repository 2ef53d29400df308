use std::cmp::Ordering;

/// A single directed bond between a query point and one of its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeighborBond {
    /// index of the query point
    pub query_point_id: usize,
    /// index of the neighbor in the set of points of the neighbor query
    pub point_id: usize,
    /// distance between the query point and the neighbor, accounting for
    /// periodic boundary conditions
    pub distance: f64,
    /// weight of this bond, used by consumers accumulating over bonds
    pub weight: f64,
}

impl NeighborBond {
    /// Create a new bond with unit weight
    pub fn new(query_point_id: usize, point_id: usize, distance: f64) -> NeighborBond {
        NeighborBond {
            query_point_id: query_point_id,
            point_id: point_id,
            distance: distance,
            weight: 1.0,
        }
    }

    /// Ordering used to store bonds in a `NeighborList`: first by query point,
    /// then by distance, then by point index.
    pub fn storage_order(&self, other: &NeighborBond) -> Ordering {
        self.query_point_id.cmp(&other.query_point_id)
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| self.point_id.cmp(&other.point_id))
    }

    /// Ordering by distance only, used by k-nearest queries
    pub(crate) fn distance_order(&self, other: &NeighborBond) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_order() {
        let mut bonds = vec![
            NeighborBond::new(1, 0, 0.5),
            NeighborBond::new(0, 3, 1.5),
            NeighborBond::new(1, 2, 0.2),
            NeighborBond::new(0, 1, 1.5),
            NeighborBond::new(0, 2, 0.7),
        ];

        bonds.sort_by(NeighborBond::storage_order);

        let order = bonds.iter()
            .map(|bond| (bond.query_point_id, bond.point_id))
            .collect::<Vec<_>>();
        assert_eq!(order, [(0, 2), (0, 1), (0, 3), (1, 2), (1, 0)]);
        assert!(bonds.iter().all(|bond| bond.weight == 1.0));
    }
}
