use std::iter::FusedIterator;

use ndarray::ArrayView2;
use once_cell::sync::OnceCell;

use crate::Error;
use super::NeighborBond;

/// Query point index of bonds created by [`NeighborList::zeros`] or
/// [`NeighborList::set_num_bonds`] that were not yet set. These bonds sort
/// after all others, and are rejected by [`NeighborList::validate`].
const UNSET_BOND: usize = usize::MAX;

/// Per query point offsets and bond counts, computed from the sorted
/// neighbors array.
#[derive(Debug, Clone)]
struct SegmentCounts {
    segments: Vec<usize>,
    counts: Vec<usize>,
}

/// A list of bonds between query points and points, sorted by query point.
///
/// The list is stored as parallel arrays: `neighbors` contains
/// `[query_point_id, point_id]` pairs, and `distances` and `weights` contain
/// the corresponding values for each bond. The first column of `neighbors`
/// is always sorted in increasing order, which allows to find all the bonds
/// associated with a given query point in `O(log n)`.
#[derive(Debug, Clone, Default)]
pub struct NeighborList {
    /// `[query_point_id, point_id]` for each bond
    neighbors: Vec<[usize; 2]>,
    /// distance of each bond
    distances: Vec<f64>,
    /// weight of each bond
    weights: Vec<f64>,
    /// number of points this list refers to
    num_points: usize,
    /// number of query points this list refers to
    num_query_points: usize,
    /// lazily computed segments and counts, reset by every mutation of the
    /// neighbors array
    segment_counts: OnceCell<SegmentCounts>,
}

impl PartialEq for NeighborList {
    fn eq(&self, other: &NeighborList) -> bool {
        self.num_points == other.num_points
            && self.num_query_points == other.num_query_points
            && self.neighbors == other.neighbors
            && self.distances == other.distances
            && self.weights == other.weights
    }
}

impl NeighborList {
    /// Create a new empty neighbor list
    pub fn new() -> NeighborList {
        NeighborList::default()
    }

    /// Create an empty neighbor list with storage reserved for `num_bonds`
    /// bonds, to be used with [`NeighborList::set_num_bonds`].
    pub fn with_capacity(num_bonds: usize) -> NeighborList {
        NeighborList {
            neighbors: Vec::with_capacity(num_bonds),
            distances: Vec::with_capacity(num_bonds),
            weights: Vec::with_capacity(num_bonds),
            num_points: 0,
            num_query_points: 0,
            segment_counts: OnceCell::new(),
        }
    }

    /// Create a neighbor list containing `num_bonds` bonds, with zero
    /// distances and weights. The bonds are not yet attached to a query
    /// point, and must be filled in order with [`NeighborList::set_bond`].
    pub fn zeros(num_bonds: usize) -> NeighborList {
        NeighborList {
            neighbors: vec![[UNSET_BOND, 0]; num_bonds],
            distances: vec![0.0; num_bonds],
            weights: vec![0.0; num_bonds],
            num_points: 0,
            num_query_points: 0,
            segment_counts: OnceCell::new(),
        }
    }

    /// Create a neighbor list from raw arrays.
    ///
    /// `query_point_indices` must be sorted in increasing order, and all
    /// values must be smaller than `num_query_points`. All values in
    /// `point_indices` must be smaller than `num_points`. If `weights` is
    /// `None`, all bonds get a weight of 1.
    pub fn from_arrays(
        query_point_indices: &[usize],
        num_query_points: usize,
        point_indices: &[usize],
        num_points: usize,
        distances: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<NeighborList, Error> {
        let num_bonds = query_point_indices.len();
        if point_indices.len() != num_bonds || distances.len() != num_bonds {
            return Err(Error::InvalidParameter(format!(
                "query_point_indices, point_indices and distances must have the same size, got {}, {} and {}",
                num_bonds, point_indices.len(), distances.len()
            )));
        }

        if let Some(weights) = weights {
            if weights.len() != num_bonds {
                return Err(Error::InvalidParameter(format!(
                    "expected {} weights, got {}", num_bonds, weights.len()
                )));
            }
        }

        let mut neighbors = Vec::with_capacity(num_bonds);
        let mut last_index = 0;
        for (&query_point, &point) in query_point_indices.iter().zip(point_indices) {
            if query_point < last_index {
                return Err(Error::InvalidParameter(
                    "query_point_indices must be sorted".into()
                ));
            }

            if query_point >= num_query_points {
                return Err(Error::InvalidParameter(format!(
                    "query_point_indices values must be less than num_query_points ({}), got {}",
                    num_query_points, query_point
                )));
            }

            if point >= num_points {
                return Err(Error::InvalidParameter(format!(
                    "point_indices values must be less than num_points ({}), got {}",
                    num_points, point
                )));
            }

            neighbors.push([query_point, point]);
            last_index = query_point;
        }

        let weights = match weights {
            Some(weights) => weights.to_vec(),
            None => vec![1.0; num_bonds],
        };

        return Ok(NeighborList {
            neighbors: neighbors,
            distances: distances.to_vec(),
            weights: weights,
            num_points: num_points,
            num_query_points: num_query_points,
            segment_counts: OnceCell::new(),
        });
    }

    /// Create a neighbor list from bonds already sorted by query point
    pub(crate) fn from_bonds(bonds: &[NeighborBond], num_query_points: usize, num_points: usize) -> NeighborList {
        debug_assert!(bonds.windows(2).all(|w| w[0].query_point_id <= w[1].query_point_id));

        let mut neighbors = Vec::with_capacity(bonds.len());
        let mut distances = Vec::with_capacity(bonds.len());
        let mut weights = Vec::with_capacity(bonds.len());
        for bond in bonds {
            neighbors.push([bond.query_point_id, bond.point_id]);
            distances.push(bond.distance);
            weights.push(bond.weight);
        }

        return NeighborList {
            neighbors: neighbors,
            distances: distances,
            weights: weights,
            num_points: num_points,
            num_query_points: num_query_points,
            segment_counts: OnceCell::new(),
        };
    }

    /// Get the number of bonds in this list
    pub fn num_bonds(&self) -> usize {
        self.neighbors.len()
    }

    /// Get the number of points this list refers to
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Get the number of query points this list refers to
    pub fn num_query_points(&self) -> usize {
        self.num_query_points
    }

    /// Get the `[query_point_id, point_id]` pairs as a `(num_bonds, 2)` array
    pub fn neighbors(&self) -> ArrayView2<'_, usize> {
        ndarray::aview2(&self.neighbors)
    }

    /// Get the distances of all bonds
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Get the weights of all bonds
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Get mutable access to the weights of all bonds
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Get the bond at the given `index`
    pub fn bond(&self, index: usize) -> NeighborBond {
        let [query_point_id, point_id] = self.neighbors[index];
        NeighborBond {
            query_point_id: query_point_id,
            point_id: point_id,
            distance: self.distances[index],
            weight: self.weights[index],
        }
    }

    /// Iterate over all the bonds in this list
    pub fn iter(&self) -> impl ExactSizeIterator<Item = NeighborBond> + '_ {
        (0..self.num_bonds()).map(move |index| self.bond(index))
    }

    /// Iterate over the bonds of a single query point, using
    /// [`NeighborList::find_first_index`] to find the first one.
    pub fn query_point_bonds(&self, query_point: usize) -> NeighborListPointIterator<'_> {
        NeighborListPointIterator {
            list: self,
            query_point: query_point,
            current: self.find_first_index(query_point),
        }
    }

    /// Resize this list to contain `num_bonds` bonds, and update the number of
    /// points and query points. New bonds have zero distance and weight, are
    /// placed after all existing bonds, and must be filled in order with
    /// [`NeighborList::set_bond`].
    pub fn set_num_bonds(&mut self, num_bonds: usize, num_points: usize, num_query_points: usize) {
        self.neighbors.resize(num_bonds, [UNSET_BOND, 0]);
        self.distances.resize(num_bonds, 0.0);
        self.weights.resize(num_bonds, 0.0);
        self.num_points = num_points;
        self.num_query_points = num_query_points;
        self.segment_counts.take();
    }

    /// Set the bond at `index`. The query point of the bond must be between
    /// the query points of the bonds at `index - 1` and `index + 1`, so the
    /// list stays sorted. Bonds that were not set yet come after every query
    /// point, which means a list created by [`NeighborList::zeros`] has to be
    /// filled from the first bond to the last.
    pub fn set_bond(&mut self, index: usize, bond: NeighborBond) -> Result<(), Error> {
        if index >= self.num_bonds() {
            return Err(Error::InvalidParameter(format!(
                "bond index {} is out of bounds for a list with {} bonds",
                index, self.num_bonds()
            )));
        }

        if bond.query_point_id >= self.num_query_points || bond.point_id >= self.num_points {
            return Err(Error::InvalidParameter(format!(
                "bond ({}, {}) is out of bounds for {} query points and {} points",
                bond.query_point_id, bond.point_id, self.num_query_points, self.num_points
            )));
        }

        if index > 0 && self.neighbors[index - 1][0] > bond.query_point_id {
            return Err(Error::InvalidParameter(format!(
                "bonds must be sorted by query point: bond {} can not be set \
                for query point {}, the previous bond is not set or has a \
                larger query point", index, bond.query_point_id
            )));
        }

        if index + 1 < self.num_bonds() && self.neighbors[index + 1][0] < bond.query_point_id {
            return Err(Error::InvalidParameter(format!(
                "bonds must be sorted by query point: bond {} can not be set \
                for query point {}, the next bond has query point {}",
                index, bond.query_point_id, self.neighbors[index + 1][0]
            )));
        }

        self.neighbors[index] = [bond.query_point_id, bond.point_id];
        self.distances[index] = bond.distance;
        self.weights[index] = bond.weight;
        self.segment_counts.take();
        return Ok(());
    }

    fn compute_segment_counts(&self) -> SegmentCounts {
        let mut counts = vec![0; self.num_query_points];
        // unset bonds are at the end, and not counted
        for &[query_point, _] in &self.neighbors {
            if query_point < counts.len() {
                counts[query_point] += 1;
            }
        }

        let mut segments = Vec::with_capacity(counts.len());
        let mut start = 0;
        for &count in &counts {
            segments.push(start);
            start += count;
        }

        return SegmentCounts {
            segments: segments,
            counts: counts,
        };
    }

    /// Recompute the segments and counts of this list. This is done lazily
    /// when calling [`NeighborList::segments`] or [`NeighborList::counts`],
    /// this function allows to do it eagerly.
    pub fn update_segment_counts(&mut self) {
        let segment_counts = self.compute_segment_counts();
        self.segment_counts = OnceCell::with_value(segment_counts);
    }

    /// Get the index of the first bond of each query point. For query points
    /// without bonds, this is the index where their bonds would be inserted.
    pub fn segments(&self) -> &[usize] {
        &self.segment_counts.get_or_init(|| self.compute_segment_counts()).segments
    }

    /// Get the number of bonds of each query point
    pub fn counts(&self) -> &[usize] {
        &self.segment_counts.get_or_init(|| self.compute_segment_counts()).counts
    }

    /// Only keep the bonds for which `keep(bond_index, distance)` returns
    /// `true`, preserving the order of the bonds. Returns the number of
    /// removed bonds.
    fn compact(&mut self, mut keep: impl FnMut(usize, f64) -> bool) -> usize {
        let old_size = self.num_bonds();

        let mut new_size = 0;
        for i in 0..old_size {
            if keep(i, self.distances[i]) {
                self.neighbors[new_size] = self.neighbors[i];
                self.distances[new_size] = self.distances[i];
                self.weights[new_size] = self.weights[i];
                new_size += 1;
            }
        }

        self.neighbors.truncate(new_size);
        self.distances.truncate(new_size);
        self.weights.truncate(new_size);
        self.segment_counts.take();

        return old_size - new_size;
    }

    /// Only keep the bonds for which `predicate(bond_index)` returns `true`.
    /// The bonds are indexed with their position before filtering. Returns the
    /// number of removed bonds.
    pub fn filter(&mut self, mut predicate: impl FnMut(usize) -> bool) -> usize {
        self.compact(|i, _| predicate(i))
    }

    /// Only keep the bonds with `r_min < distance < r_max`. Returns the number
    /// of removed bonds.
    pub fn filter_r(&mut self, r_max: f64, r_min: f64) -> usize {
        self.compact(|_, distance| distance > r_min && distance < r_max)
    }

    /// Find the index of the first bond with a query point greater or equal
    /// to `query_point`. This returns `num_bonds` if all bonds have a smaller
    /// query point, and 0 for an empty list.
    pub fn find_first_index(&self, query_point: usize) -> usize {
        self.neighbors.partition_point(|&[i, _]| i < query_point)
    }

    /// Replace the content of this list with a copy of `other`
    pub fn copy_from(&mut self, other: &NeighborList) {
        self.clone_from(other);
    }

    /// Check that this list was created for the given number of points and
    /// query points.
    pub fn validate(&self, num_points: usize, num_query_points: usize) -> Result<(), Error> {
        if num_points != self.num_points {
            return Err(Error::Inconsistent(format!(
                "this neighbor list was created for {} points, but is used with {}",
                self.num_points, num_points
            )));
        }

        if num_query_points != self.num_query_points {
            return Err(Error::Inconsistent(format!(
                "this neighbor list was created for {} query points, but is used with {}",
                self.num_query_points, num_query_points
            )));
        }

        if let Some(&[query_point, _]) = self.neighbors.last() {
            if query_point == UNSET_BOND {
                let unset = self.num_bonds() - self.find_first_index(UNSET_BOND);
                return Err(Error::Inconsistent(format!(
                    "{} bonds in this neighbor list were never set", unset
                )));
            }

            if query_point >= self.num_query_points {
                return Err(Error::Inconsistent(format!(
                    "this neighbor list contains bonds for query point {}, \
                    but only has {} query points", query_point, self.num_query_points
                )));
            }
        }

        return Ok(());
    }
}

/// Iterator over the bonds of a single query point in a [`NeighborList`]
#[derive(Debug, Clone)]
pub struct NeighborListPointIterator<'a> {
    list: &'a NeighborList,
    query_point: usize,
    current: usize,
}

impl<'a> Iterator for NeighborListPointIterator<'a> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        if self.current >= self.list.num_bonds() {
            return None;
        }

        if self.list.neighbors[self.current][0] != self.query_point {
            // move to the end, we will not find any other bond for this point
            self.current = self.list.num_bonds();
            return None;
        }

        let bond = self.list.bond(self.current);
        self.current += 1;
        return Some(bond);
    }
}

impl<'a> FusedIterator for NeighborListPointIterator<'a> {}
