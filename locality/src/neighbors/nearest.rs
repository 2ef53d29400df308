use std::iter::FusedIterator;

use log::debug;

use crate::{SimulationBox, Vector3D};

use super::NeighborBond;
use super::aabb::Aabb;
use super::images::{max_query_radius, wrap_point};

/// Fixed-radius search used to build k-nearest neighbors queries
pub(crate) trait BallSearch: Sync {
    /// Get the simulation box of the search
    fn cell(&self) -> &SimulationBox;
    /// Get the number of points in the search
    fn n_points(&self) -> usize;
    /// Get the bounding box of all points, after wrapping them inside the box
    fn bounds(&self) -> &Aabb;
    /// Add all the bonds between `query_point` and points within `r_max` of
    /// it to `bonds`. This does not check `r_max` against the size of the
    /// box.
    fn collect_ball(
        &self,
        query_point_id: usize,
        query_point: Vector3D,
        r_max: f64,
        exclude_ii: bool,
        bonds: &mut Vec<NeighborBond>,
    );
}

/// Iterator over the `k` nearest neighbors of a single query point.
///
/// The neighbors are found by running ball queries with a growing radius
/// until enough neighbors are found, or until the radius reaches half of the
/// smallest distance between periodic images. In the latter case, fewer than
/// `k` neighbors are produced. Neighbors are produced by increasing distance.
pub struct NearestIterator<'q> {
    search: &'q dyn BallSearch,
    query_point_id: usize,
    query_point: Vector3D,
    num_neighbors: usize,
    r_max: Option<f64>,
    scale: f64,
    exclude_ii: bool,
    /// neighbors sorted by decreasing distance, `None` until the first call to
    /// `next`
    bonds: Option<Vec<NeighborBond>>,
}

impl<'q> NearestIterator<'q> {
    pub(crate) fn new(
        search: &'q dyn BallSearch,
        query_point_id: usize,
        query_point: Vector3D,
        num_neighbors: usize,
        r_max: Option<f64>,
        scale: f64,
        exclude_ii: bool,
    ) -> NearestIterator<'q> {
        NearestIterator {
            search: search,
            query_point_id: query_point_id,
            query_point: query_point,
            num_neighbors: num_neighbors,
            r_max: r_max,
            scale: scale,
            exclude_ii: exclude_ii,
            bonds: None,
        }
    }

    /// Largest radius the search will ever use
    fn radius_limit(&self) -> f64 {
        let mut limit = max_query_radius(self.search.cell());
        if limit.is_infinite() {
            // no periodic boundaries, a ball containing all points is enough
            let bounds = self.search.bounds();
            let center = wrap_point(self.search.cell(), self.query_point);
            let farthest = Vector3D::new(
                f64::max(f64::abs(center[0] - bounds.lower[0]), f64::abs(center[0] - bounds.upper[0])),
                f64::max(f64::abs(center[1] - bounds.lower[1]), f64::abs(center[1] - bounds.upper[1])),
                f64::max(f64::abs(center[2] - bounds.lower[2]), f64::abs(center[2] - bounds.upper[2])),
            );
            // the ball test is strict, make sure the farthest point is inside
            limit = farthest.norm() * (1.0 + 1e-9) + 1e-9;
        }

        if let Some(r_max) = self.r_max {
            limit = f64::min(limit, r_max);
        }

        return limit;
    }

    fn search(&self) -> Vec<NeighborBond> {
        if self.search.n_points() == 0 {
            return Vec::new();
        }

        let limit = self.radius_limit();
        let mut radius = f64::min(self.initial_radius(), limit);

        let mut bonds = Vec::new();
        loop {
            bonds.clear();
            self.search.collect_ball(self.query_point_id, self.query_point, radius, self.exclude_ii, &mut bonds);

            if bonds.len() >= self.num_neighbors || radius >= limit {
                break;
            }

            radius = f64::min(radius * self.scale, limit);
        }

        if bonds.len() < self.num_neighbors {
            debug!(
                "only found {} neighbors out of {} for query point {} with the maximal radius {}",
                bonds.len(), self.num_neighbors, self.query_point_id, radius
            );
        }

        // stable sort, ties are kept in discovery order
        bonds.sort_by(NeighborBond::distance_order);
        bonds.truncate(self.num_neighbors);
        bonds.reverse();

        return bonds;
    }

    /// Radius of the sphere (or disk in 2D) that would contain the requested
    /// number of neighbors if the points were uniformly distributed
    fn initial_radius(&self) -> f64 {
        let cell = self.search.cell();
        let density = self.search.n_points() as f64 / cell.volume();

        let mut count = self.num_neighbors as f64;
        if self.exclude_ii {
            count += 1.0;
        }

        if cell.is_2d() {
            return f64::sqrt(count / (std::f64::consts::PI * density));
        } else {
            return f64::cbrt(3.0 * count / (4.0 * std::f64::consts::PI * density));
        }
    }
}

impl<'q> Iterator for NearestIterator<'q> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        if self.bonds.is_none() {
            self.bonds = Some(self.search());
        }

        return self.bonds.as_mut().and_then(|bonds| bonds.pop());
    }
}

impl<'q> FusedIterator for NearestIterator<'q> {}
