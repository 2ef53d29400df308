use std::cell::RefCell;
use std::iter::FusedIterator;

use rayon::prelude::*;
use thread_local::ThreadLocal;

use crate::{Error, SimulationBox, Vector3D};

use super::{NeighborBond, NeighborList, QueryArgs, QueryMode};
use super::{AabbQuery, AabbBallIterator, LinkCell, LinkCellBallIterator, NearestIterator};
use super::images::check_cutoff;
use super::nearest::BallSearch;

/// A set of points without any acceleration structure.
///
/// This can not be queried directly, but can be given to the iteration
/// drivers in [`crate::compute`], which will build an [`AabbQuery`] when
/// needed.
#[derive(Debug, Clone)]
pub struct RawPoints<'a> {
    cell: SimulationBox,
    points: &'a [Vector3D],
}

impl<'a> RawPoints<'a> {
    /// Create a new set of raw `points` inside `cell`
    pub fn new(cell: SimulationBox, points: &'a [Vector3D]) -> RawPoints<'a> {
        RawPoints {
            cell: cell,
            points: points,
        }
    }
}

/// A spatial index over a set of points in a simulation box, which can be
/// used to find neighbors of arbitrary query points.
#[derive(Debug, Clone)]
pub enum NeighborQuery<'a> {
    /// Bounding volume hierarchy
    Aabb(AabbQuery<'a>),
    /// Cell list
    LinkCell(LinkCell<'a>),
    /// Points without acceleration structure
    RawPoints(RawPoints<'a>),
}

impl<'a> From<AabbQuery<'a>> for NeighborQuery<'a> {
    fn from(query: AabbQuery<'a>) -> NeighborQuery<'a> {
        NeighborQuery::Aabb(query)
    }
}

impl<'a> From<LinkCell<'a>> for NeighborQuery<'a> {
    fn from(query: LinkCell<'a>) -> NeighborQuery<'a> {
        NeighborQuery::LinkCell(query)
    }
}

impl<'a> From<RawPoints<'a>> for NeighborQuery<'a> {
    fn from(query: RawPoints<'a>) -> NeighborQuery<'a> {
        NeighborQuery::RawPoints(query)
    }
}

impl<'a> NeighborQuery<'a> {
    /// Get the simulation box of this query
    pub fn cell(&self) -> &SimulationBox {
        match self {
            NeighborQuery::Aabb(query) => query.cell(),
            NeighborQuery::LinkCell(query) => query.cell(),
            NeighborQuery::RawPoints(query) => &query.cell,
        }
    }

    /// Get the points in this query
    pub fn points(&self) -> &'a [Vector3D] {
        match self {
            NeighborQuery::Aabb(query) => query.points(),
            NeighborQuery::LinkCell(query) => query.points(),
            NeighborQuery::RawPoints(query) => query.points,
        }
    }

    /// Get the number of points in this query
    pub fn n_points(&self) -> usize {
        self.points().len()
    }

    /// Get the point at the given `index`
    pub fn point(&self, index: usize) -> Result<Vector3D, Error> {
        let points = self.points();
        return points.get(index).copied().ok_or_else(|| Error::InvalidParameter(format!(
            "point index {} is out of bounds for a query with {} points",
            index, points.len()
        )));
    }

    /// Start a query for the neighbors of `query_points`.
    ///
    /// The mode of the query is inferred from `args` if needed, and the
    /// arguments are validated. Ball queries fail if the cutoff is too large
    /// for the periodic boundary conditions of the box. The neighbors are
    /// found lazily, when iterating over the returned
    /// [`NeighborQueryIterator`].
    pub fn query<'q>(&'q self, query_points: &'q [Vector3D], mut args: QueryArgs) -> Result<NeighborQueryIterator<'q>, Error> {
        args.validate()?;

        if let NeighborQuery::RawPoints(_) = self {
            return Err(Error::Unsupported(
                "RawPoints can not be queried directly, use an AabbQuery or a LinkCell instead".into()
            ));
        }

        if args.mode == QueryMode::Ball {
            if let Some(r_max) = args.r_max {
                check_cutoff(self.cell(), r_max)?;
            }
        }

        return Ok(NeighborQueryIterator {
            query: self,
            query_points: query_points,
            args: args,
            next_query_point: 0,
            current: None,
        });
    }

    /// Get the ball search implementation of this query, if any
    fn ball_search(&self) -> Option<&dyn BallSearch> {
        match self {
            NeighborQuery::Aabb(query) => Some(query),
            NeighborQuery::LinkCell(query) => Some(query),
            NeighborQuery::RawPoints(_) => None,
        }
    }
}

/// Iterator over the neighbors of a single query point
pub enum PointNeighbors<'q> {
    /// Ball query with an AABB tree
    AabbBall(AabbBallIterator<'q>),
    /// Ball query with a cell list
    LinkCellBall(LinkCellBallIterator<'q>),
    /// Nearest neighbors query with any index
    Nearest(NearestIterator<'q>),
    /// No neighbors at all
    Empty,
}

impl<'q> Iterator for PointNeighbors<'q> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        match self {
            PointNeighbors::AabbBall(iterator) => iterator.next(),
            PointNeighbors::LinkCellBall(iterator) => iterator.next(),
            PointNeighbors::Nearest(iterator) => iterator.next(),
            PointNeighbors::Empty => None,
        }
    }
}

impl<'q> FusedIterator for PointNeighbors<'q> {}

/// Lazy iterator over the neighbors of a set of query points, created by
/// [`NeighborQuery::query`].
///
/// Iterating over this produces the bonds of all query points in order.
/// [`NeighborQueryIterator::query_point`] gives access to the bonds of a
/// single query point, and [`NeighborQueryIterator::to_neighbor_list`] finds
/// all bonds in parallel.
pub struct NeighborQueryIterator<'q> {
    query: &'q NeighborQuery<'q>,
    query_points: &'q [Vector3D],
    /// validated arguments
    args: QueryArgs,
    /// next query point to start iterating over
    next_query_point: usize,
    /// iterator for the current query point
    current: Option<PointNeighbors<'q>>,
}

impl<'q> NeighborQueryIterator<'q> {
    /// Get the index used by this query
    pub fn neighbor_query(&self) -> &'q NeighborQuery<'q> {
        self.query
    }

    /// Get the query points
    pub fn query_points(&self) -> &'q [Vector3D] {
        self.query_points
    }

    /// Get the validated arguments of this query
    pub fn args(&self) -> &QueryArgs {
        &self.args
    }

    /// Get a lazy iterator over the neighbors of the query point at `index`
    pub fn query_point(&self, index: usize) -> Result<PointNeighbors<'q>, Error> {
        if index >= self.query_points.len() {
            return Err(Error::InvalidParameter(format!(
                "query point index {} is out of bounds for a query with {} query points",
                index, self.query_points.len()
            )));
        }

        return Ok(self.point_iterator(index));
    }

    /// Same as `query_point`, for an index known to be in bounds
    pub(crate) fn point_iterator(&self, index: usize) -> PointNeighbors<'q> {
        point_neighbors(self.query, self.query_points, &self.args, index)
    }

    /// Find all the neighbors of all query points, and collect them in a
    /// [`NeighborList`] sorted by query point, then distance, then point.
    ///
    /// Query points are distributed over the threads of the rayon thread
    /// pool. Calling this multiple times gives the same result.
    #[time_graph::instrument(name = "NeighborQueryIterator::to_neighbor_list")]
    pub fn to_neighbor_list(&self) -> NeighborList {
        let query = self.query;
        let query_points = self.query_points;
        let args = &self.args;

        let thread_bonds = ThreadLocal::<RefCell<Vec<NeighborBond>>>::new();
        (0..query_points.len()).into_par_iter().for_each(|index| {
            let mut bonds = thread_bonds.get_or(|| RefCell::new(Vec::new())).borrow_mut();
            bonds.extend(point_neighbors(query, query_points, args, index));
        });

        let mut bonds = Vec::new();
        for thread_bonds in thread_bonds {
            bonds.extend(thread_bonds.into_inner());
        }
        bonds.par_sort_unstable_by(NeighborBond::storage_order);

        return NeighborList::from_bonds(&bonds, query_points.len(), query.n_points());
    }
}

impl<'q> Iterator for NeighborQueryIterator<'q> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        loop {
            if let Some(current) = &mut self.current {
                if let Some(bond) = current.next() {
                    return Some(bond);
                }
            }

            if self.next_query_point >= self.query_points.len() {
                self.current = None;
                return None;
            }

            self.current = Some(point_neighbors(self.query, self.query_points, &self.args, self.next_query_point));
            self.next_query_point += 1;
        }
    }
}

impl<'q> FusedIterator for NeighborQueryIterator<'q> {}

/// Create the iterator over the neighbors of `query_points[index]`, the
/// arguments must already be validated.
fn point_neighbors<'q>(
    query: &'q NeighborQuery<'q>,
    query_points: &'q [Vector3D],
    args: &QueryArgs,
    index: usize,
) -> PointNeighbors<'q> {
    let query_point = query_points[index];
    match args.mode {
        QueryMode::Ball => {
            let r_max = args.r_max.unwrap_or(0.0);
            match query {
                NeighborQuery::Aabb(aabb) => {
                    PointNeighbors::AabbBall(aabb.ball(index, query_point, r_max, args.exclude_ii))
                }
                NeighborQuery::LinkCell(link_cell) => {
                    PointNeighbors::LinkCellBall(link_cell.ball(index, query_point, r_max, args.exclude_ii))
                }
                NeighborQuery::RawPoints(_) => PointNeighbors::Empty,
            }
        }
        QueryMode::Nearest => {
            match query.ball_search() {
                Some(search) => PointNeighbors::Nearest(NearestIterator::new(
                    search,
                    index,
                    query_point,
                    args.num_neighbors.unwrap_or(0),
                    args.r_max,
                    args.scale,
                    args.exclude_ii,
                )),
                None => PointNeighbors::Empty,
            }
        }
        QueryMode::None => PointNeighbors::Empty,
    }
}
