//! Generic drivers running a computation over the neighbors of a set of query
//! points, either using an existing [`NeighborList`] or by querying a
//! [`NeighborQuery`] on the fly.

use std::iter::FusedIterator;

use log::debug;
use rayon::prelude::*;

use crate::{Error, Vector3D};
use crate::neighbors::{AabbQuery, NeighborBond, NeighborList, NeighborListPointIterator};
use crate::neighbors::{NeighborQuery, PointNeighbors, QueryArgs};

/// Iterator over the neighbors of a single query point, coming either from a
/// `NeighborList` or from a live query
pub enum PerPointIterator<'a> {
    /// Bonds stored in a neighbor list
    List(NeighborListPointIterator<'a>),
    /// Bonds found by a neighbor query
    Query(PointNeighbors<'a>),
}

impl<'a> Iterator for PerPointIterator<'a> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        match self {
            PerPointIterator::List(iterator) => iterator.next(),
            PerPointIterator::Query(iterator) => iterator.next(),
        }
    }
}

impl<'a> FusedIterator for PerPointIterator<'a> {}

/// Call `body(chunk_begin, chunk_end)` on chunks covering the `begin..end`
/// range. If `parallel` is `true`, the chunks are distributed over the rayon
/// thread pool; otherwise `body` is called once with the full range.
pub fn for_loop_wrapper<F>(begin: usize, end: usize, body: F, parallel: bool) where F: Fn(usize, usize) + Sync + Send {
    if begin >= end {
        return;
    }

    if !parallel {
        body(begin, end);
        return;
    }

    let size = end - begin;
    let chunk_size = usize::max(1, size / (4 * rayon::current_num_threads()));
    let n_chunks = (size + chunk_size - 1) / chunk_size;

    (0..n_chunks).into_par_iter().for_each(|chunk| {
        let chunk_begin = begin + chunk * chunk_size;
        let chunk_end = usize::min(chunk_begin + chunk_size, end);
        body(chunk_begin, chunk_end);
    });
}

/// Replace `RawPoints` with an `AabbQuery` over the same points
fn queryable<'a>(query: &NeighborQuery<'a>) -> Option<NeighborQuery<'a>> {
    if let NeighborQuery::RawPoints(_) = query {
        debug!("building an AABB tree to find the neighbors of {} raw points", query.n_points());
        return Some(NeighborQuery::Aabb(AabbQuery::new(*query.cell(), query.points())));
    }
    return None;
}

/// Call `callback(i, neighbors)` for each query point `i`, where `neighbors`
/// iterates over the bonds of this query point.
///
/// If `nlist` is given, the bonds are taken from it (and `args` is not used);
/// otherwise the bonds are found by querying `query` with `args`. `RawPoints`
/// are supported here, by building an [`AabbQuery`] for the duration of this
/// function.
///
/// When `parallel` is `true`, the query points are split in chunks running on
/// the rayon thread pool, and `callback` can be called for different query
/// points concurrently and in any order.
pub fn loop_over_neighbors_iterator<F>(
    query: &NeighborQuery<'_>,
    query_points: &[Vector3D],
    args: QueryArgs,
    nlist: Option<&NeighborList>,
    callback: F,
    parallel: bool,
) -> Result<(), Error> where F: Fn(usize, PerPointIterator<'_>) + Sync + Send {
    if let Some(nlist) = nlist {
        nlist.validate(query.n_points(), query_points.len())?;

        for_loop_wrapper(0, query_points.len(), |begin, end| {
            for i in begin..end {
                callback(i, PerPointIterator::List(nlist.query_point_bonds(i)));
            }
        }, parallel);

        return Ok(());
    }

    let fallback = queryable(query);
    let query = fallback.as_ref().unwrap_or(query);
    let iterator = query.query(query_points, args)?;

    for_loop_wrapper(0, query_points.len(), |begin, end| {
        for i in begin..end {
            callback(i, PerPointIterator::Query(iterator.point_iterator(i)));
        }
    }, parallel);

    return Ok(());
}

/// Call `callback(bond)` for each bond between the query points and the
/// points in `query`.
///
/// If `nlist` is given, the bonds are taken from it; otherwise the bonds are
/// found by querying `query` with `args`, and the bonds of a single query
/// point are always produced on the same thread. When `parallel` is `true`,
/// `callback` can be called concurrently and in any order.
pub fn loop_over_neighbors<F>(
    query: &NeighborQuery<'_>,
    query_points: &[Vector3D],
    args: QueryArgs,
    nlist: Option<&NeighborList>,
    callback: F,
    parallel: bool,
) -> Result<(), Error> where F: Fn(NeighborBond) + Sync + Send {
    if let Some(nlist) = nlist {
        nlist.validate(query.n_points(), query_points.len())?;

        for_loop_wrapper(0, nlist.num_bonds(), |begin, end| {
            for i in begin..end {
                callback(nlist.bond(i));
            }
        }, parallel);

        return Ok(());
    }

    let fallback = queryable(query);
    let query = fallback.as_ref().unwrap_or(query);
    let iterator = query.query(query_points, args)?;

    for_loop_wrapper(0, query_points.len(), |begin, end| {
        for i in begin..end {
            for bond in iterator.point_iterator(i) {
                callback(bond);
            }
        }
    }, parallel);

    return Ok(());
}
