use std::iter::FusedIterator;

use log::{debug, warn};

use crate::{SimulationBox, Vector3D};

use super::NeighborBond;
use super::aabb::{Aabb, AabbTree, TreeCursor};
use super::images::{periodic_images, wrap_point, PeriodicImages};
use super::nearest::BallSearch;

/// Neighbor search using a bounding volume hierarchy of axis-aligned bounding
/// boxes (AABB tree).
///
/// The tree is built once over the points wrapped inside the box. Searches
/// under periodic boundary conditions are done by translating the query point
/// to all periodic images of the box, and traversing the tree for each image.
#[derive(Debug, Clone)]
pub struct AabbQuery<'a> {
    cell: SimulationBox,
    points: &'a [Vector3D],
    tree: AabbTree,
    images: PeriodicImages,
    bounds: Aabb,
}

impl<'a> AabbQuery<'a> {
    /// Build the tree for the given `points` inside `cell`
    #[time_graph::instrument(name = "AabbQuery::new")]
    pub fn new(cell: SimulationBox, points: &'a [Vector3D]) -> AabbQuery<'a> {
        let wrapped = points.iter()
            .map(|&point| wrap_point(&cell, point))
            .collect::<Vec<_>>();

        let mut bounds = Aabb::empty();
        for &point in &wrapped {
            bounds.expand(point);
        }

        let tree = AabbTree::new(&wrapped);
        let images = periodic_images(&cell);
        debug!(
            "built AABB tree with {} nodes for {} points, using {} periodic images",
            tree.n_nodes(), points.len(), images.len()
        );

        return AabbQuery {
            cell: cell,
            points: points,
            tree: tree,
            images: images,
            bounds: bounds,
        };
    }

    /// Get the simulation box of this query
    pub fn cell(&self) -> &SimulationBox {
        &self.cell
    }

    /// Get the points in this query
    pub fn points(&self) -> &'a [Vector3D] {
        self.points
    }

    /// Iterate over all the points within `r_max` of `query_point`. The
    /// caller is responsible for checking that `r_max` is compatible with the
    /// periodic boundary conditions.
    pub(crate) fn ball(&self, query_point_id: usize, query_point: Vector3D, r_max: f64, exclude_ii: bool) -> AabbBallIterator<'_> {
        AabbBallIterator {
            query: self,
            query_point_id: query_point_id,
            query_point: wrap_point(&self.cell, query_point),
            r_max2: r_max * r_max,
            exclude_ii: exclude_ii,
            image: 0,
            cursor: TreeCursor::default(),
        }
    }
}

impl<'a> BallSearch for AabbQuery<'a> {
    fn cell(&self) -> &SimulationBox {
        &self.cell
    }

    fn n_points(&self) -> usize {
        self.points.len()
    }

    fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    fn collect_ball(&self, query_point_id: usize, query_point: Vector3D, r_max: f64, exclude_ii: bool, bonds: &mut Vec<NeighborBond>) {
        bonds.extend(self.ball(query_point_id, query_point, r_max, exclude_ii));
    }
}

/// Iterator over the neighbors of a single query point within a cutoff,
/// using an [`AabbQuery`].
///
/// The iterator traverses the tree once for each periodic image of the query
/// point, yielding bonds as soon as they are found.
pub struct AabbBallIterator<'q> {
    query: &'q AabbQuery<'q>,
    query_point_id: usize,
    /// query point wrapped inside the box
    query_point: Vector3D,
    r_max2: f64,
    exclude_ii: bool,
    /// index of the current periodic image
    image: usize,
    /// position of the traversal for the current image
    cursor: TreeCursor,
}

impl<'q> Iterator for AabbBallIterator<'q> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        while self.image < self.query.images.len() {
            let center = self.query_point + self.query.images[self.image];
            while let Some((point_id, distance2)) = self.query.tree.next_in_sphere(&mut self.cursor, center, self.r_max2) {
                if point_id == self.query_point_id {
                    if self.exclude_ii {
                        continue;
                    }
                } else if distance2 < 1e-3 {
                    warn!(
                        "points {} and {} are very close to one another ({})",
                        self.query_point_id, point_id, distance2.sqrt()
                    );
                }

                return Some(NeighborBond::new(self.query_point_id, point_id, distance2.sqrt()));
            }

            self.image += 1;
            self.cursor = TreeCursor::default();
        }

        return None;
    }
}

impl<'q> FusedIterator for AabbBallIterator<'q> {}
