use std::iter::FusedIterator;

use log::{debug, warn};
use ndarray::Array3;

use crate::{Error, SimulationBox, Vector3D};

use super::NeighborBond;
use super::aabb::Aabb;
use super::images::wrap_point;
use super::nearest::BallSearch;

/// Maximal number of cells, we need to use this to prevent having too many
/// cells with a large box and a small cell width
const MAX_NUMBER_OF_CELLS: f64 = 1e5;

/// Neighbor search using a cell list (also called linked cells).
///
/// Points are sorted in a regular grid of cells, defined in fractional
/// coordinates so that cells follow the shape of the box. The neighbors of a
/// query point are then searched in the block of cells around the cell
/// containing the query point, the size of this block depending on the cutoff
/// and the size of the cells.
#[derive(Debug, Clone)]
pub struct LinkCell<'a> {
    cell: SimulationBox,
    points: &'a [Vector3D],
    /// requested width of the cells
    cell_width: f64,
    /// points wrapped inside the box
    positions: Vec<Vector3D>,
    /// indexes of the points in each cell
    cells: Array3<Vec<usize>>,
    bounds: Aabb,
}

impl<'a> LinkCell<'a> {
    /// Create a new `LinkCell` for the given `points` inside `cell`. The cells
    /// will have a width of at least `cell_width` along each axis, and there
    /// is at least one cell along each axis.
    #[time_graph::instrument(name = "LinkCell::new")]
    pub fn new(cell: SimulationBox, points: &'a [Vector3D], cell_width: f64) -> Result<LinkCell<'a>, Error> {
        if !(cell_width > 0.0 && cell_width.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "cell width must be a positive number, got {}", cell_width
            )));
        }

        let n_cells = number_of_cells(&cell, cell_width);
        let mut link_cell = LinkCell {
            cell: cell,
            points: points,
            cell_width: cell_width,
            positions: Vec::with_capacity(points.len()),
            cells: Array3::from_elem(n_cells, Vec::new()),
            bounds: Aabb::empty(),
        };

        for (index, &point) in points.iter().enumerate() {
            let position = wrap_point(&cell, point);
            let cell_index = link_cell.cell_index(position);
            link_cell.cells[cell_index].push(index);
            link_cell.positions.push(position);
            link_cell.bounds.expand(position);
        }

        debug!(
            "built cell list with {}x{}x{} cells for {} points",
            n_cells[0], n_cells[1], n_cells[2], points.len()
        );

        return Ok(link_cell);
    }

    /// Get the simulation box of this query
    pub fn cell(&self) -> &SimulationBox {
        &self.cell
    }

    /// Get the points in this query
    pub fn points(&self) -> &'a [Vector3D] {
        self.points
    }

    /// Get the requested width of the cells
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Get the number of cells along each axis
    pub fn n_cells(&self) -> [usize; 3] {
        let shape = self.cells.shape();
        [shape[0], shape[1], shape[2]]
    }

    /// Find the cell containing the `position`, which should already be
    /// wrapped inside the box. Positions outside of the box along non periodic
    /// axes are assigned to the cells at the boundary.
    fn cell_index(&self, position: Vector3D) -> [usize; 3] {
        let fractional = self.cell.fractional(position);
        let periodic = self.cell.periodic();
        let n_cells = self.n_cells();

        let mut index = [0; 3];
        for axis in 0..3 {
            let n = n_cells[axis];
            let i = f64::floor(fractional[axis] * n as f64) as i64;
            index[axis] = if periodic[axis] {
                i.rem_euclid(n as i64) as usize
            } else {
                i64::clamp(i, 0, n as i64 - 1) as usize
            };
        }
        return index;
    }

    /// Iterate over all the points within `r_max` of `query_point`. The
    /// caller is responsible for checking that `r_max` is compatible with the
    /// periodic boundary conditions.
    pub(crate) fn ball(&self, query_point_id: usize, query_point: Vector3D, r_max: f64, exclude_ii: bool) -> LinkCellBallIterator<'_> {
        let query_point = wrap_point(&self.cell, query_point);
        let center = self.cell_index(query_point);

        let n_cells = self.n_cells();
        let periodic = self.cell.periodic();
        let distances = self.cell.nearest_plane_distance();

        let mut axis_cells: [Vec<usize>; 3] = Default::default();
        for axis in 0..3 {
            // number of cells to search in each direction to make sure all
            // possible neighbors below the cutoff are accounted for
            let n_search = f64::ceil(r_max * n_cells[axis] as f64 / distances[axis]) as usize;
            axis_cells[axis] = cells_around(center[axis], n_search, n_cells[axis], periodic[axis]);
        }

        let mut neighbor_cells = Vec::with_capacity(axis_cells[0].len() * axis_cells[1].len() * axis_cells[2].len());
        for &i in &axis_cells[0] {
            for &j in &axis_cells[1] {
                for &k in &axis_cells[2] {
                    neighbor_cells.push([i, j, k]);
                }
            }
        }

        return LinkCellBallIterator {
            link_cell: self,
            query_point_id: query_point_id,
            query_point: query_point,
            r_max2: r_max * r_max,
            exclude_ii: exclude_ii,
            neighbor_cells: neighbor_cells,
            current_cell: 0,
            current_point: 0,
        };
    }
}

/// Get the number of cells along each axis of the box, limiting the total
/// number of cells to `MAX_NUMBER_OF_CELLS`
fn number_of_cells(cell: &SimulationBox, cell_width: f64) -> [usize; 3] {
    let distances = cell.nearest_plane_distance();
    let mut n_cells = [
        f64::max(f64::trunc(distances[0] / cell_width), 1.0),
        f64::max(f64::trunc(distances[1] / cell_width), 1.0),
        f64::max(f64::trunc(distances[2] / cell_width), 1.0),
    ];

    if cell.is_2d() {
        n_cells[2] = 1.0;
    }

    // limit memory consumption by ensuring we have less than
    // `MAX_NUMBER_OF_CELLS` cells to look though
    let n_cells_total = n_cells[0] * n_cells[1] * n_cells[2];
    if n_cells_total > MAX_NUMBER_OF_CELLS {
        // set the total number of cells close to MAX_NUMBER_OF_CELLS, while
        // keeping roughly the ratio of cells in each direction
        let ratio_x_y = n_cells[0] / n_cells[1];
        if cell.is_2d() {
            n_cells[1] = f64::trunc(f64::sqrt(MAX_NUMBER_OF_CELLS / ratio_x_y));
        } else {
            let ratio_y_z = n_cells[1] / n_cells[2];
            n_cells[2] = f64::trunc(f64::cbrt(MAX_NUMBER_OF_CELLS / (ratio_x_y * ratio_y_z * ratio_y_z)));
            n_cells[1] = f64::trunc(ratio_y_z * n_cells[2]);
        }
        n_cells[0] = f64::trunc(ratio_x_y * n_cells[1]);

        for n in &mut n_cells {
            *n = f64::max(*n, 1.0);
        }

        warn!(
            "the cell width {} would create {} cells, using {}x{}x{} cells instead",
            cell_width, n_cells_total, n_cells[0], n_cells[1], n_cells[2]
        );
    }

    return [n_cells[0] as usize, n_cells[1] as usize, n_cells[2] as usize];
}

/// Get the index of the cells within `n_search` cells of `center` along one
/// axis, wrapping around periodic axes. Every cell appears at most once.
fn cells_around(center: usize, n_search: usize, n_cells: usize, periodic: bool) -> Vec<usize> {
    if periodic {
        if n_search.saturating_mul(2).saturating_add(1) >= n_cells {
            return (0..n_cells).collect();
        }

        return (0..=(2 * n_search))
            .map(|offset| (center + n_cells + offset - n_search) % n_cells)
            .collect();
    }

    let start = center.saturating_sub(n_search);
    let stop = usize::min(center.saturating_add(n_search), n_cells - 1);
    return (start..=stop).collect();
}

impl<'a> BallSearch for LinkCell<'a> {
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
/// using a [`LinkCell`].
pub struct LinkCellBallIterator<'q> {
    link_cell: &'q LinkCell<'q>,
    query_point_id: usize,
    /// query point wrapped inside the box
    query_point: Vector3D,
    r_max2: f64,
    exclude_ii: bool,
    /// all the cells to look into
    neighbor_cells: Vec<[usize; 3]>,
    /// index of the current cell in `neighbor_cells`
    current_cell: usize,
    /// index of the next point to check in the current cell
    current_point: usize,
}

impl<'q> Iterator for LinkCellBallIterator<'q> {
    type Item = NeighborBond;

    fn next(&mut self) -> Option<NeighborBond> {
        let link_cell = self.link_cell;
        while self.current_cell < self.neighbor_cells.len() {
            let cell_points = &link_cell.cells[self.neighbor_cells[self.current_cell]];

            while self.current_point < cell_points.len() {
                let point_id = cell_points[self.current_point];
                self.current_point += 1;

                if self.exclude_ii && point_id == self.query_point_id {
                    continue;
                }

                let distance2 = link_cell.cell.distance2(self.query_point, link_cell.positions[point_id]);
                if distance2 < self.r_max2 {
                    if distance2 < 1e-3 && point_id != self.query_point_id {
                        warn!(
                            "points {} and {} are very close to one another ({})",
                            self.query_point_id, point_id, distance2.sqrt()
                        );
                    }

                    return Some(NeighborBond::new(self.query_point_id, point_id, distance2.sqrt()));
                }
            }

            self.current_cell += 1;
            self.current_point = 0;
        }

        return None;
    }
}

impl<'q> FusedIterator for LinkCellBallIterator<'q> {}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn cells() {
        let cell = SimulationBox::orthorhombic(10.0, 6.0, 4.5);
        let link_cell = LinkCell::new(cell, &[], 2.0).unwrap();
        assert_eq!(link_cell.n_cells(), [5, 3, 2]);
        assert_eq!(link_cell.cell_width(), 2.0);

        // at least one cell along each axis
        let link_cell = LinkCell::new(cell, &[], 8.0).unwrap();
        assert_eq!(link_cell.n_cells(), [1, 1, 1]);

        let link_cell = LinkCell::new(SimulationBox::square(10.0), &[], 1.0).unwrap();
        assert_eq!(link_cell.n_cells(), [10, 10, 1]);

        let error = LinkCell::new(cell, &[], 0.0).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter(_)));
        let error = LinkCell::new(cell, &[], -1.0).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter(_)));
    }

    #[test]
    fn max_number_of_cells() {
        let link_cell = LinkCell::new(SimulationBox::cubic(1000.0), &[], 1.0).unwrap();
        let [nx, ny, nz] = link_cell.n_cells();
        assert!(nx * ny * nz <= MAX_NUMBER_OF_CELLS as usize);
        assert_eq!(nx, ny);
        assert_eq!(ny, nz);

        let link_cell = LinkCell::new(SimulationBox::rectangle(2000.0, 1000.0), &[], 1.0).unwrap();
        let [nx, ny, nz] = link_cell.n_cells();
        assert!(nx * ny <= MAX_NUMBER_OF_CELLS as usize);
        assert_eq!(nz, 1);
        assert_eq!(nx, 2 * ny);
    }

    #[test]
    fn cell_index() {
        let cell = SimulationBox::cubic(10.0);
        let link_cell = LinkCell::new(cell, &[], 2.0).unwrap();
        assert_eq!(link_cell.cell_index(Vector3D::new(-5.0, -5.0, -5.0)), [0, 0, 0]);
        assert_eq!(link_cell.cell_index(Vector3D::new(0.0, 0.0, 0.0)), [2, 2, 2]);
        assert_eq!(link_cell.cell_index(Vector3D::new(4.9, -3.1, 1.5)), [4, 0, 3]);
        // exactly on the upper boundary
        assert_eq!(link_cell.cell_index(Vector3D::new(5.0, 0.0, 0.0)), [0, 2, 2]);

        let cell = cell.with_periodic([false, true, true]);
        let link_cell = LinkCell::new(cell, &[], 2.0).unwrap();
        assert_eq!(link_cell.cell_index(Vector3D::new(27.0, 0.0, 0.0)), [4, 2, 2]);
        assert_eq!(link_cell.cell_index(Vector3D::new(-27.0, 0.0, 0.0)), [0, 2, 2]);
    }

    #[test]
    fn around() {
        assert_eq!(cells_around(0, 1, 5, true), [4, 0, 1]);
        assert_eq!(cells_around(4, 1, 5, true), [3, 4, 0]);
        assert_eq!(cells_around(2, 2, 5, true), [0, 1, 2, 3, 4]);
        // small grids do not visit the same cell twice
        assert_eq!(cells_around(0, 1, 2, true), [0, 1]);
        assert_eq!(cells_around(0, 1, 1, true), [0]);

        assert_eq!(cells_around(0, 1, 5, false), [0, 1]);
        assert_eq!(cells_around(4, 2, 5, false), [2, 3, 4]);
        assert_eq!(cells_around(2, usize::MAX, 5, false), [0, 1, 2, 3, 4]);
        assert_eq!(cells_around(0, 0, 1, false), [0]);
    }

    #[test]
    fn periodic_ball() {
        let cell = SimulationBox::square(10.0);
        let points = [
            Vector3D::new(-4.75, 0.0, 0.0),
            Vector3D::new(4.75, 0.0, 0.0),
            Vector3D::new(0.0, 0.0, 0.0),
        ];
        let link_cell = LinkCell::new(cell, &points, 1.0).unwrap();

        let bonds = link_cell.ball(0, points[0], 1.0, true).collect::<Vec<_>>();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].point_id, 1);
        assert_relative_eq!(bonds[0].distance, 0.5, epsilon = 1e-12);

        let bonds = link_cell.ball(1, points[1], 1.0, true).collect::<Vec<_>>();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].point_id, 0);

        let mut bonds = link_cell.ball(2, points[2], 5.0, false).map(|b| b.point_id).collect::<Vec<_>>();
        bonds.sort_unstable();
        assert_eq!(bonds, [0, 1, 2]);
    }

    #[test]
    fn large_cutoff() {
        // cutoff larger than the cells, the search has to look further away
        let cell = SimulationBox::cubic(10.0);
        let points = [
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(3.5, 0.0, 0.0),
            Vector3D::new(-3.5, -1.0, 0.0),
        ];
        let link_cell = LinkCell::new(cell, &points, 1.0).unwrap();

        let mut bonds = link_cell.ball(0, points[0], 4.0, true).map(|b| b.point_id).collect::<Vec<_>>();
        bonds.sort_unstable();
        assert_eq!(bonds, [1, 2]);

        assert_eq!(link_cell.ball(0, points[0], 3.0, true).count(), 0);
    }
}
