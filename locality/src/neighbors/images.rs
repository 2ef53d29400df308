use crate::{Error, SimulationBox, StackVec, Vector3D};

/// Translation vectors to all the periodic images of the box that need to be
/// considered by a neighbor search.
pub(crate) type PeriodicImages = StackVec<[Vector3D; 27]>;

/// Get the translation vectors of the images of `cell`, combining shifts of
/// -1, 0 and +1 box vectors along each periodic axis. The zero translation is
/// always the first one.
pub(crate) fn periodic_images(cell: &SimulationBox) -> PeriodicImages {
    let periodic = cell.periodic();
    let shifts = |axis: usize| -> &'static [i32] {
        if periodic[axis] { &[0, -1, 1] } else { &[0] }
    };

    let a = cell.lattice_vector(0);
    let b = cell.lattice_vector(1);
    let c = cell.lattice_vector(2);

    let mut images = PeriodicImages::new();
    for &i in shifts(0) {
        for &j in shifts(1) {
            for &k in shifts(2) {
                images.push(i as f64 * a + j as f64 * b + k as f64 * c);
            }
        }
    }

    return images;
}

/// Wrap `point` inside `cell` along periodic axes, and project it on the
/// `z = 0` plane for two dimensional boxes.
pub(crate) fn wrap_point(cell: &SimulationBox, point: Vector3D) -> Vector3D {
    let mut wrapped = cell.wrap(point);
    if cell.is_2d() {
        wrapped[2] = 0.0;
    }
    return wrapped;
}

/// Check that a ball query of radius `r_max` can be performed in `cell`: the
/// ball must not overlap with itself through the periodic boundaries.
pub(crate) fn check_cutoff(cell: &SimulationBox, r_max: f64) -> Result<(), Error> {
    let periodic = cell.periodic();
    let distances = cell.nearest_plane_distance();

    for (axis, name) in ["x", "y", "z"].iter().enumerate() {
        if periodic[axis] && distances[axis] <= 2.0 * r_max {
            return Err(Error::Configuration(format!(
                "the cutoff ({}) is too large for this box: the distance between \
                periodic images along {} is {}, which is smaller than twice the cutoff",
                r_max, name, distances[axis]
            )));
        }
    }

    return Ok(());
}

/// Largest radius usable for a query in `cell`, i.e. half of the smallest
/// distance between opposite faces along periodic axes. This is infinite if
/// the box has no periodic axis.
pub(crate) fn max_query_radius(cell: &SimulationBox) -> f64 {
    let periodic = cell.periodic();
    let distances = cell.nearest_plane_distance();

    let mut radius = f64::INFINITY;
    for axis in 0..3 {
        if periodic[axis] {
            radius = f64::min(radius, 0.5 * distances[axis]);
        }
    }
    return radius;
}
