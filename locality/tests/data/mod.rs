#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use locality::{NeighborBond, SimulationBox, Vector3D};

/// Generate `count` points uniformly distributed inside `cell`
pub fn random_points(cell: &SimulationBox, count: usize, seed: u64) -> Vec<Vector3D> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| {
        let fractional = Vector3D::new(rng.gen(), rng.gen(), rng.gen());
        cell.cartesian(fractional)
    }).collect()
}

/// Find all pairs closer than `r_max` by checking every pair, using the
/// minimum image convention. The pairs are sorted by query point, then point.
pub fn brute_force(
    cell: &SimulationBox,
    points: &[Vector3D],
    query_points: &[Vector3D],
    r_max: f64,
    exclude_ii: bool,
) -> Vec<(usize, usize, f64)> {
    let mut pairs = Vec::new();
    for (i, &query_point) in query_points.iter().enumerate() {
        for (j, &point) in points.iter().enumerate() {
            if exclude_ii && i == j {
                continue;
            }

            let distance = cell.distance(query_point, point);
            if distance < r_max {
                pairs.push((i, j, distance));
            }
        }
    }
    return pairs;
}

/// Sort bonds by query point, then point
pub fn sorted_pairs(bonds: impl IntoIterator<Item = NeighborBond>) -> Vec<(usize, usize, f64)> {
    let mut pairs = bonds.into_iter()
        .map(|bond| (bond.query_point_id, bond.point_id, bond.distance))
        .collect::<Vec<_>>();
    pairs.sort_unstable_by_key(|&(i, j, _)| (i, j));
    return pairs;
}

/// Check that two sorted lists of pairs contain the same pairs at the same
/// distances
pub fn assert_same_pairs(actual: &[(usize, usize, f64)], expected: &[(usize, usize, f64)]) {
    assert_eq!(actual.len(), expected.len(), "different number of pairs");
    for (a, e) in actual.iter().zip(expected) {
        assert_eq!((a.0, a.1), (e.0, e.1));
        approx::assert_relative_eq!(a.2, e.2, epsilon = 1e-9);
    }
}
