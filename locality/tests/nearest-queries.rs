use approx::assert_relative_eq;

use locality::{AabbQuery, LinkCell, NeighborQuery, QueryArgs, SimulationBox, Vector3D};

mod data;

fn indexes<'a>(cell: SimulationBox, points: &'a [Vector3D]) -> Vec<NeighborQuery<'a>> {
    vec![
        NeighborQuery::from(AabbQuery::new(cell, points)),
        NeighborQuery::from(LinkCell::new(cell, points, 1.0).unwrap()),
    ]
}

#[test]
fn exactly_k_neighbors() {
    let cell = SimulationBox::cubic(10.0);
    let points = data::random_points(&cell, 200, 42);

    for query in &indexes(cell, &points) {
        for &k in &[1, 4, 12] {
            let args = QueryArgs::nearest(k).with_exclude_ii(true);
            let list = query.query(&points, args).unwrap().to_neighbor_list();

            assert_eq!(list.num_bonds(), k * points.len());
            assert!(list.counts().iter().all(|&count| count == k));
            for bond in list.iter() {
                assert_ne!(bond.query_point_id, bond.point_id);
            }
        }
    }
}

#[test]
fn closest_neighbors() {
    let cell = SimulationBox::orthorhombic(9.0, 10.0, 11.0);
    let points = data::random_points(&cell, 150, 12);
    let k = 8;

    let brute_force = data::brute_force(&cell, &points, &points, 4.5, true);

    for query in &indexes(cell, &points) {
        let iterator = query.query(&points, QueryArgs::nearest(k).with_exclude_ii(true)).unwrap();

        for i in 0..points.len() {
            let mut expected = brute_force.iter()
                .filter(|pair| pair.0 == i)
                .map(|pair| pair.2)
                .collect::<Vec<_>>();
            expected.sort_by(f64::total_cmp);
            expected.truncate(k);

            let distances = iterator.query_point(i).unwrap()
                .map(|bond| bond.distance)
                .collect::<Vec<_>>();

            // neighbors are produced by increasing distance
            assert!(distances.windows(2).all(|w| w[0] <= w[1]));

            assert_eq!(distances.len(), expected.len());
            for (actual, expected) in distances.iter().zip(&expected) {
                assert_relative_eq!(*actual, *expected, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn fewer_points_than_k() {
    let cell = SimulationBox::square(10.0);
    let points = [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.0, 1.0, 0.0),
        Vector3D::new(-1.5, 1.5, 0.0),
        Vector3D::new(1.5, -2.2, 0.0),
    ];

    for query in &indexes(cell, &points) {
        let iterator = query.query(&points, QueryArgs::nearest(5).with_exclude_ii(true)).unwrap();

        let neighbors = iterator.query_point(0).unwrap()
            .map(|bond| bond.point_id)
            .collect::<Vec<_>>();
        assert_eq!(neighbors, [1, 2, 3]);

        let list = iterator.to_neighbor_list();
        assert_eq!(list.num_bonds(), 12);
        assert_eq!(list.counts(), [3, 3, 3, 3]);
    }
}

/// Check k-nearest queries with both indexes against a brute force search.
/// Neighbors further than `cap` are never searched for.
fn check_nearest_against_brute_force(
    cell: SimulationBox,
    points: &[Vector3D],
    query_points: &[Vector3D],
    k: usize,
    cap: f64,
    exclude_ii: bool,
) {
    let brute_force = data::brute_force(&cell, points, query_points, cap, exclude_ii);

    for query in &indexes(cell, points) {
        let args = QueryArgs::nearest(k).with_exclude_ii(exclude_ii);
        let iterator = query.query(query_points, args).unwrap();

        for i in 0..query_points.len() {
            let mut expected = brute_force.iter()
                .filter(|pair| pair.0 == i)
                .map(|pair| (pair.2, pair.1))
                .collect::<Vec<_>>();
            expected.sort_by(|a, b| f64::total_cmp(&a.0, &b.0));
            expected.truncate(k);

            let actual = iterator.query_point(i).unwrap()
                .map(|bond| (bond.distance, bond.point_id))
                .collect::<Vec<_>>();

            assert_eq!(actual.len(), expected.len());
            for (actual, expected) in actual.iter().zip(&expected) {
                assert_eq!(actual.1, expected.1);
                assert_relative_eq!(actual.0, expected.0, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn partially_periodic() {
    let cell = SimulationBox::orthorhombic(10.0, 10.0, 6.0).with_periodic([true, false, false]);
    let points = data::random_points(&cell, 200, 21);

    // half of the box along x, the only periodic axis
    check_nearest_against_brute_force(cell, &points, &points, 6, 5.0, true);

    // query points outside of the box along the non periodic axes
    let query_points = points.iter()
        .take(40)
        .map(|&point| point + Vector3D::new(13.0, 2.5, 4.0))
        .collect::<Vec<_>>();
    check_nearest_against_brute_force(cell, &points, &query_points, 6, 5.0, false);
}

#[test]
fn non_periodic() {
    let cell = SimulationBox::orthorhombic(8.0, 9.0, 10.0).with_periodic([false, false, false]);
    let points = data::random_points(&cell, 150, 22);

    // all points can be found
    check_nearest_against_brute_force(cell, &points, &points, 10, f64::INFINITY, true);
    check_nearest_against_brute_force(cell, &points, &points, 200, f64::INFINITY, true);

    let query_points = [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(25.0, -3.0, 1.0),
        Vector3D::new(-7.0, 12.0, -40.0),
    ];
    check_nearest_against_brute_force(cell, &points, &query_points, 5, f64::INFINITY, false);

    let cell = SimulationBox::rectangle(10.0, 7.0).with_periodic([false, false, false]);
    let points = data::random_points(&cell, 100, 23);
    check_nearest_against_brute_force(cell, &points, &points, 7, f64::INFINITY, true);

    let query_points = [Vector3D::new(18.0, 2.0, 0.0), Vector3D::new(-1.0, -30.0, 0.0)];
    check_nearest_against_brute_force(cell, &points, &query_points, 3, f64::INFINITY, false);
}

#[test]
fn within_r_max() {
    let cell = SimulationBox::cubic(10.0);
    let points = data::random_points(&cell, 200, 7);

    for query in &indexes(cell, &points) {
        let args = QueryArgs {
            num_neighbors: Some(6),
            r_max: Some(1.2),
            exclude_ii: true,
            ..Default::default()
        };

        let list = query.query(&points, args).unwrap().to_neighbor_list();
        let expected = data::brute_force(&cell, &points, &points, 1.2, true);

        assert!(list.distances().iter().all(|&distance| distance < 1.2));
        for (i, &count) in list.counts().iter().enumerate() {
            let available = expected.iter().filter(|pair| pair.0 == i).count();
            assert_eq!(count, usize::min(available, 6));
        }
    }
}

#[test]
fn idempotence() {
    let cell = SimulationBox::triclinic(8.0, 9.0, 10.0, 85.0, 90.0, 100.0);
    let points = data::random_points(&cell, 200, 9);

    for query in &indexes(cell, &points) {
        for args in [QueryArgs::nearest(6), QueryArgs::ball(2.0)] {
            let iterator = query.query(&points, args).unwrap();
            let first = iterator.to_neighbor_list();
            let second = iterator.to_neighbor_list();
            assert_eq!(first, second);

            let again = query.query(&points, args).unwrap().to_neighbor_list();
            assert_eq!(first, again);
        }
    }
}
