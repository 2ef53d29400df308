use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use locality::{AabbQuery, LinkCell, NeighborQuery, QueryArgs, SimulationBox, Vector3D};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// Random points in a cubic box, with a density of 1
fn random_system(n_points: usize) -> (SimulationBox, Vec<Vector3D>) {
    let cell = SimulationBox::cubic(f64::cbrt(n_points as f64));
    let mut rng = ChaCha8Rng::seed_from_u64(n_points as u64);
    let points = (0..n_points)
        .map(|_| cell.cartesian(Vector3D::new(rng.gen(), rng.gen(), rng.gen())))
        .collect();
    return (cell, points);
}

fn build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build index");
    group.noise_threshold(0.05);

    for &n_points in black_box(&[1_000, 10_000, 100_000]) {
        let (cell, points) = random_system(n_points);

        group.bench_function(format!("AABB tree, n = {}", n_points), |b| b.iter(|| {
            AabbQuery::new(cell, &points)
        }));

        group.bench_function(format!("cell list, n = {}", n_points), |b| b.iter(|| {
            LinkCell::new(cell, &points, 2.5).unwrap()
        }));
    }
}

fn ball_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("ball query (per point)");
    group.noise_threshold(0.05);

    let (cell, points) = random_system(10_000);
    let queries = [
        ("AABB tree", NeighborQuery::from(AabbQuery::new(cell, &points))),
        ("cell list", NeighborQuery::from(LinkCell::new(cell, &points, 2.5).unwrap())),
    ];

    for &r_max in black_box(&[1.0, 2.5, 4.0]) {
        let args = QueryArgs::ball(r_max).with_exclude_ii(true);
        for (name, query) in &queries {
            group.bench_function(format!("{}, r_max = {}", name, r_max), |b| b.iter_custom(|repeat| {
                let start = std::time::Instant::now();
                for _ in 0..repeat {
                    let list = query.query(&points, args).unwrap().to_neighbor_list();
                    black_box(list);
                }
                start.elapsed() / points.len() as u32
            }));
        }
    }
}

fn nearest_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest query (per point)");
    group.noise_threshold(0.05);

    let (cell, points) = random_system(10_000);
    let queries = [
        ("AABB tree", NeighborQuery::from(AabbQuery::new(cell, &points))),
        ("cell list", NeighborQuery::from(LinkCell::new(cell, &points, 2.5).unwrap())),
    ];

    for &k in black_box(&[1, 6, 24]) {
        let args = QueryArgs::nearest(k).with_exclude_ii(true);
        for (name, query) in &queries {
            group.bench_function(format!("{}, k = {}", name, k), |b| b.iter_custom(|repeat| {
                let start = std::time::Instant::now();
                for _ in 0..repeat {
                    let list = query.query(&points, args).unwrap().to_neighbor_list();
                    black_box(list);
                }
                start.elapsed() / points.len() as u32
            }));
        }
    }
}

criterion_group!(benches, build, ball_query, nearest_query);
criterion_main!(benches);
