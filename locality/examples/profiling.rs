use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use locality::{AabbQuery, LinkCell, NeighborList, NeighborQuery, QueryArgs, SimulationBox, Vector3D};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n_points = match std::env::args().nth(1) {
        Some(value) => value.parse()?,
        None => 10_000,
    };

    // enable collection of profiling data
    time_graph::enable_data_collection(true);
    // clear any existing collected data
    time_graph::clear_collected_data();

    // run the queries
    let lists = find_neighbors(n_points)?;
    for (name, list) in &lists {
        println!("{}: {} bonds", name, list.num_bonds());
    }

    // get the call graph and display it
    let graph = time_graph::get_full_graph();
    // (this requires the "table" feature for the time_graph crate)
    println!("{}", graph.as_short_table());

    // also available for saving profiling data to the disk & future analysis
    // (this requires the "json" feature for the time_graph crate)
    println!("{}", graph.as_json());

    Ok(())
}

/// Find the neighbors of `n_points` random points in a cubic box with a
/// density of 1, using both spatial indexes and both kinds of queries
fn find_neighbors(n_points: usize) -> Result<Vec<(&'static str, NeighborList)>, Box<dyn std::error::Error>> {
    let cell = SimulationBox::cubic(f64::cbrt(n_points as f64));
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let points = (0..n_points)
        .map(|_| cell.cartesian(Vector3D::new(rng.gen(), rng.gen(), rng.gen())))
        .collect::<Vec<_>>();

    let r_max = f64::min(2.5, 0.45 * cell.min_nearest_plane_distance());
    let ball = QueryArgs::ball(r_max).with_exclude_ii(true);
    let nearest = QueryArgs::nearest(12).with_exclude_ii(true);

    let mut lists = Vec::new();
    time_graph::spanned!("AABB tree", {
        let query = NeighborQuery::from(AabbQuery::new(cell, &points));
        lists.push(("aabb ball", query.query(&points, ball)?.to_neighbor_list()));
        lists.push(("aabb nearest", query.query(&points, nearest)?.to_neighbor_list()));
    });

    time_graph::spanned!("cell list", {
        let query = NeighborQuery::from(LinkCell::new(cell, &points, r_max)?);
        lists.push(("link cell ball", query.query(&points, ball)?.to_neighbor_list()));
        lists.push(("link cell nearest", query.query(&points, nearest)?.to_neighbor_list()));
    });

    Ok(lists)
}
