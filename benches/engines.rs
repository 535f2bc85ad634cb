//! Benchmarks for the heat-loss search and the brick engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gridfall::bricks::BrickIds;
use gridfall::input::{parse_bricks, parse_grid};
use gridfall::pathfinder::{MoveGraph, RunLimits};
use gridfall::stacking::World;
use gridfall::support::SupportGraph;
use gridfall::CancelToken;

const GRID: &str = include_str!("../inputs/heat-loss-example.txt");
const BRICKS: &str = include_str!("../inputs/bricks-example.txt");

fn example_world() -> World {
    let corners = parse_bricks(BRICKS).unwrap();
    World::from_corners(&corners, &mut BrickIds::new()).unwrap()
}

/// Benchmark precomputing the run moves of every search state.
fn bench_build_moves(c: &mut Criterion) {
    let grid = parse_grid(GRID).unwrap();

    c.bench_function("build_move_graph", |b| {
        b.iter(|| MoveGraph::build(black_box(&grid), RunLimits::ULTRA_CRUCIBLE))
    });
}

/// Benchmark the shortest path search under both run limits.
fn bench_search(c: &mut Criterion) {
    let grid = parse_grid(GRID).unwrap();
    let mut group = c.benchmark_group("minimal_heat_loss");

    for (name, limits) in [
        ("crucible", RunLimits::CRUCIBLE),
        ("ultra_crucible", RunLimits::ULTRA_CRUCIBLE),
    ] {
        let graph = MoveGraph::build(&grid, limits);
        group.bench_function(name, |b| {
            b.iter(|| black_box(&graph).find_minimal_cost(&mut (), &CancelToken::new()))
        });
    }
    group.finish();
}

/// Benchmark settling the example stack from its initial snapshot.
fn bench_settle(c: &mut Criterion) {
    let world = example_world();

    c.bench_function("settle_to_rest", |b| {
        b.iter(|| {
            let mut world = black_box(&world).clone();
            world.settle_to_rest()
        })
    });
}

/// Benchmark both analyses on the settled example.
fn bench_analysis(c: &mut Criterion) {
    let mut world = example_world();
    world.settle_to_rest().unwrap();
    let mut group = c.benchmark_group("analysis");

    group.bench_function("brute_force", |b| {
        b.iter(|| {
            let cancel = CancelToken::new();
            let world = black_box(&world);
            (
                world.disintegration_candidates(&cancel),
                world.sum_of_falling_counts(&cancel),
            )
        })
    });
    group.bench_function("support_graph", |b| {
        b.iter(|| {
            let graph = SupportGraph::from_world(black_box(&world));
            (graph.disintegration_candidates(), graph.sum_of_falling_counts())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build_moves, bench_search, bench_settle, bench_analysis);
criterion_main!(benches);
