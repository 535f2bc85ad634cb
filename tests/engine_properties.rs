//! Property tests for the search and the brick engine.
//!
//! Invariants covered:
//! - Finalized search costs never decrease.
//! - Returned paths alternate axes within the run limits.
//! - A path costs exactly the heat of the cells it enters.
//! - A settled world is a fixed point of settling and has no shared cells.
//! - The brute-force and support-graph analyses agree.

use proptest::prelude::*;

use gridfall::bricks::{Brick, BrickId, BrickIds};
use gridfall::error::SearchError;
use gridfall::geometry::Point3;
use gridfall::input::parse_grid;
use gridfall::pathfinder::{MoveGraph, PoppedState, PredecessorTree, RunLimits, SearchObserver};
use gridfall::stacking::World;
use gridfall::support::SupportGraph;
use gridfall::CancelToken;

#[derive(Default)]
struct CostLog(Vec<u32>);

impl SearchObserver for CostLog {
    fn on_pop(&mut self, popped: &PoppedState, _: &PredecessorTree, _: &MoveGraph) {
        self.0.push(popped.cost);
    }
}

fn grid_text() -> impl Strategy<Value = String> {
    (1usize..8, 1usize..8).prop_flat_map(|(width, height)| {
        prop::collection::vec(prop::collection::vec(0u8..=9, width), height).prop_map(|rows| {
            rows.iter()
                .map(|row| row.iter().map(|d| char::from(b'0' + d)).collect::<String>())
                .collect::<Vec<_>>()
                .join("\n")
        })
    })
}

fn run_limits() -> impl Strategy<Value = RunLimits> {
    (1usize..=4, 0usize..=5).prop_map(|(min, extra)| RunLimits::new(min, min + extra).unwrap())
}

/// Bricks as `(x, y, z, axis, extra length)`; overlapping ones are skipped.
fn worlds() -> impl Strategy<Value = World> {
    let shape = (0i32..4, 0i32..4, 0i32..8, 0usize..3, 0i32..3);
    prop::collection::vec(shape, 1..12).prop_map(|shapes| {
        let mut ids = BrickIds::new();
        let mut world = World::new();
        for (x, y, z, axis, extra) in shapes {
            let from = Point3::new(x, y, z);
            let to = match axis {
                0 => Point3::new(x + extra, y, z),
                1 => Point3::new(x, y + extra, z),
                _ => Point3::new(x, y, z + extra),
            };
            let Ok(brick) = Brick::new(ids.next_id(), from, to) else {
                continue;
            };
            if world.bricks().iter().all(|other| !brick.overlaps(other)) {
                world.add_brick(brick);
            }
        }
        world
    })
}

fn sorted(mut ids: Vec<BrickId>) -> Vec<BrickId> {
    ids.sort();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn popped_costs_never_decrease(text in grid_text(), limits in run_limits()) {
        let grid = parse_grid(&text).unwrap();
        let graph = MoveGraph::build(&grid, limits);
        let mut log = CostLog::default();
        let _ = graph.find_minimal_cost(&mut log, &CancelToken::new());
        prop_assert!(log.0.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn shortest_paths_respect_the_run_rules(text in grid_text(), limits in run_limits()) {
        let grid = parse_grid(&text).unwrap();
        let graph = MoveGraph::build(&grid, limits);
        let shortest = match graph.find_minimal_cost(&mut (), &CancelToken::new()) {
            Ok(shortest) => shortest,
            Err(SearchError::Unreachable { .. }) => return Ok(()),
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        };

        let runs = shortest.runs();
        prop_assert!(runs.iter().all(|&(_, length)| limits.allows(length)));
        prop_assert!(runs.windows(2).all(|pair| pair[0].0 != pair[1].0));

        let cells = shortest.cells();
        prop_assert_eq!(cells.first().copied(), Some((0, 0)));
        prop_assert_eq!(cells.last().copied(), Some((grid.width() - 1, grid.height() - 1)));
        let heat: u32 = cells[1..]
            .iter()
            .map(|&(x, y)| grid.get(x as isize, y as isize).unwrap())
            .sum();
        prop_assert_eq!(heat, shortest.cost);
    }

    #[test]
    fn settled_worlds_are_at_rest(mut world in worlds()) {
        let initial = world.clone();
        world.settle_to_rest().unwrap();
        prop_assert!(world.verify_no_overlap().is_ok());

        // bricks never rise, and only bricks given at z = 0 end there
        for before in initial.bricks() {
            let after = world.bricks().iter().find(|brick| brick.id() == before.id()).unwrap();
            prop_assert!(after.lowest_z() <= before.lowest_z());
            prop_assert!(after.lowest_z() >= before.lowest_z().min(1));
        }

        let settled = world.clone();
        prop_assert_eq!(world.settle(), 0);
        prop_assert_eq!(world, settled);
    }

    #[test]
    fn analyses_agree(mut world in worlds()) {
        world.settle_to_rest().unwrap();
        let cancel = CancelToken::new();
        let graph = SupportGraph::from_world(&world);

        prop_assert_eq!(
            sorted(world.disintegration_candidates(&cancel).unwrap()),
            sorted(graph.disintegration_candidates())
        );
        prop_assert_eq!(
            world.sum_of_falling_counts(&cancel).unwrap(),
            graph.sum_of_falling_counts()
        );

        // bricks carrying nothing can always go, the topmost one included
        let candidates = graph.disintegration_candidates();
        for brick in world.bricks() {
            if graph.supported(brick.id()).is_empty() {
                prop_assert!(candidates.contains(&brick.id()));
            }
        }
        if let Some(top) = world.bricks().iter().max_by_key(|brick| brick.highest_z()) {
            prop_assert!(graph.supported(top.id()).is_empty());
        }
    }
}
