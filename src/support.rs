//! Support relations of a settled world.
//!
//! Brick `A` supports brick `B` when `B` rests directly on top of `A`: the
//! bottom of `B` is one cell above the top of `A` and their footprints share
//! a column. Bricks with their bottom at `z <= 1` rest on the floor and
//! have no supporters, even when a brick sits below them at `z = 0`.
//! Removing a brick lets every brick fall whose supporters have all fallen,
//! transitively. This gives the same answers as re-settling a copy
//! of the world per removal, without any simulation.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::bricks::BrickId;
use crate::stacking::World;

/// Highest bottom `z` of a brick that settling never lowers.
const FLOOR_Z: i32 = 1;

pub struct SupportGraph {
    ids: Vec<BrickId>,
    /// `supports[i]`: indices of bricks resting on brick `i`.
    supports: Vec<Vec<usize>>,
    /// `supported_by[i]`: indices of bricks brick `i` rests on.
    supported_by: Vec<Vec<usize>>,
}

impl SupportGraph {
    /// Builds the graph for a settled world, keeping the world's brick order.
    pub fn from_world(world: &World) -> Self {
        let bricks = world.bricks();
        let mut supports = vec![Vec::new(); bricks.len()];
        let mut supported_by = vec![Vec::new(); bricks.len()];

        for (lower_index, lower) in bricks.iter().enumerate() {
            for (upper_index, upper) in bricks.iter().enumerate() {
                if upper.lowest_z() <= FLOOR_Z {
                    continue;
                }
                if upper.lowest_z() == lower.highest_z() + 1 && lower.footprint_overlaps(upper) {
                    supports[lower_index].push(upper_index);
                    supported_by[upper_index].push(lower_index);
                }
            }
        }

        Self {
            ids: bricks.iter().map(|brick| brick.id()).collect(),
            supports,
            supported_by,
        }
    }

    /// Ids of the bricks resting directly on `id`.
    pub fn supported(&self, id: BrickId) -> Vec<BrickId> {
        self.index_of(id)
            .map(|index| self.supports[index].iter().map(|&i| self.ids[i]).collect())
            .unwrap_or_default()
    }

    fn index_of(&self, id: BrickId) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }

    /// Bricks whose every dependent has another supporter.
    pub fn disintegration_candidates(&self) -> Vec<BrickId> {
        (0..self.ids.len())
            .filter(|&index| {
                self.supports[index]
                    .iter()
                    .all(|&upper| self.supported_by[upper].len() > 1)
            })
            .map(|index| self.ids[index])
            .collect()
    }

    /// Number of other bricks that fall when brick `index` is removed.
    fn chain_reaction(&self, index: usize) -> usize {
        let mut fallen: FxHashSet<usize> = FxHashSet::default();
        fallen.insert(index);
        let mut queue = VecDeque::from([index]);

        while let Some(current) = queue.pop_front() {
            for &upper in &self.supports[current] {
                if fallen.contains(&upper) {
                    continue;
                }
                // re-checked each time one of its supporters falls
                if self.supported_by[upper].iter().all(|lower| fallen.contains(lower)) {
                    fallen.insert(upper);
                    queue.push_back(upper);
                }
            }
        }

        fallen.len() - 1
    }

    /// Per-brick falling counts, in world order.
    pub fn falling_counts(&self) -> Vec<(BrickId, usize)> {
        (0..self.ids.len())
            .map(|index| (self.ids[index], self.chain_reaction(index)))
            .collect()
    }

    pub fn sum_of_falling_counts(&self) -> usize {
        (0..self.ids.len()).map(|index| self.chain_reaction(index)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bricks::BrickIds;
    use crate::cancel::CancelToken;
    use crate::input::parse_bricks;

    const EXAMPLE: &str = include_str!("../inputs/bricks-example.txt");

    fn settled_example() -> World {
        let corners = parse_bricks(EXAMPLE).unwrap();
        let mut world = World::from_corners(&corners, &mut BrickIds::new()).unwrap();
        world.settle_to_rest().unwrap();
        world
    }

    #[test]
    fn test_example_support_relations() {
        let graph = SupportGraph::from_world(&settled_example());
        assert_eq!(graph.supported(BrickId(1)), vec![BrickId(2), BrickId(3)]);
        assert_eq!(graph.supported(BrickId(6)), vec![BrickId(7)]);
        assert!(graph.supported(BrickId(7)).is_empty());
        assert!(graph.supported(BrickId(42)).is_empty());
    }

    #[test]
    fn test_matches_brute_force_on_example() {
        let world = settled_example();
        let graph = SupportGraph::from_world(&world);
        let cancel = CancelToken::new();

        assert_eq!(
            graph.disintegration_candidates(),
            world.disintegration_candidates(&cancel).unwrap()
        );
        assert_eq!(graph.falling_counts(), world.falling_counts(&cancel).unwrap());
        assert_eq!(graph.sum_of_falling_counts(), 7);
    }

    #[test]
    fn test_bricks_at_floor_level_have_no_supporters() {
        let corners = parse_bricks("0,0,0~0,0,0\n0,0,1~0,0,1\n0,0,2~0,0,2\n").unwrap();
        let mut world = World::from_corners(&corners, &mut BrickIds::new()).unwrap();
        world.settle_to_rest().unwrap();
        let graph = SupportGraph::from_world(&world);
        let cancel = CancelToken::new();

        assert!(graph.supported(BrickId(1)).is_empty());
        assert_eq!(graph.supported(BrickId(2)), vec![BrickId(3)]);
        assert_eq!(
            graph.disintegration_candidates(),
            world.disintegration_candidates(&cancel).unwrap()
        );
        assert_eq!(graph.disintegration_candidates(), vec![BrickId(1), BrickId(3)]);
        assert_eq!(graph.falling_counts(), world.falling_counts(&cancel).unwrap());
        assert_eq!(graph.sum_of_falling_counts(), 1);
    }
}
