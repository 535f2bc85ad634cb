//! Gravity settling of bricks and brute-force support analysis.
//!
//! Settling works in passes. Each pass visits the bricks in ascending order
//! of their lowest `z` and offers every brick a drop of one cell, accepted
//! only if the brick stays above the floor (`z = 0`) and does not overlap a
//! brick already placed in the same pass. Visiting low bricks first means a
//! brick never drops into a cell that a lower, not yet visited brick still
//! occupies. Repeating passes until none moves yields the settled world.
//!
//! The analysis functions re-settle a copy of the world with one brick
//! removed, once per brick. `support::SupportGraph` computes the same
//! answers without re-simulating.

use std::fmt;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::bricks::{Brick, BrickId, BrickIds};
use crate::cancel::CancelToken;
use crate::error::ModelError;
use crate::input::BrickCorners;

/// An ordered collection of bricks above the floor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    bricks: Vec<Brick>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a world from parsed corners, assigning ids in input order.
    pub fn from_corners(corners: &[BrickCorners], ids: &mut BrickIds) -> Result<Self, ModelError> {
        let bricks = corners
            .iter()
            .map(|&(from, to)| Brick::new(ids.next_id(), from, to))
            .collect::<Result<_, _>>()?;
        Ok(Self { bricks })
    }

    pub fn add_brick(&mut self, brick: Brick) {
        self.bricks.push(brick);
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    /// Runs one settling pass and returns how many bricks dropped a cell.
    pub fn settle(&mut self) -> usize {
        let mut pending = std::mem::take(&mut self.bricks);
        // stable, so bricks at equal height keep their relative order
        pending.sort_by_key(Brick::lowest_z);

        let mut placed: Vec<Brick> = Vec::with_capacity(pending.len());
        let mut moved = 0;

        for brick in pending {
            let lower = brick.down();
            if lower.lowest_z() > 0 && !placed.iter().any(|other| lower.overlaps(other)) {
                moved += 1;
                placed.push(lower);
            } else {
                placed.push(brick);
            }
        }

        self.bricks = placed;
        moved
    }

    /// Upper bound on the number of settling passes before rest.
    ///
    /// Every pass that moves anything lowers at least one brick by a cell,
    /// and a brick with lowest `z = h` can drop at most `h - 1` cells, so the
    /// total drop potential plus the final quiet pass bounds the loop.
    pub fn pass_limit(&self) -> usize {
        let potential: usize = self
            .bricks
            .iter()
            .map(|brick| (brick.lowest_z() - 1).max(0) as usize)
            .sum();
        potential + 1
    }

    /// Settles until a pass moves nothing; returns the number of moving passes.
    pub fn settle_to_rest(&mut self) -> Result<usize, ModelError> {
        self.settle_to_rest_with(&CancelToken::new(), |_, _| {})
    }

    /// Like [`World::settle_to_rest`], calling `on_pass` after every pass
    /// that moved at least one brick.
    pub fn settle_to_rest_with<F>(
        &mut self,
        cancel: &CancelToken,
        mut on_pass: F,
    ) -> Result<usize, ModelError>
    where
        F: FnMut(&World, usize),
    {
        let limit = self.pass_limit();
        let mut moving_passes = 0;

        for _ in 0..limit {
            if cancel.is_cancelled() {
                return Err(ModelError::Cancelled);
            }
            let moved = self.settle();
            if moved == 0 {
                debug!(
                    "settled {} bricks after {} moving passes",
                    self.bricks.len(),
                    moving_passes
                );
                return Ok(moving_passes);
            }
            moving_passes += 1;
            trace!("pass {moving_passes}: {moved} bricks dropped");
            on_pass(self, moved);
        }

        Err(ModelError::SettleDidNotConverge { passes: limit })
    }

    /// Fails on the first pair of bricks sharing a cell.
    pub fn verify_no_overlap(&self) -> Result<(), ModelError> {
        for (index, first) in self.bricks.iter().enumerate() {
            let later = &self.bricks[index + 1..];
            if let Some(second) = later.iter().find(|other| first.overlaps(other)) {
                return Err(ModelError::OccupiedTwice {
                    first: first.id(),
                    second: second.id(),
                });
            }
        }
        Ok(())
    }

    /// A copy of the world without the given brick.
    pub fn without(&self, id: BrickId) -> World {
        World {
            bricks: self.bricks.iter().filter(|brick| brick.id() != id).copied().collect(),
        }
    }

    /// Bricks whose removal lets nothing else fall, in world order.
    ///
    /// Expects a settled world. One pass is enough per removal: if nothing
    /// moves in the first pass, nothing ever will.
    pub fn disintegration_candidates(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<BrickId>, ModelError> {
        let mut candidates = Vec::new();
        for brick in &self.bricks {
            if cancel.is_cancelled() {
                return Err(ModelError::Cancelled);
            }
            if self.without(brick.id()).settle() == 0 {
                candidates.push(brick.id());
            }
        }
        Ok(candidates)
    }

    /// For every brick, how many other bricks move when it alone is removed
    /// and the rest is settled to rest again.
    pub fn falling_counts(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<(BrickId, usize)>, ModelError> {
        let before: FxHashMap<BrickId, Brick> =
            self.bricks.iter().map(|brick| (brick.id(), *brick)).collect();
        let mut counts = Vec::with_capacity(self.bricks.len());

        for brick in &self.bricks {
            let mut rest = self.without(brick.id());
            rest.settle_to_rest_with(cancel, |_, _| {})?;
            let fallen = rest
                .bricks
                .iter()
                .filter(|after| before.get(&after.id()) != Some(*after))
                .count();
            counts.push((brick.id(), fallen));
        }

        Ok(counts)
    }

    /// Sum of [`World::falling_counts`] over all bricks.
    pub fn sum_of_falling_counts(&self, cancel: &CancelToken) -> Result<usize, ModelError> {
        Ok(self.falling_counts(cancel)?.iter().map(|(_, count)| count).sum())
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, brick) in self.bricks.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{brick}")?;
        }
        Ok(())
    }
}
