//! Puzzle drivers: parse an input, run an engine, report the answers.

use std::fmt;

use log::info;

use crate::bricks::{BrickId, BrickIds};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::frames::StepSink;
use crate::heat_grid::HeatGrid;
use crate::input::{parse_bricks, parse_grid};
use crate::pathfinder::{MoveGraph, RunLimits};
use crate::scenes::{emit_world, SceneObserver};
use crate::stacking::World;
use crate::support::SupportGraph;

/// A puzzle answer, formatted the way it is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    MinimalHeatLoss(u32),
    DisintegrationCandidates(Vec<BrickId>),
    SumFalling(usize),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::MinimalHeatLoss(cost) => write!(f, "MINIMAL HEATLOSS: {cost}"),
            Answer::DisintegrationCandidates(ids) => {
                let names: Vec<String> = ids.iter().map(BrickId::to_string).collect();
                write!(f, "DISINTEGRATION CANDIDATES: [{}], #{}", names.join(", "), ids.len())
            }
            Answer::SumFalling(sum) => write!(f, "SUM FALLING: {sum}"),
        }
    }
}

/// Object-safe interface over the puzzle drivers.
pub trait PuzzleOps {
    fn name(&self) -> &'static str;

    /// Runs the puzzle, streaming frames into `sink`.
    fn solve(&self, sink: &mut dyn StepSink, cancel: &CancelToken) -> Result<Vec<Answer>>;
}

const CELLS_PER_FRAME: usize = 400;

/// Minimal heat loss through a city-block grid.
pub struct HeatLossPuzzle {
    grid: HeatGrid,
    limits: RunLimits,
    /// Emit a frame for every n-th finalized state.
    frame_every: usize,
}

impl HeatLossPuzzle {
    /// Frames default to one per `CELLS_PER_FRAME` grid cells finalized,
    /// which keeps a full search to a few hundred frames on large grids.
    pub fn parse(input: &str, limits: RunLimits) -> Result<Self> {
        let grid = parse_grid(input)?;
        let frame_every = (grid.width() * grid.height() / CELLS_PER_FRAME).max(1);
        Ok(Self {
            grid,
            limits,
            frame_every,
        })
    }

    pub fn with_frame_every(mut self, every: usize) -> Self {
        self.frame_every = every.max(1);
        self
    }
}

impl PuzzleOps for HeatLossPuzzle {
    fn name(&self) -> &'static str {
        "heat loss"
    }

    fn solve(&self, sink: &mut dyn StepSink, cancel: &CancelToken) -> Result<Vec<Answer>> {
        let graph = MoveGraph::build(&self.grid, self.limits);
        let mut observer = SceneObserver::new(sink, self.frame_every);
        let shortest = graph.find_minimal_cost(&mut observer, cancel)?;
        info!(
            "{}x{} grid, runs {}..={}: cost {} over {} runs",
            self.grid.width(),
            self.grid.height(),
            graph.limits().min(),
            graph.limits().max(),
            shortest.cost,
            shortest.runs().len()
        );
        Ok(vec![Answer::MinimalHeatLoss(shortest.cost)])
    }
}

/// How the stacking analysis is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// Re-settle a copy of the world once per removed brick.
    BruteForce,
    /// Derive everything from direct support relations.
    SupportGraph,
}

/// Falling bricks and which of them can be removed safely.
pub struct BrickPuzzle {
    world: World,
    analysis: Analysis,
}

impl BrickPuzzle {
    pub fn parse(input: &str, analysis: Analysis) -> Result<Self> {
        let corners = parse_bricks(input)?;
        let world = World::from_corners(&corners, &mut BrickIds::new())?;
        Ok(Self { world, analysis })
    }
}

impl PuzzleOps for BrickPuzzle {
    fn name(&self) -> &'static str {
        "brick stacking"
    }

    fn solve(&self, sink: &mut dyn StepSink, cancel: &CancelToken) -> Result<Vec<Answer>> {
        let mut world = self.world.clone();
        emit_world(&mut *sink, &world, "init", &[]);

        let passes = world.settle_to_rest_with(cancel, |world, _| {
            emit_world(&mut *sink, world, "falling", &[])
        })?;
        world.verify_no_overlap()?;
        info!("{} bricks settled after {passes} passes", world.len());

        let (candidates, sum_falling) = match self.analysis {
            Analysis::BruteForce => (
                world.disintegration_candidates(cancel)?,
                world.sum_of_falling_counts(cancel)?,
            ),
            Analysis::SupportGraph => {
                let graph = SupportGraph::from_world(&world);
                (graph.disintegration_candidates(), graph.sum_of_falling_counts())
            }
        };
        emit_world(&mut *sink, &world, "disintegration candidates", &candidates);

        Ok(vec![
            Answer::DisintegrationCandidates(candidates),
            Answer::SumFalling(sum_falling),
        ])
    }
}
