//! Converters from engine state to animation frames.
//!
//! Viewer space uses `y` as the up axis. Search states are drawn on two
//! stacked layers, one per axis of the last move; bricks are drawn cube by
//! cube with their puzzle `z` mapped to viewer `y`.

use rustc_hash::FxHashSet;

use crate::bricks::BrickId;
use crate::frames::{ColorClass, Drawable, StepSink};
use crate::heat_grid::Pos;
use crate::pathfinder::{MoveGraph, PoppedState, PredecessorTree, SearchObserver};
use crate::stacking::World;

/// Vertical distance between the two search-state layers.
const LAYER_SPACING: f32 = 2.0;
const STATE_SIZE: f32 = 0.1;
const TREE_LINE_SIZE: f32 = 0.02;
const CUBE_SIZE: f32 = 0.9;

fn state_position(pos: &Pos) -> [f32; 3] {
    [pos.x as f32, pos.axis.layer() as f32 * LAYER_SPACING, pos.y as f32]
}

/// Draws every search state plus the finalized predecessor tree, with the
/// path to the just-popped state highlighted.
pub fn search_snapshot(
    popped: &PoppedState,
    tree: &PredecessorTree,
    graph: &MoveGraph,
) -> Vec<Drawable> {
    let current_path: FxHashSet<Pos> = tree.path_to(popped.pos).into_iter().collect();
    let mut objects = Vec::with_capacity(graph.width() * graph.height() * 2 + tree.len());

    for pos in graph.states() {
        let class = if current_path.contains(&pos) {
            ColorClass::Current
        } else if tree.contains(&pos) {
            ColorClass::Known
        } else {
            ColorClass::Background
        };
        objects.push(Drawable::Point {
            id: pos.to_string(),
            at: state_position(&pos),
            size: STATE_SIZE,
            class,
        });
    }

    for (pos, from) in tree.links() {
        if pos == from {
            continue;
        }
        let class = if current_path.contains(pos) {
            ColorClass::Current
        } else {
            ColorClass::Known
        };
        objects.push(Drawable::Line {
            id: format!("{from}{pos}"),
            from: state_position(from),
            to: state_position(pos),
            size: TREE_LINE_SIZE,
            class,
        });
    }

    objects
}

/// Forwards every `every`-th finalized search state to a sink as a frame.
pub struct SceneObserver<'a, S: StepSink + ?Sized> {
    sink: &'a mut S,
    every: usize,
    seen: usize,
}

impl<'a, S: StepSink + ?Sized> SceneObserver<'a, S> {
    pub fn new(sink: &'a mut S, every: usize) -> Self {
        Self {
            sink,
            every: every.max(1),
            seen: 0,
        }
    }
}

impl<S: StepSink + ?Sized> SearchObserver for SceneObserver<'_, S> {
    fn on_pop(&mut self, popped: &PoppedState, tree: &PredecessorTree, graph: &MoveGraph) {
        self.seen += 1;
        if (self.seen - 1) % self.every != 0 {
            return;
        }
        let objects = search_snapshot(popped, tree, graph);
        if !self.sink.is_scaled() {
            self.sink.adjust_scale(&objects);
        }
        let label = format!("{}->{}|{}", popped.from, popped.pos, popped.cost);
        self.sink.add_step(&label, objects);
    }
}

/// Draws every cube of every brick; `marked` bricks get their own class.
pub fn bricks_snapshot(world: &World, marked: &[BrickId]) -> Vec<Drawable> {
    let marked: FxHashSet<BrickId> = marked.iter().copied().collect();
    let mut objects = Vec::new();

    for brick in world.bricks() {
        let class = if marked.contains(&brick.id()) {
            ColorClass::Marked
        } else {
            ColorClass::Known
        };
        for (index, cube) in brick.cubes().enumerate() {
            objects.push(Drawable::Point {
                id: format!("{}-{index}", brick.id()),
                at: [cube.x as f32, cube.z as f32, cube.y as f32],
                size: CUBE_SIZE,
                class,
            });
        }
    }

    objects
}

/// Sends the world as one labeled frame, fitting the view on first use.
pub fn emit_world<S: StepSink + ?Sized>(
    sink: &mut S,
    world: &World,
    label: &str,
    marked: &[BrickId],
) {
    let objects = bricks_snapshot(world, marked);
    if !sink.is_scaled() {
        sink.adjust_scale(&objects);
    }
    sink.add_step(label, objects);
}
