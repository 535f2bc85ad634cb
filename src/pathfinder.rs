//! Minimum heat-loss search with run-length constrained moves.
//!
//! The search runs over states `(x, y, axis)` rather than plain cells. Every
//! edge of the move graph is one straight run of `min..=max` cells followed
//! by a mandatory 90 degree turn, so consecutive runs alternate axis without
//! any path history. Edge costs are non-negative, which makes a plain
//! label-setting (Dijkstra) search exact: the first destination state popped
//! from the frontier carries the optimal cost.
//!
//! Key choices:
//! - Moves are precomputed once into a flat table indexed by state.
//! - Frontier ties are broken by insertion order, so results are reproducible.
//! - Stale frontier entries are skipped instead of decreased in place.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use rustc_hash::FxHashMap;

use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::heat_grid::{Axis, HeatGrid, Pos};

/// Inclusive bounds on the length of a single straight run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    min: usize,
    max: usize,
}

impl RunLimits {
    /// At most three cells before turning.
    pub const CRUCIBLE: Self = Self { min: 1, max: 3 };
    /// Four to ten cells before turning.
    pub const ULTRA_CRUCIBLE: Self = Self { min: 4, max: 10 };

    pub fn new(min: usize, max: usize) -> Result<Self, SearchError> {
        if min == 0 || min > max {
            return Err(SearchError::InvalidRunLimits { min, max });
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> usize {
        self.min
    }

    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    #[inline]
    pub fn allows(&self, run_length: usize) -> bool {
        (self.min..=self.max).contains(&run_length)
    }
}

/// A precomputed edge: one run ending in `target`, costing the heat loss of
/// every entered cell (the source cell excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub target: Pos,
    pub cost: u32,
}

/// Adjacency lists for every search state of a grid.
pub struct MoveGraph {
    width: usize,
    height: usize,
    limits: RunLimits,
    /// Indexed by `state_index`.
    moves: Vec<Vec<Move>>,
}

impl MoveGraph {
    /// Precomputes all runs for both axis variants of every cell.
    ///
    /// A state whose last move was along one axis only gets runs along the
    /// other axis, in both directions. Runs never leave the grid.
    pub fn build(grid: &HeatGrid, limits: RunLimits) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let mut moves = Vec::with_capacity(width * height * 2);

        for y in 0..height {
            for x in 0..width {
                for axis in Axis::BOTH {
                    moves.push(runs_from(grid, x, y, axis.turn(), limits));
                }
            }
        }

        debug!(
            "built move graph for {}x{} grid, runs {}..={}, {} edges",
            width,
            height,
            limits.min,
            limits.max,
            moves.iter().map(Vec::len).sum::<usize>()
        );

        Self {
            width,
            height,
            limits,
            moves,
        }
    }

    #[inline]
    fn state_index(&self, pos: &Pos) -> usize {
        (pos.y * self.width + pos.x) * 2 + pos.axis.layer()
    }

    /// The moves leaving a state; empty for states outside the grid.
    pub fn moves(&self, pos: &Pos) -> &[Move] {
        if pos.x >= self.width || pos.y >= self.height {
            return &[];
        }
        &self.moves[self.state_index(pos)]
    }

    /// Every search state, row by row.
    pub fn states(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .flat_map(move |x| Axis::BOTH.into_iter().map(move |axis| Pos::new(x, y, axis)))
        })
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn is_destination(&self, pos: &Pos) -> bool {
        pos.x + 1 == self.width && pos.y + 1 == self.height
    }

    /// Finds the cheapest path from the top-left to the bottom-right cell.
    ///
    /// The observer sees every state as it is finalized. The cancel token is
    /// polled once per frontier pop.
    pub fn find_minimal_cost<O>(
        &self,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> Result<ShortestPath, SearchError>
    where
        O: SearchObserver + ?Sized,
    {
        let mut best_cost: FxHashMap<Pos, u32> = FxHashMap::default();
        let mut tree = PredecessorTree::default();
        let mut frontier = Frontier::default();
        let mut stats = SearchStats::default();

        for axis in Axis::BOTH {
            let origin = Pos::new(0, 0, axis);
            best_cost.insert(origin, 0);
            frontier.push(0, origin, origin);
            stats.pushed += 1;
        }

        while let Some(entry) = frontier.pop() {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            // a cheaper entry for this state was already expanded
            if best_cost.get(&entry.pos).is_some_and(|&best| entry.cost > best) {
                stats.stale += 1;
                continue;
            }
            stats.popped += 1;

            tree.insert(entry.pos, entry.from);
            let popped = PoppedState {
                pos: entry.pos,
                from: entry.from,
                cost: entry.cost,
            };
            observer.on_pop(&popped, &tree, self);

            if self.is_destination(&entry.pos) {
                debug!(
                    "reached destination with cost {} after {} pops ({} pushed, {} stale)",
                    entry.cost, stats.popped, stats.pushed, stats.stale
                );
                return Ok(ShortestPath {
                    cost: entry.cost,
                    path: tree.path_to(entry.pos),
                    stats,
                });
            }

            for step in self.moves(&entry.pos) {
                let candidate = entry.cost + step.cost;
                let improves = best_cost
                    .get(&step.target)
                    .map_or(true, |&best| candidate < best);
                if improves {
                    best_cost.insert(step.target, candidate);
                    frontier.push(candidate, step.target, entry.pos);
                    stats.pushed += 1;
                }
            }
        }

        let (x, y) = (self.width.saturating_sub(1), self.height.saturating_sub(1));
        debug!("frontier exhausted after {} pops without reaching ({x},{y})", stats.popped);
        Err(SearchError::Unreachable { x, y })
    }
}

/// Builds the runs leaving `(x, y)` along `run_axis`, forward and backward.
fn runs_from(grid: &HeatGrid, x: usize, y: usize, run_axis: Axis, limits: RunLimits) -> Vec<Move> {
    let mut runs = Vec::with_capacity(2 * (limits.max - limits.min + 1));

    for sign in [1isize, -1] {
        let mut cost = 0;
        for step in 1..=limits.max as isize {
            let (tx, ty) = match run_axis {
                Axis::Horizontal => (x as isize + sign * step, y as isize),
                Axis::Vertical => (x as isize, y as isize + sign * step),
            };
            let Some(cell_cost) = grid.get(tx, ty) else {
                break;
            };
            cost += cell_cost;
            if step as usize >= limits.min {
                runs.push(Move {
                    target: Pos::new(tx as usize, ty as usize, run_axis),
                    cost,
                });
            }
        }
    }

    runs
}

/// A frontier entry: the cost to reach `pos` via `from`.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    cost: u32,
    seq: u64,
    pos: Pos,
    from: Pos,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // reversed so the max-heap yields the cheapest, then the oldest entry
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue ordered by cost, then insertion order.
#[derive(Default)]
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_seq: u64,
}

impl Frontier {
    fn push(&mut self, cost: u32, pos: Pos, from: Pos) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(FrontierEntry {
            cost,
            seq,
            pos,
            from,
        });
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }
}

/// A state at the moment it is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoppedState {
    pub pos: Pos,
    /// The predecessor; the origin states are their own predecessors.
    pub from: Pos,
    pub cost: u32,
}

/// Predecessor links of every finalized state.
#[derive(Debug, Default, Clone)]
pub struct PredecessorTree {
    links: FxHashMap<Pos, Pos>,
}

impl PredecessorTree {
    fn insert(&mut self, pos: Pos, from: Pos) {
        self.links.insert(pos, from);
    }

    pub fn predecessor(&self, pos: &Pos) -> Option<Pos> {
        self.links.get(pos).copied()
    }

    pub fn contains(&self, pos: &Pos) -> bool {
        self.links.contains_key(pos)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates `(state, predecessor)` links.
    pub fn links(&self) -> impl Iterator<Item = (&Pos, &Pos)> {
        self.links.iter()
    }

    /// Walks predecessor links back to a root (a state linked to itself, or
    /// one with no link) and returns the states from root to `pos`.
    pub fn path_to(&self, pos: Pos) -> Vec<Pos> {
        let mut path = vec![pos];
        let mut current = pos;
        while let Some(previous) = self.predecessor(&current) {
            if previous == current || path.len() > self.links.len() {
                break;
            }
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}

/// Counters describing one search run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub popped: usize,
    pub pushed: usize,
    pub stale: usize,
}

/// The optimal route found by [`MoveGraph::find_minimal_cost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub cost: u32,
    /// Search states from an origin state to a destination state.
    pub path: Vec<Pos>,
    pub stats: SearchStats,
}

impl ShortestPath {
    /// The straight runs of the path as `(axis, length)`.
    pub fn runs(&self) -> Vec<(Axis, usize)> {
        self.path
            .windows(2)
            .map(|pair| {
                let length = pair[0].x.abs_diff(pair[1].x) + pair[0].y.abs_diff(pair[1].y);
                (pair[1].axis, length)
            })
            .collect()
    }

    /// Every cell visited, starting with the origin.
    pub fn cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        let Some(first) = self.path.first() else {
            return cells;
        };
        cells.push(first.cell());

        for pair in self.path.windows(2) {
            let (mut x, mut y) = pair[0].cell();
            let (tx, ty) = pair[1].cell();
            while (x, y) != (tx, ty) {
                if x != tx {
                    x = if tx > x { x + 1 } else { x - 1 };
                } else {
                    y = if ty > y { y + 1 } else { y - 1 };
                }
                cells.push((x, y));
            }
        }

        cells
    }
}

/// Receives every state finalized by the search.
///
/// Observers must not influence the search; they exist for visualization
/// and diagnostics.
pub trait SearchObserver {
    fn on_pop(&mut self, popped: &PoppedState, tree: &PredecessorTree, graph: &MoveGraph);
}

impl SearchObserver for () {
    fn on_pop(&mut self, _: &PoppedState, _: &PredecessorTree, _: &MoveGraph) {}
}
