//! Grid and Gravity Puzzle Engines
//!
//! Two independent engines with a shared frame-streaming interface:
//! - a heat-loss shortest path search where every move is a straight run of
//!   bounded length followed by a 90 degree turn, and
//! - a gravity simulation of stacked bricks with support analysis.

pub mod bricks;
pub mod cancel;
pub mod error;
pub mod frames;
pub mod geometry;
pub mod heat_grid;
pub mod input;
pub mod pathfinder;
pub mod puzzles;
pub mod scenes;
pub mod stacking;
pub mod support;

pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use puzzles::{Analysis, Answer, BrickPuzzle, HeatLossPuzzle, PuzzleOps};
