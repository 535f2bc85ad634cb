//! Error types shared by both engines and their drivers.

use thiserror::Error;

use crate::bricks::BrickId;

/// Input lines that fail their puzzle grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: invalid grid row '{text}'")]
    InvalidGridRow { line: usize, text: String },

    #[error("line {line}: row has {found} cells, expected {expected}")]
    RaggedGrid {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid brick '{text}'")]
    InvalidBrick { line: usize, text: String },

    #[error("input contains no data")]
    Empty,
}

/// Violations of the stacking model; these are data or engine defects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("brick {id} spans more than one axis")]
    MultiAxisBrick { id: BrickId },

    #[error("bricks {first} and {second} occupy the same cell")]
    OccupiedTwice { first: BrickId, second: BrickId },

    #[error("settling did not reach rest within {passes} passes")]
    SettleDidNotConverge { passes: usize },

    #[error("settling was cancelled")]
    Cancelled,
}

/// Shortest-path search failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid run limits {min}..={max}")]
    InvalidRunLimits { min: usize, max: usize },

    #[error("destination ({x},{y}) is unreachable")]
    Unreachable { x: usize, y: usize },

    #[error("search was cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
