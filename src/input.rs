//! Line readers for the two puzzle grammars.
//!
//! Blank lines are skipped and surrounding whitespace is ignored. Every
//! error reports the 1-based line number of the offending line.

use std::fs;
use std::path::Path;

use crate::error::{ParseError, Result};
use crate::geometry::Point3;
use crate::heat_grid::HeatGrid;

/// Two opposite corners of a brick as written in the input.
pub type BrickCorners = (Point3, Point3);

/// Reads a whole input file into memory.
pub fn read_input(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Yields `(line_number, trimmed_line)` for every non-blank line.
fn data_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parses rows of digits (`^[0-9]+$`) into a heat-loss grid.
pub fn parse_grid(input: &str) -> std::result::Result<HeatGrid, ParseError> {
    let mut rows: Vec<Vec<u8>> = Vec::new();

    for (line, text) in data_lines(input) {
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidGridRow {
                line,
                text: text.to_string(),
            });
        }
        let row: Vec<u8> = text.bytes().map(|b| b - b'0').collect();
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(ParseError::RaggedGrid {
                    line,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(HeatGrid::from_rows(rows))
}

/// Parses one `x,y,z` triple of non-negative integers.
fn parse_point(text: &str) -> Option<Point3> {
    let mut parts = text.split(',');
    let mut next = || -> Option<i32> {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    let point = Point3::new(next()?, next()?, next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(point)
}

/// Parses brick lines of the form `x,y,z~x,y,z`.
pub fn parse_bricks(input: &str) -> std::result::Result<Vec<BrickCorners>, ParseError> {
    let corners: Vec<BrickCorners> = data_lines(input)
        .map(|(line, text)| {
            text.split_once('~')
                .and_then(|(from, to)| Some((parse_point(from)?, parse_point(to)?)))
                .ok_or_else(|| ParseError::InvalidBrick {
                    line,
                    text: text.to_string(),
                })
        })
        .collect::<std::result::Result<_, _>>()?;

    if corners.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(corners)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_skips_blank_lines() {
        let grid = parse_grid("\n  123\n\n456 \n").unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(2, 1), Some(6));
    }

    #[test]
    fn test_grid_rejects_non_digits() {
        assert_eq!(
            parse_grid("123\n1a3\n"),
            Err(ParseError::InvalidGridRow {
                line: 2,
                text: "1a3".to_string()
            })
        );
    }

    #[test]
    fn test_grid_rejects_ragged_rows() {
        assert_eq!(
            parse_grid("123\n12\n"),
            Err(ParseError::RaggedGrid {
                line: 2,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        assert_eq!(parse_grid("\n\n"), Err(ParseError::Empty));
        assert_eq!(parse_bricks(""), Err(ParseError::Empty));
    }

    #[test]
    fn test_brick_corners() {
        let bricks = parse_bricks("1,0,1~1,2,1\n0,0,2~2,0,2\n").unwrap();
        assert_eq!(
            bricks,
            vec![
                (Point3::new(1, 0, 1), Point3::new(1, 2, 1)),
                (Point3::new(0, 0, 2), Point3::new(2, 0, 2)),
            ]
        );
    }

    #[test]
    fn test_brick_grammar_is_strict() {
        for bad in ["1,0,1-1,2,1", "1,0~1,2,1", "1,0,1~1,2,1,4", "-1,0,1~1,2,1", "1,,1~1,2,1"] {
            assert!(
                matches!(parse_bricks(bad), Err(ParseError::InvalidBrick { line: 1, .. })),
                "accepted '{bad}'"
            );
        }
    }
}
