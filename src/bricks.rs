//! Bricks: straight runs of unit cubes with an explicit identity.

use std::fmt;

use crate::error::ModelError;
use crate::geometry::Point3;

/// Synthetic brick identity, rendered as `B<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrickId(pub u32);

impl fmt::Display for BrickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Hands out brick ids in input order, starting at 1.
///
/// Owned by whoever builds a world, so separate worlds never share a counter.
#[derive(Debug, Clone, Default)]
pub struct BrickIds {
    last: u32,
}

impl BrickIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> BrickId {
        self.last += 1;
        BrickId(self.last)
    }
}

/// An axis-aligned brick between two inclusive corner cubes.
///
/// Invariants: `from <= to` component-wise, and the corners differ along at
/// most one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Brick {
    id: BrickId,
    from: Point3,
    to: Point3,
}

impl Brick {
    /// Creates a brick, normalizing the corner order.
    pub fn new(id: BrickId, a: Point3, b: Point3) -> Result<Self, ModelError> {
        if a.differing_axes(b) > 1 {
            return Err(ModelError::MultiAxisBrick { id });
        }
        Ok(Self {
            id,
            from: a.min(b),
            to: a.max(b),
        })
    }

    #[inline]
    pub fn id(&self) -> BrickId {
        self.id
    }

    #[inline]
    pub fn from(&self) -> Point3 {
        self.from
    }

    #[inline]
    pub fn to(&self) -> Point3 {
        self.to
    }

    #[inline]
    pub fn lowest_z(&self) -> i32 {
        self.from.z
    }

    #[inline]
    pub fn highest_z(&self) -> i32 {
        self.to.z
    }

    /// Inclusive box intersection on all three axes.
    #[inline]
    pub fn overlaps(&self, other: &Brick) -> bool {
        self.from.x <= other.to.x
            && self.from.y <= other.to.y
            && self.from.z <= other.to.z
            && self.to.x >= other.from.x
            && self.to.y >= other.from.y
            && self.to.z >= other.from.z
    }

    /// True if the two bricks share at least one `(x, y)` column.
    #[inline]
    pub fn footprint_overlaps(&self, other: &Brick) -> bool {
        self.from.x <= other.to.x
            && self.from.y <= other.to.y
            && self.to.x >= other.from.x
            && self.to.y >= other.from.y
    }

    /// The same brick one cell lower.
    #[inline]
    pub fn down(&self) -> Brick {
        Brick {
            id: self.id,
            from: self.from + Point3::DOWN,
            to: self.to + Point3::DOWN,
        }
    }

    /// Number of unit cubes in the brick.
    pub fn cube_count(&self) -> usize {
        self.from.manhattan_dist(self.to) as usize + 1
    }

    /// The unit cubes of the brick, from `from` to `to`.
    pub fn cubes(&self) -> impl Iterator<Item = Point3> {
        let dist = self.from.manhattan_dist(self.to);
        let step = if dist > 0 {
            (self.to - self.from).div(dist)
        } else {
            Point3::ZERO
        };
        let from = self.from;
        (0..=dist).map(move |i| {
            Point3::new(from.x + step.x * i, from.y + step.y * i, from.z + step.z * i)
        })
    }
}

impl fmt::Display for Brick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn span(from: i32, to: i32) -> String {
            if from == to {
                from.to_string()
            } else {
                format!("{from}..{to}")
            }
        }
        write!(
            f,
            "{}({},{},{})",
            self.id,
            span(self.from.x, self.to.x),
            span(self.from.y, self.to.y),
            span(self.from.z, self.to.z)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick(id: u32, from: (i32, i32, i32), to: (i32, i32, i32)) -> Brick {
        Brick::new(
            BrickId(id),
            Point3::new(from.0, from.1, from.2),
            Point3::new(to.0, to.1, to.2),
        )
        .unwrap()
    }

    #[test]
    fn test_ids_count_up_from_one() {
        let mut ids = BrickIds::new();
        assert_eq!(ids.next_id(), BrickId(1));
        assert_eq!(ids.next_id(), BrickId(2));
        assert_eq!(BrickIds::new().next_id(), BrickId(1));
    }

    #[test]
    fn test_multi_axis_brick_is_rejected() {
        let result = Brick::new(BrickId(9), Point3::new(0, 0, 1), Point3::new(1, 1, 1));
        assert_eq!(result, Err(ModelError::MultiAxisBrick { id: BrickId(9) }));
    }

    #[test]
    fn test_corners_are_normalized() {
        let b = brick(1, (3, 0, 2), (1, 0, 2));
        assert_eq!(b.from(), Point3::new(1, 0, 2));
        assert_eq!(b.to(), Point3::new(3, 0, 2));
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let a = brick(1, (0, 0, 2), (2, 0, 2));
        let b = brick(2, (2, 0, 1), (2, 0, 2));
        let c = brick(3, (0, 1, 2), (2, 1, 2));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(a.footprint_overlaps(&b));
    }

    #[test]
    fn test_down_keeps_identity() {
        let b = brick(4, (1, 1, 8), (1, 1, 9));
        let lower = b.down();
        assert_eq!(lower.id(), BrickId(4));
        assert_eq!(lower.lowest_z(), 7);
        assert_eq!(lower.highest_z(), 8);
    }

    #[test]
    fn test_cubes_cover_the_run() {
        let b = brick(1, (1, 0, 1), (1, 2, 1));
        assert_eq!(b.cube_count(), 3);
        assert_eq!(
            b.cubes().collect::<Vec<_>>(),
            vec![Point3::new(1, 0, 1), Point3::new(1, 1, 1), Point3::new(1, 2, 1)]
        );
        assert_eq!(brick(2, (5, 5, 5), (5, 5, 5)).cubes().count(), 1);
    }

    #[test]
    fn test_display_marks_spans() {
        assert_eq!(brick(1, (1, 0, 1), (1, 2, 1)).to_string(), "B1(1,0..2,1)");
        assert_eq!(brick(7, (1, 1, 8), (1, 1, 9)).to_string(), "B7(1,1,8..9)");
    }
}
