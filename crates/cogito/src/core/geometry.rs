//! Graph-space geometry
//!
//! Graph space has x growing rightward and y growing downward. Coordinates
//! are `i32`; bound arithmetic is done in `i64` so extreme rectangles
//! cannot overflow.

use std::fmt;

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`)
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Bottom edge (`y + height`)
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Whether the point lies inside or on any edge of the rectangle
    ///
    /// Unlike half-open containment, points on the right and bottom edges
    /// count as inside. A rectangle with a negative extent contains nothing.
    pub fn contains_inclusive(&self, x: i32, y: i32) -> bool {
        if self.width < 0 || self.height < 0 {
            return false;
        }
        let (x, y) = (i64::from(x), i64::from(y));
        x >= i64::from(self.x) && x <= self.right() && y >= i64::from(self.y) && y <= self.bottom()
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} {}x{}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Euclidean distance between two points, truncated to two decimals
pub fn truncated_distance(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = (i64::from(from.0) - i64::from(to.0)) as f64;
    let dy = (i64::from(from.1) - i64::from(to.1)) as f64;
    (100.0 * (dx * dx + dy * dy).sqrt()).floor() / 100.0
}
