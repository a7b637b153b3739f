//! Axis-aligned rectangles used both as node coverage and as query regions.

use crate::types::Position;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world-space units.
///
/// Containment is half-open (`x <= px < x + width`), so the four quadrants of
/// a rectangle partition it without counting a point on a shared edge twice.
///
/// # Examples
///
/// ```rust
/// use spatial_partition::Bounds;
///
/// let left = Bounds::new(0.0, 0.0, 50.0, 100.0);
/// let right = Bounds::new(50.0, 0.0, 50.0, 100.0);
///
/// // A point on the shared edge belongs to exactly one of them.
/// assert!(!left.contains(50.0, 10.0));
/// assert!(right.contains(50.0, 10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Extent along x, never negative
    pub width: f64,
    /// Extent along y, never negative
    pub height: f64,
}

impl Bounds {
    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle of the given size centred on `(cx, cy)`.
    pub fn from_center(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// The bounding square of the circle at `(cx, cy)` with radius `radius`.
    pub fn around(cx: f64, cy: f64, radius: f64) -> Self {
        Self::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Finite coordinates and non-negative extents.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Half-open point containment.
    #[inline]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    #[inline]
    pub fn contains_position(&self, position: Position) -> bool {
        self.contains(position.x, position.y)
    }

    /// Separating-axis test: false when one rectangle lies entirely to one
    /// side of the other on either axis.
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether the closed disc at `(cx, cy)` touches this rectangle.
    ///
    /// Edges are treated as closed, so the result may be conservative by the
    /// width of the exclusive edge. Negative or NaN radii never intersect.
    pub fn intersects_circle(&self, cx: f64, cy: f64, radius: f64) -> bool {
        if radius.is_nan() || radius < 0.0 {
            return false;
        }

        // Closest point of the rectangle to the circle center
        let closest_x = cx.max(self.x).min(self.right());
        let closest_y = cy.max(self.y).min(self.bottom());

        let dx = cx - closest_x;
        let dy = cy - closest_y;
        dx * dx + dy * dy <= radius * radius
    }

    /// Splits the rectangle into its four quadrants, ordered NW, NE, SW, SE.
    ///
    /// The eastern and southern quadrants take whatever remains after the
    /// midpoint so the quadrants share edges exactly with each other.
    pub fn quadrants(&self) -> [Bounds; 4] {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        let mid_x = self.x + half_width;
        let mid_y = self.y + half_height;
        let east_width = self.right() - mid_x;
        let south_height = self.bottom() - mid_y;

        [
            Bounds::new(self.x, self.y, half_width, half_height),
            Bounds::new(mid_x, self.y, east_width, half_height),
            Bounds::new(self.x, mid_y, half_width, south_height),
            Bounds::new(mid_x, mid_y, east_width, south_height),
        ]
    }
}
