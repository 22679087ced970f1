#![forbid(unsafe_code)]

//! Geometric primitives for hit testing drag targets.
//!
//! Coordinates are host cells (0-indexed, origin at top-left). Centers are
//! computed in doubled space (`2*x + w`) so that comparisons stay exact in
//! integer arithmetic.

/// A point reported by the host pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl From<(u16, u16)> for Point {
    fn from((x, y): (u16, u16)) -> Self {
        Self { x, y }
    }
}

/// A rectangle describing the on-screen bounds of a draggable or droppable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Doubled center coordinates: `(2*x + w, 2*y + h)`.
    #[inline]
    pub const fn center_doubled(&self) -> (i32, i32) {
        (
            2 * self.x as i32 + self.width as i32,
            2 * self.y as i32 + self.height as i32,
        )
    }

    /// Squared distance between the centers of two rectangles, in doubled space.
    #[inline]
    pub fn center_distance_sq(&self, other: &Rect) -> i64 {
        let (ax, ay) = self.center_doubled();
        let (bx, by) = other.center_doubled();
        let dx = i64::from(ax - bx);
        let dy = i64::from(ay - by);
        dx * dx + dy * dy
    }

    /// Whether `y` lies strictly above the vertical midpoint.
    ///
    /// A pointer exactly on the midpoint counts as below.
    #[inline]
    pub const fn is_above_midpoint(&self, y: u16) -> bool {
        (2 * y as i32) < 2 * self.y as i32 + self.height as i32
    }

    /// Whether the two rectangles share any area.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection_opt(other).is_some()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Move the rectangle so that its top-left corner sits at `origin`.
    #[must_use]
    pub const fn moved_to(self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.height)
    }
}
