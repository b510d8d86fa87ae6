#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Positions are signed so that elements scrolled above or left of the
//! viewport can be represented. Sizes are unsigned.

/// A rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Left edge (inclusive).
    #[inline]
    #[must_use]
    pub const fn left(&self) -> i64 {
        self.x as i64
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Top edge (inclusive).
    #[inline]
    #[must_use]
    pub const fn top(&self) -> i64 {
        self.y as i64
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Area in square pixels.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return Rect::default();
        }

        // Both corners lie within one of the inputs, so they fit the field types.
        Rect::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
    }

    /// Fraction of this rectangle's area that lies inside `viewport`.
    ///
    /// Returns a value in `[0.0, 1.0]`. An empty rectangle reports `0.0`.
    /// Hosts without a native intersection observer use this to compute the
    /// ratio they feed to the visibility tracker.
    #[must_use]
    pub fn intersection_ratio(&self, viewport: &Rect) -> f32 {
        let area = self.area();
        if area == 0 {
            return 0.0;
        }
        let visible = self.intersection(viewport).area();
        (visible as f64 / area as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_edges() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(9, 10));
    }

    #[test]
    fn contains_negative_origin() {
        let r = Rect::new(-20, -20, 30, 30);
        assert!(r.contains(-1, -1));
        assert!(r.contains(9, 9));
        assert!(!r.contains(10, 0));
    }

    #[test]
    fn intersection_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn intersection_disjoint_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 10, 10);
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn ratio_partially_scrolled_out() {
        let viewport = Rect::from_size(1000, 800);
        let element = Rect::new(0, -50, 100, 100);
        assert!((element.intersection_ratio(&viewport) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn ratio_fully_inside_and_outside() {
        let viewport = Rect::from_size(1000, 800);
        assert_eq!(Rect::new(10, 10, 50, 50).intersection_ratio(&viewport), 1.0);
        assert_eq!(Rect::new(10, 900, 50, 50).intersection_ratio(&viewport), 0.0);
    }

    #[test]
    fn ratio_of_empty_rect_is_zero() {
        let viewport = Rect::from_size(1000, 800);
        assert_eq!(Rect::new(10, 10, 0, 50).intersection_ratio(&viewport), 0.0);
    }
}
