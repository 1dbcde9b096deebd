//! Integer pixel geometry shared by every layer.
//!
//! Both types are plain `Copy` values.  Whether a coordinate is machine-local
//! or global (virtual desktop space) is decided by the caller; the types do not
//! carry that distinction.

use serde::{Deserialize, Serialize};

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns `(self - other)` as a `(dx, dy)` pair.
    pub const fn delta_from(self, other: Point) -> (i32, i32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
///
/// `right()` and `bottom()` are exclusive: a 1920-wide display starting at
/// x = 0 covers columns `0..=1919`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns this rectangle translated by `(dx, dy)`; the size is unchanged.
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Half-open containment test: `Left`/`Top` are inside, `Right`/`Bottom`
    /// are outside.
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Projects `p` onto the nearest pixel inside the rectangle, i.e. into
    /// `[Left, Right-1] × [Top, Bottom-1]`.
    ///
    /// An empty rectangle has no pixels; its origin is returned.
    pub fn clamp(&self, p: Point) -> Point {
        if self.is_empty() {
            return self.origin();
        }
        Point::new(
            p.x.clamp(self.left(), self.right() - 1),
            p.y.clamp(self.top(), self.bottom() - 1),
        )
    }

    /// Returns `true` if the two rectangles share at least one pixel.
    pub const fn overlaps(&self, other: &Rectangle) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> Rectangle {
        Rectangle::new(0, 0, 1920, 1080)
    }

    #[test]
    fn test_point_offset_translates_both_axes() {
        assert_eq!(Point::new(10, 20).offset(5, -7), Point::new(15, 13));
    }

    #[test]
    fn test_point_delta_from_is_component_difference() {
        assert_eq!(Point::new(1925, 500).delta_from(Point::new(1919, 510)), (6, -10));
    }

    #[test]
    fn test_rectangle_edges_are_derived_from_origin_and_size() {
        let r = Rectangle::new(100, 50, 1920, 1080);
        assert_eq!(r.left(), 100);
        assert_eq!(r.top(), 50);
        assert_eq!(r.right(), 2020);
        assert_eq!(r.bottom(), 1130);
    }

    #[test]
    fn test_contains_includes_left_and_top_edges() {
        let r = full_hd();
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(0, 540)));
        assert!(r.contains(Point::new(960, 0)));
    }

    #[test]
    fn test_contains_excludes_right_and_bottom_edges() {
        let r = full_hd();
        assert!(!r.contains(Point::new(1920, 540)));
        assert!(!r.contains(Point::new(960, 1080)));
        assert!(r.contains(Point::new(1919, 1079)));
    }

    #[test]
    fn test_contains_rejects_negative_coordinates_for_origin_rectangle() {
        assert!(!full_hd().contains(Point::new(-1, 10)));
    }

    #[test]
    fn test_clamp_keeps_inside_point_unchanged() {
        assert_eq!(full_hd().clamp(Point::new(300, 400)), Point::new(300, 400));
    }

    #[test]
    fn test_clamp_pulls_outside_point_to_last_pixel() {
        let r = full_hd();
        assert_eq!(r.clamp(Point::new(1921, 500)), Point::new(1919, 500));
        assert_eq!(r.clamp(Point::new(-40, 5000)), Point::new(0, 1079));
    }

    #[test]
    fn test_clamp_result_is_always_contained() {
        let r = Rectangle::new(-1280, 200, 1280, 1024);
        for p in [
            Point::new(i32::MIN / 2, i32::MIN / 2),
            Point::new(i32::MAX / 2, i32::MAX / 2),
            Point::new(0, 0),
            Point::new(-1280, 1224),
        ] {
            assert!(r.contains(r.clamp(p)), "clamp({p:?}) escaped {r:?}");
        }
    }

    #[test]
    fn test_clamp_on_empty_rectangle_returns_origin() {
        let r = Rectangle::new(40, 60, 0, 0);
        assert_eq!(r.clamp(Point::new(999, 999)), Point::new(40, 60));
    }

    #[test]
    fn test_offset_moves_rectangle_without_resizing() {
        let r = full_hd().offset(1920, -100);
        assert_eq!(r, Rectangle::new(1920, -100, 1920, 1080));
    }

    #[test]
    fn test_adjacent_rectangles_do_not_overlap() {
        let a = full_hd();
        let b = Rectangle::new(1920, 0, 1920, 1080);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rectangle::new(1919, 1079, 10, 10)));
    }
}
