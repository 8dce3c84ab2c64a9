use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its edges.
///
/// Edges are not required to be ordered: a rectangle produced by a
/// rotating transform may have `right < left`. Use [`Rect::normalized`] to
/// sort them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Signed width (`right - left`).
    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Signed height (`bottom - top`).
    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// True if the rectangle encloses no area (or has swapped edges).
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    /// Exact containment test.
    ///
    /// `self` must be non-empty; every edge of `other` must lie within
    /// `self`, edges touching count as inside. No tolerance is applied.
    pub fn contains(&self, other: &Rect) -> bool {
        !self.is_empty()
            && self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Same rectangle with `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    /// Corners in `[top-left, top-right, bottom-right, bottom-left]` order.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [
            Point2::new(self.left, self.top),
            Point2::new(self.right, self.top),
            Point2::new(self.right, self.bottom),
            Point2::new(self.left, self.bottom),
        ]
    }

    /// Smallest rectangle enclosing all `points`; `None` for an empty slice.
    pub fn bounding(points: &[Point2<f32>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let init = Self::new(first.x, first.y, first.x, first.y);
        Some(rest.iter().fold(init, |r, p| {
            Self::new(
                r.left.min(p.x),
                r.top.min(p.y),
                r.right.max(p.x),
                r.bottom.max(p.y),
            )
        }))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.1},{:.1})-({:.1},{:.1})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_edges() {
        let outer = Rect::new(0.0, 0.0, 300.0, 200.0);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Rect::new(0.0, 10.0, 300.0, 20.0)));
        assert!(!outer.contains(&Rect::new(-0.5, 10.0, 100.0, 20.0)));
        assert!(!outer.contains(&Rect::new(10.0, 10.0, 100.0, 200.5)));
    }

    #[test]
    fn empty_outer_contains_nothing() {
        let degenerate = Rect::new(10.0, 10.0, 10.0, 50.0);
        assert!(degenerate.is_empty());
        assert!(!degenerate.contains(&Rect::new(10.0, 20.0, 10.0, 30.0)));

        let swapped = Rect::new(100.0, 0.0, 0.0, 100.0);
        assert!(swapped.is_empty());
        assert!(!swapped.contains(&Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(swapped.normalized().contains(&Rect::new(10.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn bounding_box_of_points() {
        let pts = [
            Point2::new(5.0, 1.0),
            Point2::new(-2.0, 4.0),
            Point2::new(3.0, 9.0),
        ];
        assert_eq!(Rect::bounding(&pts), Some(Rect::new(-2.0, 1.0, 5.0, 9.0)));
        assert_eq!(Rect::bounding(&[]), None);
    }

    #[test]
    fn deserializes_from_edge_fields() {
        let r: Rect =
            serde_json::from_str(r#"{"left":1,"top":2,"right":3,"bottom":4}"#).expect("rect");
        assert_eq!(r, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(r.width(), 2.0);
        assert_eq!(r.height(), 2.0);
    }
}
