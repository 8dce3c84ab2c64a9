//! Geometric predicates deciding whether a detected box sits in the scanner box.
//!
//! Both rectangles are expected in the same (overlay) coordinate space.

use crate::Rect;

/// Minimum share of the region, in percent, that a box must cover along at
/// least one axis.
pub const MIN_FILL_PERCENT: f32 = 80.0;

/// True iff `bounding_box` lies fully within `region`.
#[inline]
pub fn is_inside(region: &Rect, bounding_box: &Rect) -> bool {
    region.contains(bounding_box)
}

/// Width and height of `bounding_box` as a percentage of `region`.
///
/// Absolute extents are used, so rectangles with swapped edges are fine.
/// A degenerate region yields non-finite values.
pub fn fill_percent(region: &Rect, bounding_box: &Rect) -> (f32, f32) {
    let width = bounding_box.width().abs() * 100.0 / region.width().abs();
    let height = bounding_box.height().abs() * 100.0 / region.height().abs();
    (width, height)
}

/// True iff either axis of `bounding_box` covers at least
/// [`MIN_FILL_PERCENT`] of `region` (boundary inclusive).
///
/// Non-finite ratios from a zero-sized region never count.
pub fn is_large_enough(region: &Rect, bounding_box: &Rect) -> bool {
    let (width, height) = fill_percent(region, bounding_box);
    let meets = |p: f32| p.is_finite() && p >= MIN_FILL_PERCENT;
    meets(width) || meets(height)
}
