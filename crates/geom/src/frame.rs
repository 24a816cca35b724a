use super::{Insets, Rect};

/// The edge rectangles of a border drawn inside a rect.
///
/// The top and bottom edges span the full width, the left and right edges fill
/// the space between them.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Frame {
    /// The top edge, including corners.
    pub top: Rect,
    /// The bottom edge, including corners.
    pub bottom: Rect,
    /// The left edge, not including corners.
    pub left: Rect,
    /// The right edge, not including corners.
    pub right: Rect,
    /// The original outer rect.
    outer: Rect,
    /// The border widths.
    border: Insets,
}

impl Frame {
    /// Construct a frame. Edges are clamped so they never extend past the
    /// outer rect; an over-sized border collapses the interior to zero.
    pub fn new(rect: Rect, border: Insets) -> Self {
        let inner = rect.inset(border);
        let top = Rect::new(rect.tl.x, rect.tl.y, rect.w, border.top.min(rect.h));
        let bottom_h = border.bottom.min(rect.h - top.h);
        let bottom = Rect::new(
            rect.tl.x,
            clamp_i32(rect.bottom() - i64::from(bottom_h)),
            rect.w,
            bottom_h,
        );
        let side_h = rect.h - top.h - bottom_h;
        let left_w = border.left.min(rect.w);
        let left = Rect::new(rect.tl.x, clamp_i32(top.bottom()), left_w, side_h);
        let right_w = border.right.min(rect.w - left_w);
        let right = Rect::new(
            clamp_i32(rect.right() - i64::from(right_w)),
            clamp_i32(top.bottom()),
            right_w,
            side_h,
        );
        debug_assert!(rect.contains_rect(&inner), "frame interior escapes outer rect");
        Self {
            top,
            bottom,
            left,
            right,
            outer: rect,
            border,
        }
    }

    /// The space inside the frame.
    pub fn inner(&self) -> Rect {
        self.outer.inset(self.border)
    }

    /// The rect passed to `Frame::new`.
    pub fn outer(&self) -> Rect {
        self.outer
    }

    /// The non-empty edges, in top, right, bottom, left order.
    pub fn edges(&self) -> Vec<Rect> {
        [self.top, self.right, self.bottom, self.left]
            .into_iter()
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Saturate an edge coordinate into the signed coordinate range.
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
