use super::{Insets, Point, Size, error};
use crate::Result;

/// A rectangle with a signed origin and an unsigned size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Construct a rectangle from signed dimensions, failing if either is
    /// negative.
    pub fn checked(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        Ok(Self::new(
            x,
            y,
            error::dimension("width", w)?,
            error::dimension("height", h)?,
        ))
    }

    /// Construct a rectangle at a position with a size.
    pub fn at(tl: Point, size: Size) -> Self {
        Self {
            tl,
            w: size.w,
            h: size.h,
        }
    }

    /// The zero rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The size of this rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Does this rect have a zero area?
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Left edge.
    pub fn left(&self) -> i64 {
        i64::from(self.tl.x)
    }

    /// Top edge.
    pub fn top(&self) -> i64 {
        i64::from(self.tl.y)
    }

    /// Right edge, exclusive.
    pub fn right(&self) -> i64 {
        i64::from(self.tl.x) + i64::from(self.w)
    }

    /// Bottom edge, exclusive.
    pub fn bottom(&self) -> i64 {
        i64::from(self.tl.y) + i64::from(self.h)
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        let (x, y) = (i64::from(p.x), i64::from(p.y));
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Does this rectangle completely enclose the other? Empty rectangles are
    /// enclosed when they lie within or on the edges of this one.
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// The overlapping area of two rectangles, if they overlap at all.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(from_edges(left, top, right, bottom))
    }

    /// Like `intersect`, but returns an empty rectangle clamped into `other`
    /// when there is no overlap. Useful for running clip rectangles.
    pub fn clip_to(&self, other: &Self) -> Self {
        self.intersect(other).unwrap_or_else(|| {
            let x = self.left().clamp(other.left(), other.right());
            let y = self.top().clamp(other.top(), other.bottom());
            from_edges(x, y, x, y)
        })
    }

    /// The smallest rectangle enclosing both. An empty rectangle contributes
    /// nothing to the union.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Shrink this rectangle by insets. When the insets exceed the size the
    /// result collapses to zero along that axis, still inside the original.
    pub fn inset(&self, insets: Insets) -> Self {
        let dx = insets.left.min(self.w);
        let dy = insets.top.min(self.h);
        Self {
            tl: self.tl.offset(to_i32(dx), to_i32(dy)),
            w: self.w.saturating_sub(insets.horizontal()),
            h: self.h.saturating_sub(insets.vertical()),
        }
    }

    /// Grow this rectangle outward by insets.
    pub fn outset(&self, insets: Insets) -> Self {
        Self {
            tl: self
                .tl
                .offset(-to_i32(insets.left), -to_i32(insets.top)),
            w: self.w.saturating_add(insets.horizontal()),
            h: self.h.saturating_add(insets.vertical()),
        }
    }

    /// Move this rectangle by an offset.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            tl: self.tl.offset(dx, dy),
            w: self.w,
            h: self.h,
        }
    }
}

/// Clamp an unsigned offset into the signed coordinate range.
fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Build a rect from edge coordinates, saturating into the representable range.
fn from_edges(left: i64, top: i64, right: i64, bottom: i64) -> Rect {
    let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    let span = |a: i64, b: i64| (b - a).clamp(0, i64::from(u32::MAX)) as u32;
    Rect::new(clamp(left), clamp(top), span(left, right), span(top, bottom))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Error;

    #[test]
    fn checked() {
        assert_eq!(Rect::checked(-3, 2, 4, 5), Ok(Rect::new(-3, 2, 4, 5)));
        assert!(matches!(
            Rect::checked(0, 0, -4, 5),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn contains() {
        let r = Rect::new(10, 10, 10, 10);
        assert!(r.contains_point(Point::new(10, 10)));
        assert!(r.contains_point(Point::new(19, 19)));
        assert!(!r.contains_point(Point::new(20, 19)));
        assert!(!r.contains_point(Point::new(9, 15)));

        assert!(r.contains_rect(&r));
        assert!(r.contains_rect(&Rect::new(12, 12, 2, 2)));
        assert!(!r.contains_rect(&Rect::new(12, 12, 9, 2)));
        // An empty rect on the far edge is still inside.
        assert!(r.contains_rect(&Rect::new(20, 10, 0, 10)));
        assert!(!r.contains_rect(&Rect::new(21, 10, 0, 10)));
    }

    #[test]
    fn intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersect(&Rect::new(5, 5, 10, 10)),
            Some(Rect::new(5, 5, 5, 5))
        );
        assert_eq!(
            a.intersect(&Rect::new(-5, 2, 7, 2)),
            Some(Rect::new(0, 2, 2, 2))
        );
        assert_eq!(a.intersect(&Rect::new(10, 0, 5, 5)), None);
        assert_eq!(a.clip_to(&Rect::new(20, 3, 5, 5)), Rect::new(20, 3, 0, 0));
        assert_eq!(a.clip_to(&Rect::new(-20, -3, 5, 5)), Rect::new(-15, 0, 0, 0));
    }

    #[test]
    fn union() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.union(&Rect::new(5, -5, 10, 2)), Rect::new(0, -5, 15, 15));
        assert_eq!(a.union(&Rect::new(100, 100, 0, 4)), a);
        assert_eq!(Rect::zero().union(&a), a);
    }

    #[test]
    fn inset() {
        let r = Rect::new(10, 10, 10, 6);
        assert_eq!(r.inset(Insets::all(1)), Rect::new(11, 11, 8, 4));
        assert_eq!(r.inset(Insets::new(0, 0, 0, 4)), Rect::new(14, 10, 6, 6));
        assert_eq!(r.inset(Insets::all(4)), Rect::new(14, 14, 2, 0));
        assert_eq!(r.inset(Insets::all(20)), Rect::new(20, 16, 0, 0));
        assert_eq!(r.inset(Insets::all(2)).outset(Insets::all(2)), r);
    }

    fn rect() -> impl Strategy<Value = Rect> {
        (-50i32..50, -50i32..50, 0u32..60, 0u32..60).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn intersection_within_both(a in rect(), b in rect()) {
            if let Some(i) = a.intersect(&b) {
                prop_assert!(a.contains_rect(&i));
                prop_assert!(b.contains_rect(&i));
                prop_assert!(!i.is_empty());
            }
            prop_assert!(b.contains_rect(&a.clip_to(&b)));
        }

        #[test]
        fn union_encloses_both(a in rect(), b in rect()) {
            let u = a.union(&b);
            if !a.is_empty() {
                prop_assert!(u.contains_rect(&a));
            }
            if !b.is_empty() {
                prop_assert!(u.contains_rect(&b));
            }
        }

        #[test]
        fn inset_stays_inside(r in rect(), t in 0u32..40, ri in 0u32..40, bo in 0u32..40, l in 0u32..40) {
            prop_assert!(r.contains_rect(&r.inset(Insets::new(t, ri, bo, l))));
        }
    }
}
