use super::{Insets, Point, Rect, error};
use crate::Result;

/// A `Size` has a width and height but no location.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Size {
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Size {
    /// Construct a size.
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Construct a size from signed dimensions, failing on negative values.
    pub fn checked(w: i32, h: i32) -> Result<Self> {
        Ok(Self {
            w: error::dimension("width", w)?,
            h: error::dimension("height", h)?,
        })
    }

    /// The zero size.
    pub fn zero() -> Self {
        Self { w: 0, h: 0 }
    }

    /// The area of this size.
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// True if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Return a `Rect` with these dimensions located at the origin.
    pub fn rect(&self) -> Rect {
        Rect {
            tl: Point::zero(),
            w: self.w,
            h: self.h,
        }
    }

    /// True if this size can completely enclose the other in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }

    /// Componentwise minimum.
    pub fn min(&self, other: Self) -> Self {
        Self::new(self.w.min(other.w), self.h.min(other.h))
    }

    /// Componentwise maximum.
    pub fn max(&self, other: Self) -> Self {
        Self::new(self.w.max(other.w), self.h.max(other.h))
    }

    /// Remove insets from this size, clamping at zero.
    pub fn shrink(&self, insets: Insets) -> Self {
        Self::new(
            self.w.saturating_sub(insets.horizontal()),
            self.h.saturating_sub(insets.vertical()),
        )
    }

    /// Add insets to this size, saturating at the maximum.
    pub fn grow(&self, insets: Insets) -> Self {
        Self::new(
            self.w.saturating_add(insets.horizontal()),
            self.h.saturating_add(insets.vertical()),
        )
    }
}

impl From<Rect> for Size {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(u32, u32)> for Size {
    fn from(v: (u32, u32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn checked_rejects_negative() {
        assert_eq!(Size::checked(3, 4), Ok(Size::new(3, 4)));
        assert!(matches!(
            Size::checked(-1, 4),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            Size::checked(1, -4),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn shrink_clamps() {
        let s = Size::new(10, 3);
        assert_eq!(s.shrink(Insets::all(2)), Size::new(6, 0));
        assert_eq!(s.shrink(Insets::all(6)), Size::new(0, 0));
        assert_eq!(s.grow(Insets::new(1, 2, 3, 4)), Size::new(16, 7));
    }
}
