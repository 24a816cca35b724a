use std::ops::Add;

use super::error;
use crate::Result;

/// Spacing on each edge of a rectangle: padding, borders and the like.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Insets {
    /// Top edge.
    pub top: u32,
    /// Right edge.
    pub right: u32,
    /// Bottom edge.
    pub bottom: u32,
    /// Left edge.
    pub left: u32,
}

impl Insets {
    /// Construct insets in CSS order: top, right, bottom, left.
    pub fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Construct insets from signed values, failing on negative values.
    pub fn checked(top: i32, right: i32, bottom: i32, left: i32) -> Result<Self> {
        Ok(Self {
            top: error::dimension("top inset", top)?,
            right: error::dimension("right inset", right)?,
            bottom: error::dimension("bottom inset", bottom)?,
            left: error::dimension("left inset", left)?,
        })
    }

    /// The same inset on every edge.
    pub fn all(n: u32) -> Self {
        Self::new(n, n, n, n)
    }

    /// Vertical insets on top and bottom, horizontal insets on left and right.
    pub fn symmetric(vertical: u32, horizontal: u32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// No insets.
    pub fn zero() -> Self {
        Self::default()
    }

    /// True if every edge is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Combined left and right insets.
    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Combined top and bottom insets.
    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

impl Add for Insets {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
            left: self.left.saturating_add(other.left),
        }
    }
}
