//! Geometry primitives used across bezel.
//!
//! Positions are signed, since content can be moved partly or fully off
//! screen. Sizes are unsigned, so a `Size` or `Rect` with a negative dimension
//! cannot be represented. Values coming from signed sources go through the
//! `checked` constructors, which reject negative dimensions.

#![warn(missing_docs)]

/// Error types for geometry operations.
mod error;
/// Edge rectangles for borders.
mod frame;
/// Per-edge spacing.
mod insets;
/// Signed points.
mod point;
/// Rectangle operations.
mod rect;
/// Width/height size type.
mod size;

pub use error::{Error, Result};
pub use frame::Frame;
pub use insets::Insets;
pub use point::Point;
pub use rect::Rect;
pub use size::Size;

/// Layout axes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}
