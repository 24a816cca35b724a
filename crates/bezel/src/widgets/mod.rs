//! Stock behaviors and the node constructors that go with them.

/// Clickable buttons.
mod button;
/// Swipeable pagers.
mod swiper;

pub use button::{Button, button};
pub use swiper::{Swiper, current_page, swiper};
