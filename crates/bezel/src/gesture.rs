//! Horizontal swipe detection for pagers.
//!
//! A swipe starts when a pressed pointer first moves further horizontally than
//! vertically. On release it turns the page if the drag covered more than a
//! sixth of the pager's width, or if the pointer was still moving faster than
//! 0.1 px/ms since the press (or since the drag last changed direction).

use geom::Point;

/// Fraction of the width, as a divisor, a drag must cover to turn the page.
pub const SCREEN_RATIO: u32 = 6;

/// Release speed in pixels per millisecond above which a short drag still
/// turns the page.
pub const SPEED_THRESHOLD: f32 = 0.1;

/// Which way a completed swipe turns the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Content moved left; show the next page.
    Next,
    /// Content moved right; show the previous page.
    Previous,
}

/// Tracks a single pointer through press, drag and release.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwipeTracker {
    /// A press is active and may become a swipe.
    pressed: bool,
    /// Horizontal drag is underway.
    moving: bool,
    /// X position the speed is measured from.
    origin_x: i32,
    /// Timestamp the speed is measured from.
    origin_at: u64,
    /// Last pointer position.
    last: Point,
    /// Horizontal displacement of the page.
    offset: i32,
}

impl SwipeTracker {
    /// A tracker at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a horizontal drag underway?
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Current horizontal displacement of the page.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Start tracking. With fewer than two pages there is nothing to swipe
    /// to, and the press is ignored.
    pub fn press(&mut self, p: Point, timestamp: u64, pages: usize) {
        *self = Self::default();
        if pages < 2 {
            return;
        }
        self.pressed = true;
        self.origin_x = p.x;
        self.origin_at = timestamp;
        self.last = p;
    }

    /// Feed a pointer move. Returns `true` while a swipe is in progress, in
    /// which case the move belongs to the swipe.
    pub fn drag(&mut self, p: Point, timestamp: u64) -> bool {
        let shift_x = p.x.saturating_sub(self.last.x);
        if !self.pressed || shift_x == 0 {
            return false;
        }
        let shift_y = p.y.saturating_sub(self.last.y);
        if !self.moving && shift_x.unsigned_abs() > shift_y.unsigned_abs() {
            self.moving = true;
        }
        let next = self.offset.saturating_add(shift_x);
        if (self.offset > 0 && next < 0) || (self.offset < 0 && next > 0) {
            // Changed direction: measure speed from here.
            self.origin_x = p.x;
            self.origin_at = timestamp;
        }
        if self.moving {
            self.offset = next;
            self.last = p;
            return true;
        }
        false
    }

    /// Finish tracking. Returns the page change, if any. `width` is the
    /// pager's content width.
    pub fn release(&mut self, p: Point, timestamp: u64, width: u32) -> Option<SwipeDirection> {
        let state = *self;
        *self = Self::default();
        if !state.moving {
            return None;
        }
        let elapsed = timestamp.saturating_sub(state.origin_at).max(1) as f32;
        let speed = -(p.x.saturating_sub(state.origin_x) as f32) / elapsed;
        let threshold = i64::from(width / SCREEN_RATIO);
        let offset = i64::from(state.offset);
        if offset < 0 {
            (offset < -threshold || speed > SPEED_THRESHOLD).then_some(SwipeDirection::Next)
        } else {
            (offset > threshold || speed < -SPEED_THRESHOLD).then_some(SwipeDirection::Previous)
        }
    }

    /// Abandon the gesture.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}
