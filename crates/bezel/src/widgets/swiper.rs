use tracing::debug;

use crate::{
    dispatch::{Behavior, EventContext, EventOutcome, Phase},
    error::Result,
    event::{InputEvent, PointerAction},
    gesture::{SwipeDirection, SwipeTracker},
    id::NodeId,
    layout::Overlay,
    node::Node,
    tree::Tree,
};

/// A pager: shows one child of its node at a time, and turns pages on
/// horizontal swipes, wrapping around at both ends. Drags are watched in the
/// capture phase, so a swipe that starts on a button does not click it.
#[derive(Debug, Default)]
pub struct Swiper {
    /// Gesture state.
    tracker: SwipeTracker,
    /// Index of the page on show.
    current: usize,
}

impl Swiper {
    /// A pager showing its first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show one page and hide the rest.
    fn show(&mut self, ctx: &mut EventContext<'_>, index: usize) -> Result<()> {
        let pages = ctx.children();
        for (i, page) in pages.iter().enumerate() {
            ctx.tree_mut().set_visible(*page, i == index)?;
        }
        self.current = index;
        Ok(())
    }
}

impl Behavior for Swiper {
    fn on_event(
        &mut self,
        phase: Phase,
        event: &InputEvent,
        ctx: &mut EventContext<'_>,
    ) -> Result<EventOutcome> {
        if phase == Phase::Bubble {
            return Ok(EventOutcome::Ignore);
        }
        let (Some(action), Some(pos)) = (event.pointer_action(), event.pos()) else {
            return Ok(EventOutcome::Ignore);
        };
        let pages = ctx.children().len();
        match action {
            PointerAction::Down => {
                self.tracker.press(pos, event.timestamp, pages);
                Ok(EventOutcome::Ignore)
            }
            PointerAction::Move => Ok(if self.tracker.drag(pos, event.timestamp) {
                EventOutcome::Consume
            } else {
                EventOutcome::Ignore
            }),
            PointerAction::Up => {
                let moving = self.tracker.is_moving();
                let width = ctx.content_rect().w;
                if let Some(dir) = self.tracker.release(pos, event.timestamp, width)
                    && pages > 0
                {
                    let current = self.current % pages;
                    let next = match dir {
                        SwipeDirection::Next => (current + 1) % pages,
                        SwipeDirection::Previous => (current + pages - 1) % pages,
                    };
                    debug!("swipe {:?}: page {} -> {}", dir, current, next);
                    self.show(ctx, next)?;
                }
                Ok(if moving {
                    EventOutcome::Consume
                } else {
                    EventOutcome::Ignore
                })
            }
        }
    }
}

/// Add a pager under a parent, with one child node per page. The first page
/// is shown.
pub fn swiper(tree: &mut Tree, parent: NodeId, name: &str, pages: Vec<Node>) -> Result<NodeId> {
    let id = tree.push(
        parent,
        Node::new(name).policy(Overlay::default()).behavior(Swiper::new()),
    )?;
    for (i, page) in pages.into_iter().enumerate() {
        let page = if i == 0 { page } else { page.hidden() };
        tree.push(id, page)?;
    }
    Ok(id)
}

/// Index of the page a pager is showing.
pub fn current_page(tree: &Tree, pager: NodeId) -> Option<usize> {
    tree.children(pager)
        .ok()?
        .iter()
        .position(|c| tree.get(*c).is_some_and(|n| n.is_visible()))
}
