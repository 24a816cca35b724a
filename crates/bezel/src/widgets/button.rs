use std::{cell::Cell, rc::Rc};

use geom::Insets;

use crate::{
    capability::{Capabilities, Capability},
    dispatch::{Behavior, EventContext, EventOutcome, Phase},
    error::Result,
    event::InputEvent,
    id::NodeId,
    node::Node,
    style::Style,
    tree::Tree,
};

/// Counts activations. The counter is shared, so callers can keep a handle
/// after the behavior has moved into the tree.
#[derive(Debug, Default, Clone)]
pub struct Button {
    /// Activation count.
    clicks: Rc<Cell<u32>>,
}

impl Button {
    /// A button with a fresh counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the counter.
    pub fn counter(&self) -> Rc<Cell<u32>> {
        self.clicks.clone()
    }
}

impl Behavior for Button {
    fn on_event(
        &mut self,
        phase: Phase,
        event: &InputEvent,
        _ctx: &mut EventContext<'_>,
    ) -> Result<EventOutcome> {
        if phase == Phase::Target && event.pointer_action().is_some() {
            return Ok(EventOutcome::Handle);
        }
        Ok(EventOutcome::Ignore)
    }

    fn on_click(&mut self, _ctx: &mut EventContext<'_>) -> Result<()> {
        self.clicks.set(self.clicks.get().saturating_add(1));
        Ok(())
    }
}

/// Add a text button under a parent. Returns the node and its click counter.
pub fn button(
    tree: &mut Tree,
    parent: NodeId,
    label: &str,
    style: Style,
) -> Result<(NodeId, Rc<Cell<u32>>)> {
    let b = Button::new();
    let clicks = b.counter();
    let caps = Capabilities::new(Capability::Drawable).with(Capability::Focusable);
    let id = tree.push(
        parent,
        Node::new(label)
            .text(label)
            .caps(caps)
            .style(style.padding(Insets::symmetric(1, 2)))
            .weight(0)
            .behavior(b),
    )?;
    Ok((id, clicks))
}
