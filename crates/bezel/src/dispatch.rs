use std::iter;

use geom::{Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    error::Result,
    event::{EventKind, InputEvent, KeyAction, PointerAction, keys},
    focus::FocusManager,
    id::NodeId,
    layout::Overflow,
    tree::Tree,
};

/// The phase an event handler is being called in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Root towards the target's parent, before the target sees the event.
    Capture,
    /// The target itself.
    Target,
    /// The target's parent back up to the root.
    Bubble,
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not interested. Propagation continues.
    Ignore,
    /// Processed. Propagation continues.
    Handle,
    /// Processed. No further handlers run for this event.
    Consume,
}

/// Event handlers attached to nodes. Handlers are taken out of their node for
/// the duration of a call, so they can freely mutate the tree through the
/// context, including their own node.
pub trait Behavior {
    /// Handle an event in a propagation phase.
    fn on_event(
        &mut self,
        _phase: Phase,
        _event: &InputEvent,
        _ctx: &mut EventContext<'_>,
    ) -> Result<EventOutcome> {
        Ok(EventOutcome::Ignore)
    }

    /// The node was activated: released under the pointer that pressed it, or
    /// Enter while focused.
    fn on_click(&mut self, _ctx: &mut EventContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// The handle a behavior gets on the tree while it runs.
pub struct EventContext<'a> {
    /// The tree.
    tree: &'a mut Tree,
    /// The node whose behavior is running.
    node: NodeId,
}

impl<'a> EventContext<'a> {
    /// A context for a node.
    pub fn new(tree: &'a mut Tree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The node whose behavior is running.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Read access to the tree.
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// Write access to the tree.
    pub fn tree_mut(&mut self) -> &mut Tree {
        self.tree
    }

    /// The node's arranged rect.
    pub fn rect(&self) -> Rect {
        self.tree.get(self.node).map(|n| n.rect).unwrap_or_default()
    }

    /// The node's content rect.
    pub fn content_rect(&self) -> Rect {
        self.tree
            .get(self.node)
            .map(|n| n.content_rect)
            .unwrap_or_default()
    }

    /// The node's children.
    pub fn children(&self) -> Vec<NodeId> {
        self.tree
            .get(self.node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }
}

/// How a disabled node affects hit-testing of its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledPolicy {
    /// Only the node itself is transparent; its children can still be hit.
    #[default]
    NodeOnly,
    /// The node and its whole subtree are transparent.
    Subtree,
}

/// The accumulated result of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// The target node, if the event had one.
    pub target: Option<NodeId>,
    /// A handler consumed the event.
    pub consumed: bool,
    /// Every handler that returned `Handle` or `Consume`, in call order.
    pub handled: Vec<(NodeId, Phase)>,
    /// The node that was activated, if any.
    pub clicked: Option<NodeId>,
    /// Focus moved as a result of the event.
    pub focus_changed: bool,
}

/// Routes input events through the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatcher {
    /// Disabled-subtree hit-testing behavior.
    pub disabled: DisabledPolicy,
}

impl Dispatcher {
    /// A dispatcher with a disabled policy.
    pub fn new(disabled: DisabledPolicy) -> Self {
        Self { disabled }
    }

    /// Locate the deepest visible, enabled node under a point. Later siblings
    /// win over earlier ones.
    pub fn hit_test(&self, tree: &Tree, point: Point) -> Option<NodeId> {
        let root = tree.get(tree.root())?;
        let mut result = None;
        self.locate(tree, tree.root(), point, root.rect, &mut result);
        result
    }

    /// Recursive step of `hit_test`.
    fn locate(
        &self,
        tree: &Tree,
        id: NodeId,
        point: Point,
        clip: Rect,
        result: &mut Option<NodeId>,
    ) {
        let Some(node) = tree.get(id) else {
            return;
        };
        if !node.visible || (!node.enabled && self.disabled == DisabledPolicy::Subtree) {
            return;
        }
        let inside = node
            .rect
            .intersect(&clip)
            .is_some_and(|r| r.contains_point(point));
        let overflow = node.policy.overflow();
        // Unclipped children can be hit outside their parent.
        if !inside && overflow == Overflow::Clip {
            return;
        }
        if inside && node.enabled {
            *result = Some(id);
        }

        let child_clip = match overflow {
            Overflow::Clip => node.content_rect.intersect(&clip),
            Overflow::Visible => Some(clip),
        };
        let Some(child_clip) = child_clip else {
            return;
        };
        for child in &node.children {
            self.locate(tree, *child, point, child_clip, result);
        }
    }

    /// Dispatch an event: capture from the root down to the target's parent,
    /// the target, then bubble back up. A `Consume` stops handler calls but
    /// focus and press bookkeeping still runs. A handler error also stops
    /// handler calls; bookkeeping runs, then the first error is returned.
    pub fn dispatch(&self, tree: &mut Tree, event: &InputEvent) -> Result<DispatchResult> {
        let mut res = DispatchResult::default();
        let mut failed = None;
        let target = match event.kind {
            EventKind::Pointer { pos, .. } => self.hit_test(tree, pos),
            EventKind::Key { .. } => Some(tree.focus().unwrap_or(tree.root())),
            EventKind::Resize(_) => return Ok(res),
        };
        res.target = target;

        if let Some(target) = target {
            let mut path: Vec<NodeId> = tree.ancestors(target).collect();
            path.reverse();
            let mut route: Vec<(NodeId, Phase)> =
                path.iter().map(|id| (*id, Phase::Capture)).collect();
            route.push((target, Phase::Target));
            route.extend(path.iter().rev().map(|id| (*id, Phase::Bubble)));

            for (id, phase) in route {
                if !tree.get(id).is_some_and(|n| n.enabled) {
                    continue;
                }
                match call_handler(tree, id, phase, event) {
                    Ok(EventOutcome::Ignore) => {}
                    Ok(EventOutcome::Handle) => res.handled.push((id, phase)),
                    Ok(EventOutcome::Consume) => {
                        res.handled.push((id, phase));
                        res.consumed = true;
                        trace!("{:?} consumed by {:?} in {:?}", event.kind, id, phase);
                        break;
                    }
                    Err(e) => {
                        warn!("handler on {:?} failed in {:?}: {}", id, phase, e);
                        failed = Some(e);
                        break;
                    }
                }
            }
        } else {
            warn!("no target for {:?}", event.kind);
        }

        // A failed handler leaves no click or focus move behind it.
        let halted = res.consumed || failed.is_some();
        self.bookkeeping(tree, event, target, halted, &mut res)?;
        if let Some(e) = failed {
            return Err(e);
        }
        debug!(
            "dispatch {:?}: target {:?}, handled {}, consumed {}",
            event.kind,
            res.target,
            res.handled.len(),
            res.consumed
        );
        Ok(res)
    }

    /// Press, release, click and focus state updates that follow every event.
    fn bookkeeping(
        &self,
        tree: &mut Tree,
        event: &InputEvent,
        target: Option<NodeId>,
        halted: bool,
        res: &mut DispatchResult,
    ) -> Result<()> {
        match event.kind {
            EventKind::Pointer {
                action: PointerAction::Down,
                ..
            } => {
                release(tree);
                if let Some(t) = target.filter(|t| tree.contains(*t)) {
                    tree.node_mut(t)?.pressed = true;
                    tree.pressed = Some(t);
                    tree.damage();
                    if let Some(f) = tree.nearest_focusable(t) {
                        res.focus_changed = tree.set_focus(f);
                    }
                }
            }
            EventKind::Pointer {
                action: PointerAction::Up,
                ..
            } => {
                let pressed = release(tree);
                if !halted
                    && let Some(p) = pressed
                    && target == Some(p)
                {
                    res.clicked = click(tree, p)?;
                }
            }
            EventKind::Key {
                action: KeyAction::Down,
                code,
                shift,
            } if !halted => match code {
                keys::TAB => {
                    res.focus_changed = if shift {
                        tree.focus_prev()
                    } else {
                        tree.focus_next()
                    };
                }
                keys::ENTER => {
                    if let Some(f) = tree.focus() {
                        res.clicked = click(tree, f)?;
                    }
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }
}

/// Clear the pressed node, returning it.
fn release(tree: &mut Tree) -> Option<NodeId> {
    let p = tree.pressed.take()?;
    if let Some(n) = tree.nodes.get_mut(p) {
        n.pressed = false;
    }
    tree.damage();
    Some(p)
}

/// Activate a node: the nearest enabled node with a behavior, starting at the
/// node itself, gets `on_click`. Returns the node that was activated.
fn click(tree: &mut Tree, node: NodeId) -> Result<Option<NodeId>> {
    let Some(id) = iter::once(node)
        .chain(tree.ancestors(node))
        .find(|id| tree.get(*id).is_some_and(|n| n.enabled && n.behavior.is_some()))
    else {
        return Ok(None);
    };
    with_behavior(tree, id, |b, ctx| b.on_click(ctx))?;
    trace!("click {:?}", id);
    Ok(Some(id))
}

/// Run a node's handler for one phase.
fn call_handler(
    tree: &mut Tree,
    id: NodeId,
    phase: Phase,
    event: &InputEvent,
) -> Result<EventOutcome> {
    Ok(with_behavior(tree, id, |b, ctx| b.on_event(phase, event, ctx))?
        .unwrap_or(EventOutcome::Ignore))
}

/// Take a node's behavior out, run a closure on it, and put it back unless
/// the closure installed a replacement or removed the node.
fn with_behavior<R>(
    tree: &mut Tree,
    id: NodeId,
    f: impl FnOnce(&mut dyn Behavior, &mut EventContext<'_>) -> Result<R>,
) -> Result<Option<R>> {
    let Some(mut behavior) = tree.node_mut(id)?.behavior.take() else {
        return Ok(None);
    };
    let ret = f(behavior.as_mut(), &mut EventContext::new(tree, id));
    if let Some(n) = tree.nodes.get_mut(id)
        && n.behavior.is_none()
    {
        n.behavior = Some(behavior);
    }
    ret.map(Some)
}
