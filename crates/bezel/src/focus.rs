use std::iter;

use tracing::trace;

use crate::{capability::Capability, id::NodeId, tree::Tree};

/// Focus management over a tree. Exactly zero or one node holds focus, and
/// that node is always attached, shown, enabled and focusable.
pub trait FocusManager {
    /// Could the node take focus right now?
    fn can_focus(&self, node: NodeId) -> bool;

    /// Does the node have focus?
    fn is_focused(&self, node: NodeId) -> bool;

    /// Focus a node. Returns `true` if focus changed.
    fn set_focus(&mut self, node: NodeId) -> bool;

    /// Drop focus. Returns `true` if something was focused.
    fn clear_focus(&mut self) -> bool;

    /// Focus the first focusable node in pre-order.
    fn focus_first(&mut self) -> bool;

    /// Focus the next focusable node in pre-order, wrapping at the end.
    fn focus_next(&mut self) -> bool;

    /// Focus the previous focusable node in pre-order, wrapping at the start.
    fn focus_prev(&mut self) -> bool;

    /// The node itself or its nearest ancestor that can take focus.
    fn nearest_focusable(&self, start: NodeId) -> Option<NodeId>;

    /// Drop focus if the focused node no longer qualifies.
    fn ensure_focus_valid(&mut self);
}

impl FocusManager for Tree {
    fn can_focus(&self, node: NodeId) -> bool {
        self.get(node)
            .is_some_and(|n| n.enabled && n.has(Capability::Focusable))
            && self.is_attached(node)
            && self.is_shown(node)
    }

    fn is_focused(&self, node: NodeId) -> bool {
        self.focus == Some(node)
    }

    fn set_focus(&mut self, node: NodeId) -> bool {
        if self.is_focused(node) || !self.can_focus(node) {
            return false;
        }
        if let Some(old) = self.focus.take()
            && let Some(n) = self.nodes.get_mut(old)
        {
            n.focused = false;
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.focused = true;
        }
        self.focus = Some(node);
        trace!("focus {:?}", node);
        self.damage();
        true
    }

    fn clear_focus(&mut self) -> bool {
        let Some(old) = self.focus.take() else {
            return false;
        };
        if let Some(n) = self.nodes.get_mut(old) {
            n.focused = false;
        }
        self.damage();
        true
    }

    fn focus_first(&mut self) -> bool {
        match focusable(self).first() {
            Some(id) => self.set_focus(*id),
            None => false,
        }
    }

    fn focus_next(&mut self) -> bool {
        let ring = focusable(self);
        let next = match self.focus.and_then(|f| ring.iter().position(|id| *id == f)) {
            Some(i) => ring.get((i + 1) % ring.len()),
            None => ring.first(),
        };
        match next {
            Some(id) => self.set_focus(*id),
            None => false,
        }
    }

    fn focus_prev(&mut self) -> bool {
        let ring = focusable(self);
        let prev = match self.focus.and_then(|f| ring.iter().position(|id| *id == f)) {
            Some(i) => ring.get((i + ring.len() - 1) % ring.len()),
            None => ring.last(),
        };
        match prev {
            Some(id) => self.set_focus(*id),
            None => false,
        }
    }

    fn nearest_focusable(&self, start: NodeId) -> Option<NodeId> {
        iter::once(start)
            .chain(self.ancestors(start))
            .find(|id| self.can_focus(*id))
    }

    fn ensure_focus_valid(&mut self) {
        if let Some(f) = self.focus
            && !self.can_focus(f)
        {
            self.clear_focus();
        }
    }
}

/// Focusable nodes in pre-order from the root.
fn focusable(tree: &Tree) -> Vec<NodeId> {
    tree.subtree(tree.root())
        .filter(|id| tree.can_focus(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Result, node::Node};

    fn focus_tree() -> Result<(Tree, Vec<NodeId>)> {
        let mut t = Tree::new(Node::new("root"));
        let r = t.root();
        let box_ = t.push(r, Node::new("box"))?;
        let mut ids = Vec::new();
        for name in ["one", "two", "three"] {
            ids.push(t.push(box_, Node::new(name).with_cap(Capability::Focusable))?);
        }
        ids.push(box_);
        Ok((t, ids))
    }

    #[test]
    fn cycles_in_preorder() -> Result<()> {
        let (mut t, ids) = focus_tree()?;
        assert!(t.focus_next());
        assert_eq!(t.focus(), Some(ids[0]));
        t.focus_next();
        t.focus_next();
        assert_eq!(t.focus(), Some(ids[2]));
        t.focus_next();
        assert_eq!(t.focus(), Some(ids[0]));
        t.focus_prev();
        assert_eq!(t.focus(), Some(ids[2]));
        assert!(t.get(ids[2]).is_some_and(|n| n.is_focused()));
        assert!(t.get(ids[0]).is_some_and(|n| !n.is_focused()));
        Ok(())
    }

    #[test]
    fn skips_unfocusable() -> Result<()> {
        let (mut t, ids) = focus_tree()?;
        t.set_enabled(ids[1], false)?;
        t.focus_first();
        t.focus_next();
        assert_eq!(t.focus(), Some(ids[2]));
        assert!(!t.set_focus(ids[1]));
        assert!(!t.set_focus(ids[3]));
        Ok(())
    }

    #[test]
    fn hiding_drops_focus() -> Result<()> {
        let (mut t, ids) = focus_tree()?;
        assert!(t.set_focus(ids[1]));
        t.set_visible(ids[3], false)?;
        assert_eq!(t.focus(), None);
        assert!(t.get(ids[1]).is_some_and(|n| !n.is_focused()));
        assert!(!t.focus_first());
        Ok(())
    }

    #[test]
    fn nearest() -> Result<()> {
        let (mut t, ids) = focus_tree()?;
        let leaf = t.push(ids[0], Node::new("leaf"))?;
        assert_eq!(t.nearest_focusable(leaf), Some(ids[0]));
        assert_eq!(t.nearest_focusable(ids[3]), None);
        Ok(())
    }
}
