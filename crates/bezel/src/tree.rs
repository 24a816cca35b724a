use std::{
    collections::{HashMap, HashSet},
    iter, mem,
    rc::Rc,
    sync::Arc,
};

use geom::{Point, Size};
use slotmap::SlotMap;
use tracing::trace;

use crate::{
    capability::Capabilities,
    error::{Error, Result},
    focus::FocusManager,
    id::NodeId,
    layout::{self, LayoutStats, Policy},
    node::{Content, Node},
    state::NodeName,
    style::Style,
};

/// The node arena. The tree owns every node; parents refer to children and
/// children back to parents by [`NodeId`]. A single node is the root, created
/// with the tree. Other nodes are inserted detached and then attached.
pub struct Tree {
    /// Node storage.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Root node.
    root: NodeId,
    /// Focused node, if any.
    pub(crate) focus: Option<NodeId>,
    /// Node under an active pointer press, if any.
    pub(crate) pressed: Option<NodeId>,
    /// Mirror nodes keyed by the node whose size they mirror.
    dependents: HashMap<NodeId, Vec<NodeId>>,
    /// Something changed that needs a redraw.
    damaged: bool,
}

impl Tree {
    /// Create a tree around a root node.
    pub fn new(root: Node) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root);
        let mut t = Self {
            nodes,
            root,
            focus: None,
            pressed: None,
            dependents: HashMap::new(),
            damaged: true,
        };
        t.track_content(root);
        t
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the arena empty? Never true, since the root always exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Does the node exist?
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node, failing with `NotFound`.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NotFound(id))
    }

    /// Mutable node lookup. Callers are responsible for invalidation.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NotFound(id))
    }

    /// The focused node.
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// The pressed node.
    pub fn pressed(&self) -> Option<NodeId> {
        self.pressed
    }

    /// Insert a detached node.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = self.nodes.insert(node);
        self.track_content(id);
        id
    }

    /// Insert a node and append it to a parent.
    pub fn push(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        let id = self.insert(node);
        if let Err(e) = self.push_child(parent, id) {
            self.nodes.remove(id);
            self.untrack_content(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Append a child.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let n = self.node(parent)?.children.len();
        self.add_child(parent, child, n)
    }

    /// Insert a child at an index, clamped to the current child count.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(Error::NotFound(child));
        }
        let invalid = |reason: &str| Error::InvalidChild {
            parent,
            child,
            reason: reason.into(),
        };
        if child == self.root {
            return Err(invalid("node is the root"));
        }
        if self.nodes[child].parent.is_some() {
            return Err(invalid("node already has a parent"));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(invalid("node is the parent or one of its ancestors"));
        }

        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        trace!("attach {:?} to {:?} at {}", child, parent, index);

        self.invalidate(parent);
        self.invalidate(child);
        self.ensure_invariants();
        Ok(())
    }

    /// Remove a direct child from a parent. The child stays in the arena,
    /// detached, and can be attached again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let p = self.nodes.get_mut(parent).ok_or(Error::NotFound(parent))?;
        let pos = p
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(Error::NotFound(child))?;
        p.children.remove(pos);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
        trace!("detach {:?} from {:?}", child, parent);
        self.invalidate(parent);
        self.ensure_invariants();
        Ok(())
    }

    /// Detach a node from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        match self.node(id)?.parent {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(()),
        }
    }

    /// Remove a node and its whole subtree from the arena. The root cannot be
    /// destroyed.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::InvalidChild {
                parent: id,
                child: id,
                reason: "the root cannot be destroyed".into(),
            });
        }
        self.detach(id)?;
        for n in self.subtree_post_order(id) {
            self.untrack_content(n);
            if let Some(mirrors) = self.dependents.remove(&n) {
                for m in mirrors {
                    self.invalidate(m);
                }
            }
            self.nodes.remove(n);
        }
        self.ensure_invariants();
        Ok(())
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Ancestors of a node, nearest first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// A lazy pre-order iterator over the descendants of a node, excluding the
    /// node itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = self
            .nodes
            .get(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        Descendants { tree: self, stack }
    }

    /// A node followed by its descendants in pre-order.
    pub fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .contains_key(id)
            .then_some(id)
            .into_iter()
            .chain(self.descendants(id))
    }

    /// Collect a subtree in post-order, including the root.
    pub(crate) fn subtree_post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((id, visited)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if visited {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }
        out
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Is the node connected to the root?
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || (self.contains(id) && self.is_ancestor(self.root, id))
    }

    /// Is the node, and every ancestor, visible?
    pub fn is_shown(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.visible)
            && self
                .ancestors(id)
                .all(|a| self.nodes.get(a).is_some_and(|n| n.visible))
    }

    /// The first node in pre-order from the root with a matching name. The
    /// query is normalised the same way node names are.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let name = NodeName::convert(name);
        self.subtree(self.root).find(|id| self.nodes[*id].name == name)
    }

    /// A slash-separated path of names from the topmost ancestor to the node.
    pub fn path(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        let mut parts = vec![node.name.as_str()];
        for a in self.ancestors(id) {
            parts.push(self.nodes[a].name.as_str());
        }
        parts.reverse();
        Ok(format!("/{}", parts.join("/")))
    }

    /// Replace a node's style. The measure cache is invalidated only when a
    /// size-affecting key changed.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let node = self.node_mut(id)?;
        let resize = node.style.size_differs(&style);
        node.style = Arc::new(style);
        if resize {
            self.invalidate(id);
        } else {
            self.damaged = true;
        }
        Ok(())
    }

    /// Replace a node's content.
    pub fn set_content(&mut self, id: NodeId, content: Content) -> Result<()> {
        self.node(id)?;
        self.untrack_content(id);
        self.nodes[id].content = content;
        self.track_content(id);
        self.invalidate(id);
        Ok(())
    }

    /// Show or hide a node. Hidden nodes take no space and hide their subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.visible != visible {
            node.visible = visible;
            self.invalidate(id);
            self.ensure_invariants();
        }
        Ok(())
    }

    /// Enable or disable a node.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.enabled != enabled {
            node.enabled = enabled;
            self.damaged = true;
            self.ensure_invariants();
        }
        Ok(())
    }

    /// Replace a node's capability flags.
    pub fn set_capabilities(&mut self, id: NodeId, caps: Capabilities) -> Result<()> {
        let node = self.node_mut(id)?;
        let scroll_changed = node.caps.scrollable != caps.scrollable;
        node.caps = caps;
        if scroll_changed {
            self.invalidate(id);
        }
        self.damaged = true;
        self.ensure_invariants();
        Ok(())
    }

    /// Set a node's layout weight. Only the parent's arrangement changes.
    pub fn set_weight(&mut self, id: NodeId, weight: u32) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.weight != weight {
            node.weight = weight;
            if let Some(p) = node.parent {
                self.mark_arrange(p);
            }
        }
        Ok(())
    }

    /// Replace a node's layout policy.
    pub fn set_policy(&mut self, id: NodeId, policy: impl Policy + 'static) -> Result<()> {
        self.node_mut(id)?.policy = Rc::new(policy);
        self.invalidate(id);
        Ok(())
    }

    /// Set a scroll offset. Only takes effect on scrollable nodes, and only
    /// changes arrangement.
    pub fn set_scroll(&mut self, id: NodeId, scroll: Point) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.scroll != scroll {
            node.scroll = scroll;
            self.mark_arrange(id);
        }
        Ok(())
    }

    /// Invalidate a node's measured size. The flag propagates to every
    /// ancestor and to every node mirroring the size of an invalidated node.
    pub fn invalidate(&mut self, id: NodeId) {
        let mut seen = HashSet::new();
        let mut work = vec![id];
        while let Some(start) = work.pop() {
            let mut current = Some(start);
            while let Some(n) = current {
                if !seen.insert(n) {
                    break;
                }
                let Some(node) = self.nodes.get_mut(n) else {
                    break;
                };
                node.measure_dirty = true;
                node.arrange_dirty = true;
                node.cache.clear();
                if let Some(mirrors) = self.dependents.get(&n) {
                    work.extend(mirrors.iter().copied());
                }
                current = node.parent;
            }
        }
        self.damaged = true;
    }

    /// Mark a node and its ancestors for re-arrangement without touching
    /// measured sizes.
    pub(crate) fn mark_arrange(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(n) = current {
            let Some(node) = self.nodes.get_mut(n) else {
                break;
            };
            node.arrange_dirty = true;
            current = node.parent;
        }
        self.damaged = true;
    }

    /// Lay out the tree for a screen. The root always fills the screen. Only
    /// invalidated nodes are recomputed; the returned counters show how much
    /// work was done. A layout cycle aborts the pass with `LayoutCycle`.
    pub fn layout(&mut self, screen: Size) -> Result<LayoutStats> {
        layout::run(self, screen)
    }

    /// Does the tree need a layout pass?
    pub fn needs_layout(&self) -> bool {
        self.nodes
            .get(self.root)
            .is_some_and(|n| n.measure_dirty || n.arrange_dirty)
    }

    /// Flag the tree for redraw.
    pub fn damage(&mut self) {
        self.damaged = true;
    }

    /// Return and clear the redraw flag.
    pub fn take_damage(&mut self) -> bool {
        mem::take(&mut self.damaged)
    }

    /// Record a mirror relationship for a node's content.
    fn track_content(&mut self, id: NodeId) {
        if let Some(Content::SizeOf(src)) = self.nodes.get(id).map(|n| &n.content) {
            self.dependents.entry(*src).or_default().push(id);
        }
    }

    /// Forget a mirror relationship for a node's content.
    fn untrack_content(&mut self, id: NodeId) {
        let src = match self.nodes.get(id).map(|n| &n.content) {
            Some(Content::SizeOf(src)) => *src,
            _ => {
                // The node may already be gone; scrub it from every list.
                for mirrors in self.dependents.values_mut() {
                    mirrors.retain(|m| *m != id);
                }
                return;
            }
        };
        if let Some(mirrors) = self.dependents.get_mut(&src) {
            mirrors.retain(|m| *m != id);
            if mirrors.is_empty() {
                self.dependents.remove(&src);
            }
        }
    }

    /// Restore the focus and press invariants after a structural change.
    pub(crate) fn ensure_invariants(&mut self) {
        self.ensure_focus_valid();
        if let Some(p) = self.pressed
            && !(self.is_attached(p) && self.is_shown(p))
        {
            if let Some(n) = self.nodes.get_mut(p) {
                n.pressed = false;
            }
            self.pressed = None;
        }
    }
}

/// Pre-order iterator over descendants. See [`Tree::descendants`].
pub struct Descendants<'a> {
    /// Tree being walked.
    tree: &'a Tree,
    /// Pending nodes, next on top.
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.nodes.get(id) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}
