//! The two-pass layout engine.
//!
//! A layout pass first measures the tree bottom-up: every node computes a
//! desired size from its content, its style insets and, through its
//! [`Policy`], the desired sizes of its visible children. It then arranges the
//! tree top-down, handing each node a final rect. Nodes whose invalidation
//! flags are clear, and whose constraints and rects have not changed, reuse
//! their cached results.

use std::collections::HashSet;

use geom::{Axis, Insets, Point, Rect, Size};
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    id::NodeId,
    node::Content,
    tree::Tree,
};

/// Layout policies.
mod policy;

pub use policy::{Align, Children, Flow, Grid, Overflow, Overlay, Policy, Slot, Stack};

/// A bound on one axis of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// At most this many units.
    AtMost(u32),
    /// No limit.
    Unbounded,
}

impl Bound {
    /// Clamp a value to this bound.
    pub fn clamp(self, v: u32) -> u32 {
        match self {
            Self::AtMost(max) => v.min(max),
            Self::Unbounded => v,
        }
    }

    /// Reduce the bound by an amount, clamping at zero.
    pub fn shrink(self, by: u32) -> Self {
        match self {
            Self::AtMost(max) => Self::AtMost(max.saturating_sub(by)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// The bound as an optional limit.
    pub fn limit(self) -> Option<u32> {
        match self {
            Self::AtMost(max) => Some(max),
            Self::Unbounded => None,
        }
    }
}

/// The space offered to a node during measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    /// Horizontal bound.
    pub width: Bound,
    /// Vertical bound.
    pub height: Bound,
}

impl Constraint {
    /// Bounded in both axes.
    pub fn at_most(s: Size) -> Self {
        Self {
            width: Bound::AtMost(s.w),
            height: Bound::AtMost(s.h),
        }
    }

    /// Unbounded in both axes.
    pub fn unbounded() -> Self {
        Self {
            width: Bound::Unbounded,
            height: Bound::Unbounded,
        }
    }

    /// Clamp a size to this constraint.
    pub fn clamp(&self, s: Size) -> Size {
        Size::new(self.width.clamp(s.w), self.height.clamp(s.h))
    }

    /// The constraint left after removing insets.
    pub fn shrink(&self, insets: Insets) -> Self {
        Self {
            width: self.width.shrink(insets.horizontal()),
            height: self.height.shrink(insets.vertical()),
        }
    }

    /// The bound along an axis.
    pub fn axis(&self, axis: Axis) -> Bound {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// A copy with the bound along an axis replaced.
    pub fn with(mut self, axis: Axis, bound: Bound) -> Self {
        match axis {
            Axis::Horizontal => self.width = bound,
            Axis::Vertical => self.height = bound,
        }
        self
    }
}

/// Counters from a layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Nodes whose size was computed rather than read from cache.
    pub measured: usize,
    /// Nodes that received a new arrangement.
    pub arranged: usize,
}

impl LayoutStats {
    /// True if the pass did no work.
    pub fn is_noop(&self) -> bool {
        self.measured == 0 && self.arranged == 0
    }
}

/// State for a single layout pass over a tree.
pub(crate) struct LayoutPass<'t> {
    /// Tree being laid out.
    tree: &'t mut Tree,
    /// Nodes currently being measured, for cycle detection.
    visiting: HashSet<NodeId>,
    /// Pass counters.
    stats: LayoutStats,
}

impl<'t> LayoutPass<'t> {
    /// Start a pass.
    fn new(tree: &'t mut Tree) -> Self {
        Self {
            tree,
            visiting: HashSet::new(),
            stats: LayoutStats::default(),
        }
    }

    /// Measure a node under a constraint, using the cache where possible.
    pub(crate) fn measure(&mut self, id: NodeId, c: Constraint) -> Result<Size> {
        let node = self.tree.node_mut(id)?;
        if !node.visible {
            node.desired = Size::zero();
            return Ok(Size::zero());
        }
        if self.visiting.contains(&id) {
            return Err(Error::LayoutCycle(id));
        }
        // Containers only reuse their most recent result, since arranging
        // reads the desired sizes their children were left with.
        let hit = if node.children.is_empty() {
            node.cache.get(&c)
        } else {
            node.cache.latest(&c)
        };
        if !node.measure_dirty
            && let Some(s) = hit
        {
            node.desired = s;
            return Ok(s);
        }

        self.visiting.insert(id);
        let ret = self.measure_uncached(id, c);
        self.visiting.remove(&id);
        let s = ret?;

        let node = self.tree.node_mut(id)?;
        node.cache.put(c, s);
        node.desired = s;
        node.measure_dirty = false;
        node.arrange_dirty = true;
        self.stats.measured += 1;
        trace!("measure {} {:?} -> {:?}", node.name, c, s);
        Ok(s)
    }

    /// Compute a node's desired size.
    fn measure_uncached(&mut self, id: NodeId, c: Constraint) -> Result<Size> {
        let node = self.tree.node(id)?;
        let style = node.style.clone();
        let content = node.content.clone();
        let policy = node.policy.clone();
        let scrollable = node.caps.scrollable;
        let kids = self.visible_children(id)?;

        let insets = style.content_insets();
        let inner = c.shrink(insets);
        let own = match content {
            Content::Empty => Size::zero(),
            Content::Fixed(s) => s,
            Content::Text(text) => style.text_font().measure(&text),
            Content::Image(img) => img.size,
            Content::SizeOf(src) => self.mirror(src, inner)?,
        };
        // Scrollable nodes offer their children unlimited space.
        let offered = if scrollable {
            Constraint::unbounded()
        } else {
            inner
        };
        let children = if kids.is_empty() {
            Size::zero()
        } else {
            policy.measure(
                offered,
                &mut Children {
                    pass: self,
                    ids: &kids,
                },
            )?
        };
        self.tree.node_mut(id)?.extent = children;
        Ok(c.clamp(own.max(children).grow(insets)))
    }

    /// The desired size of a mirrored node. A missing or hidden source
    /// measures as zero.
    fn mirror(&mut self, src: NodeId, c: Constraint) -> Result<Size> {
        if self.visiting.contains(&src) {
            return Err(Error::LayoutCycle(src));
        }
        match self.tree.get(src) {
            None => Ok(Size::zero()),
            Some(n) if !n.visible => Ok(Size::zero()),
            Some(n) if !n.measure_dirty => Ok(n.desired),
            Some(_) => self.measure(src, c),
        }
    }

    /// Give a node its final rect and arrange its children.
    pub(crate) fn arrange(&mut self, id: NodeId, rect: Rect) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        if !node.arrange_dirty && node.rect == rect {
            return Ok(());
        }
        node.rect = rect;
        node.content_rect = rect.inset(node.style.content_insets());
        node.arrange_dirty = false;
        self.stats.arranged += 1;
        let canvas = node.canvas();
        let policy = node.policy.clone();
        let children = node.children.clone();

        let mut kids = Vec::with_capacity(children.len());
        for child in children {
            let n = self.tree.node(child)?;
            if n.visible {
                kids.push((
                    child,
                    Slot {
                        desired: n.desired,
                        weight: n.weight,
                    },
                ));
            } else {
                self.collapse(child, canvas.tl);
            }
        }
        if kids.is_empty() {
            return Ok(());
        }

        let slots: Vec<Slot> = kids.iter().map(|(_, s)| *s).collect();
        let rects = policy.arrange(canvas, &slots);
        for (i, (child, _)) in kids.iter().enumerate() {
            let r = rects.get(i).copied().unwrap_or_default();
            let r = if canvas.contains_rect(&r) {
                r
            } else {
                warn!("{} placed {:?} outside {:?}", policy.name(), r, canvas);
                r.clip_to(&canvas)
            };
            self.arrange(*child, r)?;
        }
        Ok(())
    }

    /// Give a hidden subtree empty rects at a point inside the parent.
    fn collapse(&mut self, id: NodeId, at: Point) {
        for n in self.tree.subtree(id).collect::<Vec<_>>() {
            if let Ok(node) = self.tree.node_mut(n) {
                node.rect = Rect::at(at, Size::zero());
                node.content_rect = node.rect;
            }
        }
    }

    /// Children of a node that are visible.
    fn visible_children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .tree
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|c| self.tree.get(*c).is_some_and(|n| n.visible))
            .collect())
    }
}

/// Run a layout pass over a tree for a screen. See [`Tree::layout`].
pub(crate) fn run(tree: &mut Tree, screen: Size) -> Result<LayoutStats> {
    let root = tree.root();
    let mut pass = LayoutPass::new(tree);
    pass.measure(root, Constraint::at_most(screen))?;
    pass.arrange(root, screen.rect())?;
    let stats = pass.stats;
    if !stats.is_noop() {
        tree.damage();
    }
    debug!(
        "layout {}x{}: measured {}, arranged {}",
        screen.w, screen.h, stats.measured, stats.arranged
    );
    Ok(stats)
}

/// Split an amount across weights using largest-remainder rounding. Ties go
/// to the earlier index. Weights of zero are treated as one.
pub(crate) fn allocate_shares(amount: u32, weights: &[u32]) -> Vec<u32> {
    if amount == 0 || weights.is_empty() {
        return vec![0; weights.len()];
    }
    let total: u64 = weights.iter().map(|w| u64::from((*w).max(1))).sum();

    let mut base = Vec::with_capacity(weights.len());
    let mut rem = Vec::with_capacity(weights.len());
    for w in weights {
        let prod = u64::from(amount) * u64::from((*w).max(1));
        base.push((prod / total) as u32);
        rem.push(prod % total);
    }

    let used: u32 = base.iter().sum();
    let extra = amount.saturating_sub(used);
    if extra == 0 {
        return base;
    }

    let mut idx: Vec<usize> = (0..weights.len()).collect();
    idx.sort_by(|a, b| rem[*b].cmp(&rem[*a]).then_with(|| a.cmp(b)));
    for i in 0..extra as usize {
        if let Some(target) = idx.get(i) {
            base[*target] = base[*target].saturating_add(1);
        }
    }
    base
}
