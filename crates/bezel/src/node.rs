use std::{fmt, rc::Rc, sync::Arc};

use geom::{Point, Rect, Size};

use crate::{
    capability::{Capabilities, Capability},
    dispatch::Behavior,
    id::NodeId,
    layout::{Constraint, Overlay, Policy},
    state::NodeName,
    style::Style,
};

/// A reference to an image asset. The surface resolves the name; the size is
/// what layout reserves for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Asset name.
    pub name: String,
    /// Intrinsic size.
    pub size: Size,
}

impl ImageRef {
    /// Construct an image reference.
    pub fn new(name: &str, size: Size) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// What a node shows on its own, apart from its children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Content {
    /// Nothing. The node sizes to its children.
    #[default]
    Empty,
    /// A fixed intrinsic size.
    Fixed(Size),
    /// A block of text, measured with the node's font.
    Text(String),
    /// An image.
    Image(ImageRef),
    /// Mirror the desired size of another node.
    SizeOf(NodeId),
}

/// Per-node measurement cache. The desired size for the most recent
/// constraints is kept, along with the constraint it was computed for.
#[derive(Debug, Clone, Default)]
pub(crate) struct MeasureCache {
    /// Cached entries, most recent last.
    pub(crate) entries: Vec<(Constraint, Size)>,
}

impl MeasureCache {
    /// Maximum number of constraints cached per node.
    const CAPACITY: usize = 4;

    /// Look up a cached size.
    pub(crate) fn get(&self, c: &Constraint) -> Option<Size> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == c)
            .map(|(_, s)| *s)
    }

    /// The cached size, only if it was the last one computed.
    pub(crate) fn latest(&self, c: &Constraint) -> Option<Size> {
        self.entries.last().filter(|(k, _)| k == c).map(|(_, s)| *s)
    }

    /// Store a size, evicting the oldest entry when full.
    pub(crate) fn put(&mut self, c: Constraint, s: Size) {
        self.entries.retain(|(k, _)| *k != c);
        if self.entries.len() >= Self::CAPACITY {
            self.entries.remove(0);
        }
        self.entries.push((c, s));
    }

    /// Drop everything.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A node in the widget tree. Nodes are created with the builder methods
/// below, inserted into a [`Tree`](crate::Tree), and from then on mutated
/// through the tree so that invalidation is tracked.
pub struct Node {
    /// Name used for lookups and dumps.
    pub(crate) name: NodeName,
    /// Parent node, if attached.
    pub(crate) parent: Option<NodeId>,
    /// Ordered children.
    pub(crate) children: Vec<NodeId>,
    /// Style snapshot.
    pub(crate) style: Arc<Style>,
    /// Intrinsic content.
    pub(crate) content: Content,
    /// Capability flags.
    pub(crate) caps: Capabilities,
    /// Layout policy for children.
    pub(crate) policy: Rc<dyn Policy>,
    /// Share of contested space.
    pub(crate) weight: u32,
    /// Visibility flag.
    pub(crate) visible: bool,
    /// Enabled flag.
    pub(crate) enabled: bool,
    /// Focus flag, kept in sync with the tree's focus.
    pub(crate) focused: bool,
    /// Pressed flag, set between pointer down and up.
    pub(crate) pressed: bool,
    /// Scroll offset for scrollable nodes.
    pub(crate) scroll: Point,
    /// Event handler. Taken out of the node while it runs.
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    /// Measured size must be recomputed.
    pub(crate) measure_dirty: bool,
    /// Children must be re-arranged.
    pub(crate) arrange_dirty: bool,
    /// Measurement cache.
    pub(crate) cache: MeasureCache,
    /// Desired size from the most recent measure.
    pub(crate) desired: Size,
    /// Combined size of the children from the most recent measure.
    pub(crate) extent: Size,
    /// Arranged outer rect.
    pub(crate) rect: Rect,
    /// Arranged content rect: the outer rect minus border and padding.
    pub(crate) content_rect: Rect,
}

impl Node {
    /// A new node with an empty style, no content, no capabilities and an
    /// overlay policy.
    pub fn new(name: &str) -> Self {
        Self {
            name: NodeName::convert(name),
            parent: None,
            children: Vec::new(),
            style: Arc::new(Style::default()),
            content: Content::Empty,
            caps: Capabilities::default(),
            policy: Rc::new(Overlay::default()),
            weight: 1,
            visible: true,
            enabled: true,
            focused: false,
            pressed: false,
            scroll: Point::zero(),
            behavior: None,
            measure_dirty: true,
            arrange_dirty: true,
            cache: MeasureCache::default(),
            desired: Size::zero(),
            extent: Size::zero(),
            rect: Rect::zero(),
            content_rect: Rect::zero(),
        }
    }

    /// Set the style.
    pub fn style(mut self, style: Style) -> Self {
        self.style = Arc::new(style);
        self
    }

    /// Set the content.
    pub fn content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    /// Shorthand for text content.
    pub fn text(self, text: &str) -> Self {
        self.content(Content::Text(text.into()))
    }

    /// Shorthand for fixed-size content.
    pub fn fixed(self, w: u32, h: u32) -> Self {
        self.content(Content::Fixed(Size::new(w, h)))
    }

    /// Set the capability flags.
    pub fn caps(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Add a single capability.
    pub fn with_cap(mut self, cap: Capability) -> Self {
        self.caps = self.caps.with(cap);
        self
    }

    /// Set the layout policy.
    pub fn policy(mut self, policy: impl Policy + 'static) -> Self {
        self.policy = Rc::new(policy);
        self
    }

    /// Set the layout weight.
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the event handler.
    pub fn behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Start disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Node name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// Parent node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The current style snapshot.
    pub fn style_ref(&self) -> &Arc<Style> {
        &self.style
    }

    /// Intrinsic content.
    pub fn content_ref(&self) -> &Content {
        &self.content
    }

    /// Capability flags.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Does the node have this capability?
    pub fn has(&self, cap: Capability) -> bool {
        self.caps.has(cap)
    }

    /// Layout weight.
    pub fn layout_weight(&self) -> u32 {
        self.weight
    }

    /// Is the node visible? This is the node's own flag; an ancestor may still
    /// hide it.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Is the node enabled?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Does the node hold focus?
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Is the node pressed?
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Scroll offset.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Desired size from the last measure pass.
    pub fn desired(&self) -> Size {
        self.desired
    }

    /// Arranged outer rect.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Arranged content rect.
    pub fn content_rect(&self) -> Rect {
        self.content_rect
    }

    /// The rect children are laid out in. This is the content rect, except
    /// for scrollable nodes, where it grows to fit the children and moves by
    /// the scroll offset.
    pub fn canvas(&self) -> Rect {
        if self.caps.scrollable {
            Rect::at(
                self.content_rect.tl - self.scroll,
                self.content_rect.size().max(self.extent),
            )
        } else {
            self.content_rect
        }
    }

    /// Does the node need a measure pass?
    pub fn is_measure_dirty(&self) -> bool {
        self.measure_dirty
    }

    /// Does the node have a handler?
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("content", &self.content)
            .field("caps", &self.caps)
            .field("weight", &self.weight)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("rect", &self.rect)
            .finish()
    }
}
