use std::{fmt, mem, sync::Arc};

use geom::{Frame, Rect};
use tracing::debug;

use crate::{
    error::Result,
    id::NodeId,
    layout::Overflow,
    node::{Content, ImageRef},
    style::{Color, Style},
    tree::Tree,
};

/// A drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// Fill the target. `None` is transparent.
    Fill(Option<Color>),
    /// Draw text with the style's font and foreground color.
    Text(String),
    /// Draw an image.
    Image(ImageRef),
}

/// A single instruction for a drawing surface. Commands are produced fresh
/// on every render and issued back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// The node that produced the command.
    pub node: NodeId,
    /// Where to draw.
    pub target: Rect,
    /// Nothing outside this rect may be touched.
    pub clip: Rect,
    /// What to draw.
    pub op: DrawOp,
    /// The node's style at render time.
    pub style: Arc<Style>,
    /// The node held focus.
    pub focused: bool,
    /// The node was pressed.
    pub pressed: bool,
}

impl DrawCommand {
    /// Does any part of the command survive clipping?
    pub fn is_visible(&self) -> bool {
        self.target.intersect(&self.clip).is_some()
    }
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.target;
        write!(f, "{}x{}+{}+{} ", r.w, r.h, r.tl.x, r.tl.y)?;
        match &self.op {
            DrawOp::Fill(Some(c)) => write!(f, "fill {c}"),
            DrawOp::Fill(None) => write!(f, "fill none"),
            DrawOp::Text(t) => write!(f, "text {:?} {}", t, self.style.foreground_color()),
            DrawOp::Image(i) => write!(f, "image {}", i.name),
        }
    }
}

/// A drawing surface. Commands arrive in emitted order, followed by a call to
/// `present` once the frame is complete.
pub trait Surface {
    /// Draw one command.
    fn draw(&mut self, cmd: &DrawCommand) -> Result<()>;

    /// Show the completed frame.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A surface that keeps every frame, for tests and tooling.
#[derive(Debug, Default)]
pub struct Recorder {
    /// Completed frames.
    pub frames: Vec<Vec<DrawCommand>>,
    /// The frame being drawn.
    current: Vec<DrawCommand>,
}

impl Recorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent completed frame.
    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Surface for Recorder {
    fn draw(&mut self, cmd: &DrawCommand) -> Result<()> {
        self.current.push(cmd.clone());
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames.push(mem::take(&mut self.current));
        Ok(())
    }
}

/// Walks an arranged tree and produces draw commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    /// Skip subtrees that lie entirely outside the running clip.
    pub prune: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self { prune: true }
    }
}

impl Renderer {
    /// A renderer with pruning on or off.
    pub fn new(prune: bool) -> Self {
        Self { prune }
    }

    /// Produce the commands for the current arrangement, back to front.
    pub fn render(&self, tree: &Tree) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        let mut pruned = 0;
        if let Some(root) = tree.get(tree.root()) {
            self.walk(tree, tree.root(), root.rect, &mut out, &mut pruned);
        }
        debug!("render: {} commands, {} subtrees pruned", out.len(), pruned);
        out
    }

    /// Render and send the commands to a surface. Returns the number of
    /// commands issued.
    pub fn render_to(&self, tree: &Tree, surface: &mut dyn Surface) -> Result<usize> {
        let cmds = self.render(tree);
        for c in &cmds {
            surface.draw(c)?;
        }
        surface.present()?;
        Ok(cmds.len())
    }

    /// Pre-order step with the clip accumulated from ancestors.
    fn walk(
        &self,
        tree: &Tree,
        id: NodeId,
        clip: Rect,
        out: &mut Vec<DrawCommand>,
        pruned: &mut usize,
    ) {
        let Some(node) = tree.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let clips = node.policy.overflow() == Overflow::Clip;
        // Unclipped children may spill outside their parent, so only clipping
        // nodes take their subtree with them.
        if self.prune && clips && node.rect.intersect(&clip).is_none() {
            *pruned += 1;
            return;
        }

        if node.caps.drawable {
            let cmd = |target: Rect, op: DrawOp| DrawCommand {
                node: id,
                target,
                clip,
                op,
                style: node.style.clone(),
                focused: node.focused,
                pressed: node.pressed,
            };
            out.push(match &node.content {
                Content::Text(t) => cmd(node.content_rect, DrawOp::Text(t.clone())),
                Content::Image(i) => cmd(node.content_rect, DrawOp::Image(i.clone())),
                _ => cmd(node.rect, DrawOp::Fill(node.style.background_color())),
            });
            let border = node.style.border_insets();
            if let Some(color) = node.style.border_color()
                && !border.is_zero()
            {
                for edge in Frame::new(node.rect, border).edges() {
                    out.push(cmd(edge, DrawOp::Fill(Some(color))));
                }
            }
        }

        let child_clip = if clips {
            node.content_rect.clip_to(&clip)
        } else {
            clip
        };
        for child in &node.children {
            self.walk(tree, *child, child_clip, out, pruned);
        }
    }
}

#[cfg(test)]
mod tests {
    use geom::{Insets, Point, Size};

    use super::*;
    use crate::{
        capability::Capability,
        layout::{Align, Overlay, Stack},
        node::Node,
    };

    fn drawable(name: &str) -> Node {
        Node::new(name).with_cap(Capability::Drawable)
    }

    #[test]
    fn order_and_ops() -> Result<()> {
        let mut t = Tree::new(drawable("root").policy(Stack::column()).style(
            Style::new().background(Color::BLACK),
        ));
        let r = t.root();
        let label = t.push(r, drawable("label").text("12:00").weight(0))?;
        t.push(r, Node::new("spacer").fixed(1, 1))?;
        let icon = t.push(
            r,
            drawable("icon")
                .content(Content::Image(ImageRef::new("battery", Size::new(4, 2))))
                .weight(0),
        )?;
        t.layout(Size::new(20, 20))?;

        let cmds = Renderer::default().render(&t);
        let nodes: Vec<NodeId> = cmds.iter().map(|c| c.node).collect();
        assert_eq!(nodes, vec![r, label, icon]);
        assert_eq!(cmds[0].op, DrawOp::Fill(Some(Color::BLACK)));
        assert_eq!(cmds[1].op, DrawOp::Text("12:00".into()));
        assert_eq!(cmds[1].target, Rect::new(0, 0, 20, 1));
        assert!(matches!(cmds[2].op, DrawOp::Image(_)));
        Ok(())
    }

    #[test]
    fn borders_add_edges() -> Result<()> {
        let mut t = Tree::new(Node::new("root"));
        let r = t.root();
        let card = t.push(
            r,
            drawable("card").style(Style::new().border(Insets::all(1), Color::WHITE)),
        )?;
        t.layout(Size::new(10, 6))?;
        let cmds = Renderer::default().render(&t);
        assert_eq!(cmds.len(), 5);
        assert!(cmds.iter().all(|c| c.node == card));
        assert_eq!(cmds[1].target, Rect::new(0, 0, 10, 1));
        assert!(cmds[1..].iter().all(|c| c.op == DrawOp::Fill(Some(Color::WHITE))));
        Ok(())
    }

    #[test]
    fn clip_accumulates_and_prunes() -> Result<()> {
        let mut t = Tree::new(Node::new("root"));
        let r = t.root();
        let list = t.push(
            r,
            Node::new("list")
                .with_cap(Capability::Scrollable)
                .policy(Stack::column())
                .style(Style::new().padding(Insets::all(1))),
        )?;
        let mut rows = Vec::new();
        for i in 0..4 {
            rows.push(t.push(list, drawable(&format!("row{i}")).fixed(8, 4).weight(0))?);
        }
        t.set_policy(r, Overlay::new(Align::Start, Align::Start))?;
        t.layout(Size::new(10, 10))?;
        // The list is shorter than its content; only the first rows show.
        assert_eq!(t.node(list)?.content_rect(), Rect::new(1, 1, 8, 8));

        let pruned = Renderer::new(true).render(&t);
        let full = Renderer::new(false).render(&t);
        let visible = |cmds: &[DrawCommand]| -> Vec<NodeId> {
            cmds.iter().filter(|c| c.is_visible()).map(|c| c.node).collect()
        };
        assert_eq!(visible(&pruned), visible(&full));
        assert_eq!(visible(&full), vec![rows[0], rows[1]]);
        assert!(pruned.len() < full.len());
        assert!(full.iter().all(|c| c.clip == Rect::new(1, 1, 8, 8)));

        t.set_scroll(list, Point::new(0, 8))?;
        t.layout(Size::new(10, 10))?;
        assert_eq!(visible(&Renderer::default().render(&t)), vec![rows[2], rows[3]]);
        Ok(())
    }

    #[test]
    fn recorder_frames() -> Result<()> {
        let mut t = Tree::new(drawable("root"));
        t.layout(Size::new(4, 4))?;
        let mut rec = Recorder::new();
        assert_eq!(Renderer::default().render_to(&t, &mut rec)?, 1);
        Renderer::default().render_to(&t, &mut rec)?;
        assert_eq!(rec.frames.len(), 2);
        assert_eq!(rec.last_frame().map(<[DrawCommand]>::len), Some(1));
        assert_eq!(
            rec.last_frame().map(|f| f[0].to_string()),
            Some("4x4+0+0 fill none".to_string())
        );
        Ok(())
    }
}
