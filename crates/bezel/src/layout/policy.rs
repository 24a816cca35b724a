use geom::{Axis, Point, Rect, Size};

use super::{Bound, Constraint, LayoutPass, allocate_shares};
use crate::{error::Result, id::NodeId};

/// How a container treats children that extend past its content rect when
/// drawing and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Children are clipped to the content rect.
    #[default]
    Clip,
    /// Children may draw outside the content rect.
    Visible,
}

/// Placement of a child along one axis within the space it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Leading edge, at desired size.
    Start,
    /// Centered, at desired size.
    Center,
    /// Trailing edge, at desired size.
    End,
    /// Fill the whole space.
    #[default]
    Stretch,
}

impl Align {
    /// Place an extent of `desired` within `avail` units starting at `start`.
    /// Returns the offset and the extent.
    pub fn place(self, start: i32, avail: u32, desired: u32) -> (i32, u32) {
        let len = desired.min(avail);
        let slack = avail - len;
        match self {
            Self::Start => (start, len),
            Self::Center => (offset(start, slack / 2), len),
            Self::End => (offset(start, slack), len),
            Self::Stretch => (start, avail),
        }
    }
}

/// What a policy knows about a visible child when arranging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// The child's desired size from the measure pass.
    pub desired: Size,
    /// The child's share of contested space.
    pub weight: u32,
}

/// The visible children of a node, as seen by its policy during measurement.
pub struct Children<'p, 't> {
    /// The running pass.
    pub(super) pass: &'p mut LayoutPass<'t>,
    /// Visible child ids, in order.
    pub(super) ids: &'p [NodeId],
}

impl Children<'_, '_> {
    /// Number of visible children.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if there are no visible children.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Layout weight of a child.
    pub fn weight(&self, i: usize) -> u32 {
        self.ids
            .get(i)
            .and_then(|id| self.pass.tree.get(*id))
            .map(|n| n.weight)
            .unwrap_or(0)
    }

    /// Measure a child under a constraint. The last measurement of each child
    /// is what the arrange pass sees as its desired size.
    pub fn measure(&mut self, i: usize, c: Constraint) -> Result<Size> {
        match self.ids.get(i) {
            Some(id) => self.pass.measure(*id, c),
            None => Ok(Size::zero()),
        }
    }
}

/// A container layout strategy. Policies see only visible children; hidden
/// children are collapsed by the engine.
pub trait Policy {
    /// A short name for dumps and logs.
    fn name(&self) -> &'static str;

    /// Measure the children and return the size they need together, given
    /// the space inside the container's insets.
    fn measure(&self, available: Constraint, children: &mut Children<'_, '_>) -> Result<Size>;

    /// Place the children within `content`. Must return one rect per slot.
    /// Rects outside `content` are clipped by the engine.
    fn arrange(&self, content: Rect, slots: &[Slot]) -> Vec<Rect>;

    /// How children extending past the content rect are treated.
    fn overflow(&self) -> Overflow {
        Overflow::Clip
    }
}

/// Children in a line along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stack {
    /// Main axis.
    pub axis: Axis,
    /// Space between adjacent children.
    pub gap: u32,
    /// Cross-axis placement.
    pub cross: Align,
    /// Hand surplus main-axis space to weighted children.
    pub fill: bool,
}

impl Stack {
    /// A stack along an axis.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            gap: 0,
            cross: Align::Stretch,
            fill: false,
        }
    }

    /// Left to right.
    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    /// Top to bottom.
    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    /// Set the gap.
    pub fn gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Set the cross-axis alignment.
    pub fn cross(mut self, align: Align) -> Self {
        self.cross = align;
        self
    }

    /// Enable surplus distribution.
    pub fn fill(mut self) -> Self {
        self.fill = true;
        self
    }

    /// Total gap space for `n` children.
    fn gaps(&self, n: usize) -> u32 {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.gap.saturating_mul(n.saturating_sub(1))
    }
}

impl Policy for Stack {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::Horizontal => "row",
            Axis::Vertical => "column",
        }
    }

    fn measure(&self, available: Constraint, children: &mut Children<'_, '_>) -> Result<Size> {
        let c = available.with(self.axis, Bound::Unbounded);
        let mut main = self.gaps(children.len());
        let mut cross = 0;
        for i in 0..children.len() {
            let s = children.measure(i, c)?;
            main = main.saturating_add(along(s, self.axis));
            cross = cross.max(along(s, self.axis.cross()));
        }
        Ok(from_axes(self.axis, main, cross))
    }

    fn arrange(&self, content: Rect, slots: &[Slot]) -> Vec<Rect> {
        let avail = along(content.size(), self.axis).saturating_sub(self.gaps(slots.len()));
        let desired: Vec<u32> = slots.iter().map(|s| along(s.desired, self.axis)).collect();
        let weights: Vec<u32> = slots.iter().map(|s| s.weight).collect();
        let sizes = distribute(avail, &desired, &weights, self.fill);

        let cross_avail = along(content.size(), self.axis.cross());
        let (main_start, cross_start) = match self.axis {
            Axis::Horizontal => (content.tl.x, content.tl.y),
            Axis::Vertical => (content.tl.y, content.tl.x),
        };
        let mut cursor = main_start;
        let mut out = Vec::with_capacity(slots.len());
        for (slot, len) in slots.iter().zip(sizes) {
            let (cpos, clen) =
                self.cross
                    .place(cross_start, cross_avail, along(slot.desired, self.axis.cross()));
            out.push(match self.axis {
                Axis::Horizontal => Rect::new(cursor, cpos, len, clen),
                Axis::Vertical => Rect::new(cpos, cursor, clen, len),
            });
            cursor = offset(offset(cursor, len), self.gap);
        }
        out
    }
}

/// Decide main-axis sizes for a stack. Weight-zero children get their desired
/// size first, truncated to what is left. If the weighted children then don't
/// fit, the deficit is taken from them in proportion to weight; a child never
/// goes below zero and whatever it could not give is taken from the others.
/// With `fill`, surplus is handed out by the same rule.
fn distribute(avail: u32, desired: &[u32], weights: &[u32], fill: bool) -> Vec<u32> {
    let mut sizes = desired.to_vec();
    let mut left = avail;
    for (i, w) in weights.iter().enumerate() {
        if *w == 0 {
            sizes[i] = desired[i].min(left);
            left -= sizes[i];
        }
    }

    let flex: Vec<usize> = (0..weights.len()).filter(|i| weights[*i] > 0).collect();
    let want: u64 = flex.iter().map(|i| u64::from(desired[*i])).sum();
    if want <= u64::from(left) {
        if fill && !flex.is_empty() {
            let surplus = left - want as u32;
            let w: Vec<u32> = flex.iter().map(|i| weights[*i]).collect();
            for (i, share) in flex.iter().zip(allocate_shares(surplus, &w)) {
                sizes[*i] += share;
            }
        }
        return sizes;
    }

    let mut deficit = want - u64::from(left);
    let mut active = flex;
    while deficit > 0 && !active.is_empty() {
        let amount = u32::try_from(deficit).unwrap_or(u32::MAX);
        let w: Vec<u32> = active.iter().map(|i| weights[*i]).collect();
        for (i, share) in active.iter().zip(allocate_shares(amount, &w)) {
            let cut = share.min(sizes[*i]);
            sizes[*i] -= cut;
            deficit -= u64::from(cut);
        }
        active.retain(|i| sizes[*i] > 0);
    }
    sizes
}

/// Children layered on top of each other, each aligned within the whole
/// content rect. Later children are drawn over earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overlay {
    /// Horizontal alignment.
    pub h: Align,
    /// Vertical alignment.
    pub v: Align,
    /// Whether layers may spill past the content rect when drawn.
    pub overflow: Overflow,
}

impl Overlay {
    /// An overlay with explicit alignment.
    pub fn new(h: Align, v: Align) -> Self {
        Self {
            h,
            v,
            overflow: Overflow::Clip,
        }
    }

    /// Center children at their desired size.
    pub fn centered() -> Self {
        Self::new(Align::Center, Align::Center)
    }

    /// Don't clip children to the content rect.
    pub fn unclipped(mut self) -> Self {
        self.overflow = Overflow::Visible;
        self
    }
}

impl Policy for Overlay {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn measure(&self, available: Constraint, children: &mut Children<'_, '_>) -> Result<Size> {
        let mut s = Size::zero();
        for i in 0..children.len() {
            s = s.max(children.measure(i, available)?);
        }
        Ok(s)
    }

    fn arrange(&self, content: Rect, slots: &[Slot]) -> Vec<Rect> {
        slots
            .iter()
            .map(|slot| {
                let (x, w) = self.h.place(content.tl.x, content.w, slot.desired.w);
                let (y, h) = self.v.place(content.tl.y, content.h, slot.desired.h);
                Rect::new(x, y, w, h)
            })
            .collect()
    }

    fn overflow(&self) -> Overflow {
        self.overflow
    }
}

/// Children in equal cells, filled row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Number of columns. Zero is treated as one.
    pub columns: u32,
    /// Space between cells in both directions.
    pub gap: u32,
}

impl Grid {
    /// A grid with a column count.
    pub fn new(columns: u32) -> Self {
        Self { columns, gap: 0 }
    }

    /// Set the gap.
    pub fn gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Column and row counts for `n` children.
    fn shape(&self, n: usize) -> (u32, u32) {
        let cols = self.columns.max(1);
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        (cols, n.div_ceil(cols))
    }
}

impl Policy for Grid {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn measure(&self, available: Constraint, children: &mut Children<'_, '_>) -> Result<Size> {
        let (cols, rows) = self.shape(children.len());
        let gaps_w = self.gap.saturating_mul(cols - 1);
        let gaps_h = self.gap.saturating_mul(rows.saturating_sub(1));
        let cell = Constraint {
            width: match available.width {
                Bound::AtMost(w) => Bound::AtMost(w.saturating_sub(gaps_w) / cols),
                Bound::Unbounded => Bound::Unbounded,
            },
            height: match available.height {
                Bound::AtMost(h) => Bound::AtMost(h.saturating_sub(gaps_h) / rows.max(1)),
                Bound::Unbounded => Bound::Unbounded,
            },
        };
        let mut max = Size::zero();
        for i in 0..children.len() {
            max = max.max(children.measure(i, cell)?);
        }
        Ok(Size::new(
            max.w.saturating_mul(cols).saturating_add(gaps_w),
            max.h.saturating_mul(rows).saturating_add(gaps_h),
        ))
    }

    fn arrange(&self, content: Rect, slots: &[Slot]) -> Vec<Rect> {
        let (cols, rows) = self.shape(slots.len());
        // Only columns that hold a child get a width.
        let used = slots.len().min(cols as usize);
        let avail_w = content.w.saturating_sub(self.gap.saturating_mul(cols - 1));
        let widths: Vec<u32> = (0..used).map(|c| even_share(avail_w, cols, c)).collect();
        let heights = allocate_shares(
            content
                .h
                .saturating_sub(self.gap.saturating_mul(rows.saturating_sub(1))),
            &vec![1; rows as usize],
        );
        let starts = |start: i32, lens: &[u32]| {
            let mut pos = start;
            lens.iter()
                .map(|l| {
                    let p = pos;
                    pos = offset(offset(pos, *l), self.gap);
                    p
                })
                .collect::<Vec<i32>>()
        };
        let xs = starts(content.tl.x, &widths);
        let ys = starts(content.tl.y, &heights);
        (0..slots.len())
            .map(|i| {
                let (c, r) = (i % cols as usize, i / cols as usize);
                Rect::new(xs[c], ys[r], widths[c], heights[r])
            })
            .collect()
    }
}

/// Part `i` of `amount` split evenly into `parts`, the remainder going to the
/// earliest parts. Matches `allocate_shares` with equal weights.
fn even_share(amount: u32, parts: u32, i: usize) -> u32 {
    let parts = parts.max(1);
    let extra = usize::try_from(amount % parts).unwrap_or(usize::MAX);
    amount / parts + u32::from(i < extra)
}

/// Children left to right at their desired size, wrapping onto a new line
/// when the next child would not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flow {
    /// Space between children and between lines.
    pub gap: u32,
}

impl Flow {
    /// A flow with a gap.
    pub fn new(gap: u32) -> Self {
        Self { gap }
    }

    /// Top-left positions for a run of sizes within a width, plus the total
    /// extent used.
    fn lines(&self, width: Option<u32>, sizes: &[Size]) -> (Vec<Point>, Size) {
        let mut out = Vec::with_capacity(sizes.len());
        let (mut x, mut y, mut line_h, mut max_w) = (0u32, 0u32, 0u32, 0u32);
        for s in sizes {
            let start = if x == 0 { 0 } else { x.saturating_add(self.gap) };
            if x > 0 && width.is_some_and(|w| start.saturating_add(s.w) > w) {
                y = y.saturating_add(line_h).saturating_add(self.gap);
                line_h = 0;
                out.push(Point::new(0, to_i32(y)));
                x = s.w;
            } else {
                out.push(Point::new(to_i32(start), to_i32(y)));
                x = start.saturating_add(s.w);
            }
            line_h = line_h.max(s.h);
            max_w = max_w.max(x);
        }
        (out, Size::new(max_w, y.saturating_add(line_h)))
    }
}

impl Policy for Flow {
    fn name(&self) -> &'static str {
        "flow"
    }

    fn measure(&self, available: Constraint, children: &mut Children<'_, '_>) -> Result<Size> {
        let mut sizes = Vec::with_capacity(children.len());
        for i in 0..children.len() {
            sizes.push(children.measure(i, available)?);
        }
        Ok(self.lines(available.width.limit(), &sizes).1)
    }

    fn arrange(&self, content: Rect, slots: &[Slot]) -> Vec<Rect> {
        let sizes: Vec<Size> = slots.iter().map(|s| s.desired.min(content.size())).collect();
        let (points, _) = self.lines(Some(content.w), &sizes);
        points
            .into_iter()
            .zip(sizes)
            .map(|(p, s)| Rect::at(content.tl + p, s).clip_to(&content))
            .collect()
    }
}

/// The extent of a size along an axis.
fn along(s: Size, axis: Axis) -> u32 {
    match axis {
        Axis::Horizontal => s.w,
        Axis::Vertical => s.h,
    }
}

/// Build a size from main and cross extents.
fn from_axes(axis: Axis, main: u32, cross: u32) -> Size {
    match axis {
        Axis::Horizontal => Size::new(main, cross),
        Axis::Vertical => Size::new(cross, main),
    }
}

/// Move a coordinate forward by an unsigned amount, saturating.
fn offset(pos: i32, by: u32) -> i32 {
    pos.saturating_add(to_i32(by))
}

/// Clamp an unsigned value into the signed coordinate range.
fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
