//! Integration tests for the layout engine.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bezel::{
        Capability, Content, Error, Flow, Grid, Node, NodeId, Overlay, Result, Stack, Style, Tree,
        geom::{Insets, Point, Rect, Size},
    };
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn random_node(rng: &mut StdRng, name: &str) -> Node {
        let gap = rng.random_range(0..3);
        let node = Node::new(name).weight(rng.random_range(0..3));
        let node = match rng.random_range(0..5) {
            0 => node.policy(Stack::row().gap(gap)),
            1 => node.policy(Stack::column().fill()),
            2 => node.policy(Overlay::centered()),
            3 => node.policy(Grid::new(rng.random_range(1..4)).gap(gap)),
            _ => node.policy(Flow::new(gap)),
        };
        let node = match rng.random_range(0..3) {
            0 => node,
            1 => node.fixed(rng.random_range(0..12), rng.random_range(0..12)),
            _ => node.text("ab\ncdef"),
        };
        let mut node = node.style(Style::new().padding(Insets::new(
            rng.random_range(0..3),
            rng.random_range(0..3),
            rng.random_range(0..3),
            rng.random_range(0..3),
        )));
        if rng.random_bool(0.7) {
            node = node.with_cap(Capability::Drawable);
        }
        if rng.random_bool(0.15) {
            node = node.with_cap(Capability::Scrollable);
        }
        if rng.random_bool(0.1) {
            node = node.hidden();
        }
        node
    }

    fn build_random_tree(
        tree: &mut Tree,
        parent: NodeId,
        rng: &mut StdRng,
        depth: usize,
    ) -> Result<()> {
        for i in 0..rng.random_range(0..=3) {
            let id = tree.push(parent, random_node(rng, &format!("n{depth}x{i}")))?;
            if tree.node(id)?.has(Capability::Scrollable) {
                tree.set_scroll(id, Point::new(rng.random_range(0..4), rng.random_range(0..4)))?;
            }
            if depth > 0 {
                build_random_tree(tree, id, rng, depth - 1)?;
            }
        }
        Ok(())
    }

    fn random_tree(seed: u64) -> Result<Tree> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tree = Tree::new(Node::new("root").policy(Stack::column().fill()));
        let root = tree.root();
        build_random_tree(&mut tree, root, &mut rng, 3)?;
        Ok(tree)
    }

    fn rects(tree: &Tree) -> HashMap<NodeId, (Rect, Rect)> {
        tree.subtree(tree.root())
            .filter_map(|id| tree.get(id).map(|n| (id, (n.rect(), n.content_rect()))))
            .collect()
    }

    fn assert_contained(tree: &Tree) -> Result<()> {
        for id in tree.descendants(tree.root()) {
            let node = tree.node(id)?;
            if !tree.is_shown(id) {
                assert!(node.rect().is_empty(), "hidden {} has area", node.name());
                continue;
            }
            let Some(parent) = tree.parent(id) else {
                continue;
            };
            let parent = tree.node(parent)?;
            assert!(
                parent.canvas().contains_rect(&node.rect()),
                "{} at {:?} escapes {} canvas {:?}",
                node.name(),
                node.rect(),
                parent.name(),
                parent.canvas()
            );
            if !parent.has(Capability::Scrollable) {
                assert!(parent.content_rect().contains_rect(&node.rect()));
            }
        }
        Ok(())
    }

    #[test]
    fn random_trees_stay_inside_parents() -> Result<()> {
        for seed in 0..16 {
            let mut tree = random_tree(0x5eed + seed)?;
            tree.layout(Size::new(64, 48))?;
            assert_contained(&tree)?;
        }
        Ok(())
    }

    #[test]
    fn relayout_is_idempotent() -> Result<()> {
        let mut tree = random_tree(0x5eed)?;
        let first = tree.layout(Size::new(80, 40))?;
        assert!(first.measured > 0);
        let before = rects(&tree);

        let second = tree.layout(Size::new(80, 40))?;
        assert!(second.is_noop());
        assert!(!tree.needs_layout());
        assert_eq!(rects(&tree), before);
        Ok(())
    }

    #[test]
    fn screen_change_rearranges_without_dirt() -> Result<()> {
        let mut tree = random_tree(0x5eed + 1)?;
        tree.layout(Size::new(80, 40))?;
        let stats = tree.layout(Size::new(40, 80))?;
        assert!(stats.arranged > 0);
        assert_eq!(tree.node(tree.root())?.rect(), Rect::new(0, 0, 40, 80));
        assert_contained(&tree)?;
        Ok(())
    }

    #[test]
    fn cached_layout_matches_cold_layout() -> Result<()> {
        for seed in 0..8 {
            let mut warm = random_tree(seed)?;
            warm.layout(Size::new(60, 30))?;
            warm.layout(Size::new(30, 60))?;
            warm.layout(Size::new(60, 30))?;

            let mut cold = random_tree(seed)?;
            cold.layout(Size::new(60, 30))?;
            let warm: Vec<_> = warm.subtree(warm.root()).map(|id| rects(&warm)[&id]).collect();
            let cold: Vec<_> = cold.subtree(cold.root()).map(|id| rects(&cold)[&id]).collect();
            assert_eq!(warm, cold, "seed {seed}");
        }
        Ok(())
    }

    #[test]
    fn row_split_under_pressure() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::row()));
        let root = tree.root();
        let a = tree.push(root, Node::new("a").fixed(40, 5))?;
        let b = tree.push(root, Node::new("b").fixed(90, 5))?;
        tree.layout(Size::new(100, 10))?;
        assert_eq!(tree.node(a)?.rect(), Rect::new(0, 0, 25, 10));
        assert_eq!(tree.node(b)?.rect(), Rect::new(25, 0, 75, 10));
        Ok(())
    }

    #[test]
    fn oversized_grid_lays_out() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Grid::new(u32::MAX).gap(1)));
        let root = tree.root();
        let cell = tree.push(root, Node::new("cell").fixed(4, 4))?;
        tree.layout(Size::new(10, 10))?;
        let r = tree.node(cell)?.rect();
        assert_eq!(r.tl, Point::new(0, 0));
        assert!(r.w <= 10 && r.h == 10);
        Ok(())
    }

    #[test]
    fn change_reaches_only_dirty_path() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::column()));
        let root = tree.root();
        let top = tree.push(root, Node::new("top").policy(Stack::row()))?;
        let leaf = tree.push(top, Node::new("leaf").text("hi"))?;
        let other = tree.push(root, Node::new("other").policy(Stack::row()))?;
        for i in 0..4 {
            tree.push(other, Node::new(&format!("o{i}")).fixed(2, 2))?;
        }
        tree.layout(Size::new(40, 40))?;

        tree.set_content(leaf, Content::Text("hello".into()))?;
        assert!(tree.node(top)?.is_measure_dirty());
        assert!(!tree.node(other)?.is_measure_dirty());
        let stats = tree.layout(Size::new(40, 40))?;
        assert_eq!(stats.measured, 3);
        assert_eq!(tree.node(leaf)?.rect().w, 5);
        Ok(())
    }

    #[test]
    fn mirrored_size_follows_source() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::column()));
        let root = tree.root();
        let src = tree.push(root, Node::new("src").text("abc").weight(0))?;
        let mirror = tree.push(root, Node::new("mirror").content(Content::SizeOf(src)).weight(0))?;
        tree.layout(Size::new(20, 20))?;
        assert_eq!(tree.node(mirror)?.desired(), Size::new(3, 1));

        tree.set_content(src, Content::Text("abcdef\nx".into()))?;
        assert!(tree.node(mirror)?.is_measure_dirty());
        tree.layout(Size::new(20, 20))?;
        assert_eq!(tree.node(mirror)?.desired(), Size::new(6, 2));
        Ok(())
    }

    #[test]
    fn self_mirror_is_a_cycle() -> Result<()> {
        let mut tree = Tree::new(Node::new("root"));
        let root = tree.root();
        let a = tree.push(root, Node::new("a"))?;
        let b = tree.push(root, Node::new("b").content(Content::SizeOf(a)))?;
        tree.set_content(a, Content::SizeOf(b))?;
        assert!(matches!(tree.layout(Size::new(10, 10)), Err(Error::LayoutCycle(_))));
        Ok(())
    }

    proptest! {
        #[test]
        fn any_seed_any_screen_contained(seed in 0u64..500, w in 0u32..120, h in 0u32..120) {
            let mut tree = random_tree(seed).map_err(|e| TestCaseError::fail(e.to_string()))?;
            tree.layout(Size::new(w, h)).map_err(|e| TestCaseError::fail(e.to_string()))?;
            assert_contained(&tree).map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
    }
}
