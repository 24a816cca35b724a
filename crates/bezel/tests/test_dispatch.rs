//! Integration tests for event routing, focus and clicks.

#[cfg(test)]
mod tests {
    use bezel::{
        Behavior, Capability, DisabledPolicy, Dispatcher, EventContext, EventOutcome, InputEvent,
        KeyAction, Node, NodeId, Overlay, Phase, Result, Stack, Style, Tree,
        event::keys,
        geom::{Point, Size},
        widgets::button,
    };

    /// Swallows every event on its way down.
    struct Blocker;

    impl Behavior for Blocker {
        fn on_event(
            &mut self,
            phase: Phase,
            _event: &InputEvent,
            _ctx: &mut EventContext<'_>,
        ) -> Result<EventOutcome> {
            Ok(if phase == Phase::Capture {
                EventOutcome::Consume
            } else {
                EventOutcome::Ignore
            })
        }
    }

    fn layered() -> Result<(Tree, NodeId, NodeId, NodeId)> {
        let mut tree = Tree::new(Node::new("root").policy(Overlay::default()));
        let root = tree.root();
        let panel = tree.push(root, Node::new("panel"))?;
        let inner = tree.push(panel, Node::new("inner"))?;
        let other = tree.push(root, Node::new("other").fixed(2, 2).hidden())?;
        tree.layout(Size::new(10, 10))?;
        Ok((tree, panel, inner, other))
    }

    #[test]
    fn disabled_policy_controls_subtree() -> Result<()> {
        let (mut tree, panel, inner, _) = layered()?;
        tree.set_enabled(panel, false)?;
        let p = Point::new(5, 5);
        assert_eq!(Dispatcher::new(DisabledPolicy::NodeOnly).hit_test(&tree, p), Some(inner));
        assert_eq!(
            Dispatcher::new(DisabledPolicy::Subtree).hit_test(&tree, p),
            Some(tree.root())
        );
        Ok(())
    }

    #[test]
    fn hidden_nodes_are_never_hit() -> Result<()> {
        let (mut tree, panel, inner, other) = layered()?;
        let d = Dispatcher::default();
        assert_ne!(d.hit_test(&tree, Point::new(0, 0)), Some(other));
        tree.set_visible(panel, false)?;
        tree.layout(Size::new(10, 10))?;
        assert_eq!(d.hit_test(&tree, Point::new(5, 5)), Some(tree.root()));
        assert_ne!(d.hit_test(&tree, Point::new(5, 5)), Some(inner));
        assert_eq!(d.hit_test(&tree, Point::new(50, 50)), None);
        Ok(())
    }

    #[test]
    fn later_sibling_beats_deeper_earlier_one() -> Result<()> {
        let (mut tree, _, _, other) = layered()?;
        let root = tree.root();
        let top = tree.push(root, Node::new("top"))?;
        tree.set_visible(other, true)?;
        tree.layout(Size::new(10, 10))?;
        assert_eq!(Dispatcher::default().hit_test(&tree, Point::new(1, 1)), Some(top));
        Ok(())
    }

    #[test]
    fn scrolled_content_is_hit_where_drawn() -> Result<()> {
        let mut tree = Tree::new(Node::new("root"));
        let root = tree.root();
        let list = tree.push(
            root,
            Node::new("list")
                .policy(Stack::column())
                .with_cap(Capability::Scrollable),
        )?;
        let mut items = Vec::new();
        for i in 0..8 {
            items.push(tree.push(list, Node::new(&format!("item{i}")).fixed(10, 1).weight(0))?);
        }
        tree.set_scroll(list, Point::new(0, 3))?;
        tree.layout(Size::new(10, 4))?;

        let d = Dispatcher::default();
        assert_eq!(d.hit_test(&tree, Point::new(1, 0)), Some(items[3]));
        assert_eq!(d.hit_test(&tree, Point::new(1, 3)), Some(items[6]));
        // Rows scrolled out of view can't be reached.
        assert_eq!(tree.node(items[0])?.rect().tl.y, -3);
        assert_eq!(d.hit_test(&tree, Point::new(1, -3)), None);
        Ok(())
    }

    #[test]
    fn tap_focuses_and_clicks() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::column()));
        let root = tree.root();
        let (ok, ok_clicks) = button(&mut tree, root, "ok", Style::new())?;
        let (cancel, cancel_clicks) = button(&mut tree, root, "cancel", Style::new())?;
        tree.layout(Size::new(20, 20))?;
        assert_eq!(tree.node(cancel)?.rect().tl.y, 3);

        let d = Dispatcher::default();
        let res = d.dispatch(&mut tree, &InputEvent::down(4, 4, 0))?;
        assert_eq!(res.target, Some(cancel));
        assert!(res.focus_changed);
        assert_eq!(tree.focus(), Some(cancel));
        assert_eq!(tree.pressed(), Some(cancel));

        let res = d.dispatch(&mut tree, &InputEvent::up(5, 4, 40))?;
        assert_eq!(res.clicked, Some(cancel));
        assert_eq!(res.handled, vec![(cancel, Phase::Target)]);
        assert_eq!(cancel_clicks.get(), 1);
        assert_eq!(ok_clicks.get(), 0);
        assert_eq!(tree.pressed(), None);
        assert!(!tree.node(ok)?.is_focused());
        Ok(())
    }

    #[test]
    fn keys_follow_focus() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::column()));
        let root = tree.root();
        let (ok, ok_clicks) = button(&mut tree, root, "ok", Style::new())?;
        let (cancel, cancel_clicks) = button(&mut tree, root, "cancel", Style::new())?;
        tree.layout(Size::new(20, 20))?;
        let d = Dispatcher::default();

        let res = d.dispatch(&mut tree, &InputEvent::key_down(u32::from('x'), 0))?;
        assert_eq!(res.target, Some(root));

        d.dispatch(&mut tree, &InputEvent::key_down(keys::TAB, 1))?;
        assert_eq!(tree.focus(), Some(ok));
        d.dispatch(&mut tree, &InputEvent::key_down(keys::TAB, 2))?;
        assert_eq!(tree.focus(), Some(cancel));
        d.dispatch(&mut tree, &InputEvent::key_down(keys::TAB, 3))?;
        assert_eq!(tree.focus(), Some(ok));
        let res = d.dispatch(&mut tree, &InputEvent::key(KeyAction::Down, keys::TAB, true, 4))?;
        assert!(res.focus_changed);
        assert_eq!(tree.focus(), Some(cancel));

        let res = d.dispatch(&mut tree, &InputEvent::key_down(keys::ENTER, 5))?;
        assert_eq!(res.target, Some(cancel));
        assert_eq!(res.clicked, Some(cancel));
        assert_eq!(cancel_clicks.get(), 1);
        assert_eq!(ok_clicks.get(), 0);
        Ok(())
    }

    #[test]
    fn consumed_press_still_tracks_pressed_node() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::column()).behavior(Blocker));
        let root = tree.root();
        let (ok, clicks) = button(&mut tree, root, "ok", Style::new())?;
        tree.layout(Size::new(20, 20))?;
        let d = Dispatcher::default();

        let res = d.dispatch(&mut tree, &InputEvent::down(1, 1, 0))?;
        assert!(res.consumed);
        assert_eq!(res.handled, vec![(root, Phase::Capture)]);
        assert_eq!(tree.pressed(), Some(ok));
        assert!(tree.node(ok)?.is_pressed());
        assert_eq!(tree.focus(), Some(ok));

        let res = d.dispatch(&mut tree, &InputEvent::up(1, 1, 10))?;
        assert!(res.consumed);
        assert_eq!(res.clicked, None);
        assert_eq!(tree.pressed(), None);
        assert!(!tree.node(ok)?.is_pressed());
        assert_eq!(clicks.get(), 0);
        Ok(())
    }

    #[test]
    fn disabled_node_swallows_nothing() -> Result<()> {
        let mut tree = Tree::new(Node::new("root").policy(Stack::column()).behavior(Blocker));
        let root = tree.root();
        let (ok, clicks) = button(&mut tree, root, "ok", Style::new())?;
        tree.set_enabled(root, false)?;
        tree.layout(Size::new(20, 20))?;

        let d = Dispatcher::default();
        d.dispatch(&mut tree, &InputEvent::down(1, 1, 0))?;
        let res = d.dispatch(&mut tree, &InputEvent::up(1, 1, 10))?;
        assert!(!res.consumed);
        assert_eq!(res.clicked, Some(ok));
        assert_eq!(clicks.get(), 1);
        Ok(())
    }
}
