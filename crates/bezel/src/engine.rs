use geom::Size;
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    dispatch::{DispatchResult, Dispatcher},
    error::{Error, Result},
    event::{self, EventKind, EventQueue, EventSender, InputEvent},
    layout::LayoutStats,
    render::{Renderer, Surface},
    tree::Tree,
};

/// What one call to [`Engine::pump`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Events taken from the queue.
    pub events: usize,
    /// Layout work, summed over every pass run.
    pub layout: LayoutStats,
    /// Commands issued to the surface, if a frame was drawn.
    pub commands: Option<usize>,
    /// Per-event dispatch results, in queue order.
    pub results: Vec<DispatchResult>,
}

/// The UI-thread loop: drains the event queue, dispatches, lays out and
/// renders. Owns the tree; producers on other threads hold an
/// [`EventSender`].
pub struct Engine {
    /// The widget tree.
    tree: Tree,
    /// Consumer end of the event queue.
    queue: EventQueue,
    /// Event router.
    dispatcher: Dispatcher,
    /// Command generator.
    renderer: Renderer,
    /// Current screen size.
    screen: Size,
    /// The screen size of the last completed layout.
    laid_out: Option<Size>,
}

impl Engine {
    /// Build an engine around a tree. Returns the engine and the first sender
    /// for its queue.
    pub fn new(tree: Tree, config: &EngineConfig) -> Result<(Self, EventSender)> {
        config.validate()?;
        let (tx, queue) = event::channel();
        Ok((
            Self {
                tree,
                queue,
                dispatcher: Dispatcher::new(config.disabled_policy),
                renderer: Renderer::new(config.prune_render),
                screen: config.screen(),
                laid_out: None,
            },
            tx,
        ))
    }

    /// The tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable access to the tree.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The current screen size.
    pub fn screen(&self) -> Size {
        self.screen
    }

    /// Change the screen size. Takes effect on the next layout.
    pub fn resize(&mut self, screen: Size) {
        if screen != self.screen {
            self.screen = screen;
            self.tree.damage();
        }
    }

    /// Lay out if anything changed since the last pass.
    fn ensure_layout(&mut self, acc: &mut LayoutStats) -> Result<()> {
        if self.laid_out == Some(self.screen) && !self.tree.needs_layout() {
            return Ok(());
        }
        let s = self.tree.layout(self.screen)?;
        self.laid_out = Some(self.screen);
        acc.measured += s.measured;
        acc.arranged += s.arranged;
        Ok(())
    }

    /// Dispatch one event immediately, bypassing the queue. Layout is brought
    /// up to date first, so hit-testing sees the current arrangement.
    pub fn dispatch(&mut self, event: &InputEvent) -> Result<DispatchResult> {
        if let EventKind::Resize(size) = event.kind {
            self.resize(size);
            return Ok(DispatchResult::default());
        }
        self.ensure_layout(&mut LayoutStats::default())?;
        self.dispatcher.dispatch(&mut self.tree, event)
    }

    /// Drain every queued event, then lay out and render if anything changed.
    /// Events are taken one at a time, so an error leaves everything behind
    /// the failing event queued for the next pump.
    pub fn pump(&mut self, surface: &mut dyn Surface) -> Result<PumpStats> {
        let mut stats = PumpStats::default();
        loop {
            let e = match self.queue.try_next() {
                Ok(Some(e)) => e,
                Ok(None) | Err(Error::Disconnected) => break,
                Err(e) => return Err(e),
            };
            stats.events += 1;
            if !matches!(e.kind, EventKind::Resize(_)) {
                self.ensure_layout(&mut stats.layout)?;
            }
            stats.results.push(self.dispatch(&e)?);
        }
        self.ensure_layout(&mut stats.layout)?;
        if self.tree.take_damage() {
            stats.commands = Some(self.renderer.render_to(&self.tree, surface)?);
        }
        debug!(
            "pump: {} events, measured {}, arranged {}, commands {:?}",
            stats.events, stats.layout.measured, stats.layout.arranged, stats.commands
        );
        Ok(stats)
    }

    /// Pump until every sender has been dropped and the queue is empty.
    pub fn run(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.pump(surface)?;
        loop {
            match self.queue.next_blocking() {
                Ok(e) => {
                    self.dispatch(&e)?;
                    self.pump(surface)?;
                }
                Err(Error::Disconnected) => {
                    info!("event queue closed");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }
}
