use std::sync::mpsc;

use geom::{Point, Size};

use crate::error::{Error, Result};

/// Well-known key codes.
pub mod keys {
    /// Tab. With shift held, moves focus backwards.
    pub const TAB: u32 = 0x09;
    /// Enter. Activates the focused node.
    pub const ENTER: u32 = 0x0d;
    /// Escape.
    pub const ESCAPE: u32 = 0x1b;
}

/// A pointer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    /// Contact started.
    Down,
    /// Contact ended.
    Up,
    /// Contact moved.
    Move,
}

/// A key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer input at screen coordinates.
    Pointer {
        /// Transition.
        action: PointerAction,
        /// Screen position.
        pos: Point,
    },
    /// Key input.
    Key {
        /// Transition.
        action: KeyAction,
        /// Key code.
        code: u32,
        /// Shift modifier.
        shift: bool,
    },
    /// The screen changed size. Handled by the engine, never dispatched.
    Resize(Size),
}

/// An input event with a millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
    /// Event payload.
    pub kind: EventKind,
    /// Milliseconds since an arbitrary epoch, monotonic per source.
    pub timestamp: u64,
}

impl InputEvent {
    /// A pointer event.
    pub fn pointer(action: PointerAction, pos: Point, timestamp: u64) -> Self {
        Self {
            kind: EventKind::Pointer { action, pos },
            timestamp,
        }
    }

    /// Pointer down.
    pub fn down(x: i32, y: i32, timestamp: u64) -> Self {
        Self::pointer(PointerAction::Down, Point::new(x, y), timestamp)
    }

    /// Pointer move.
    pub fn moved(x: i32, y: i32, timestamp: u64) -> Self {
        Self::pointer(PointerAction::Move, Point::new(x, y), timestamp)
    }

    /// Pointer up.
    pub fn up(x: i32, y: i32, timestamp: u64) -> Self {
        Self::pointer(PointerAction::Up, Point::new(x, y), timestamp)
    }

    /// A key event.
    pub fn key(action: KeyAction, code: u32, shift: bool, timestamp: u64) -> Self {
        Self {
            kind: EventKind::Key {
                action,
                code,
                shift,
            },
            timestamp,
        }
    }

    /// Key down without modifiers.
    pub fn key_down(code: u32, timestamp: u64) -> Self {
        Self::key(KeyAction::Down, code, false, timestamp)
    }

    /// A resize notification.
    pub fn resize(size: Size, timestamp: u64) -> Self {
        Self {
            kind: EventKind::Resize(size),
            timestamp,
        }
    }

    /// The pointer position, for pointer events.
    pub fn pos(&self) -> Option<Point> {
        match self.kind {
            EventKind::Pointer { pos, .. } => Some(pos),
            _ => None,
        }
    }

    /// The pointer action, for pointer events.
    pub fn pointer_action(&self) -> Option<PointerAction> {
        match self.kind {
            EventKind::Pointer { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// The producer side of the event queue. Cheap to clone and safe to move to
/// other threads.
#[derive(Debug, Clone)]
pub struct EventSender {
    /// Channel sender.
    tx: mpsc::Sender<InputEvent>,
}

impl EventSender {
    /// Queue an event. Fails with `Disconnected` if the engine is gone.
    pub fn send(&self, event: InputEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::Disconnected)
    }
}

/// The consumer side of the event queue, drained on the UI thread in FIFO
/// order.
#[derive(Debug)]
pub struct EventQueue {
    /// Channel receiver.
    rx: mpsc::Receiver<InputEvent>,
}

impl EventQueue {
    /// Retrieve the next event without blocking. `Ok(None)` means the queue
    /// is empty; `Disconnected` means it is empty and every sender is gone.
    pub fn try_next(&self) -> Result<Option<InputEvent>> {
        match self.rx.try_recv() {
            Ok(e) => Ok(Some(e)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(Error::Disconnected),
        }
    }

    /// Retrieve the next event, blocking until one arrives or the channel
    /// closes.
    pub fn next_blocking(&self) -> Result<InputEvent> {
        Ok(self.rx.recv()?)
    }

    /// Take everything queued right now, in order.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}

/// Create a connected sender and queue.
pub fn channel() -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, EventQueue { rx })
}
