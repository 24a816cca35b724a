//! Bezel: a widget tree engine for small touch displays.
//!
//! Bezel keeps an arena of widget nodes, lays them out with a two-pass
//! measure/arrange protocol, routes pointer and key input through
//! capture/target/bubble phases, and turns the arranged tree into an ordered
//! list of draw commands for an external drawing surface.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Tree`] - the node arena, with mutation, traversal and layout
//! - [`Engine`] - the UI-thread loop tying the queue, dispatcher and renderer
//! - [`Behavior`] - the trait implemented by event handlers
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Size, Insets)
//! - [`layout`] - Constraints and layout policies
//! - [`widgets`] - Stock behaviors and node constructors

#![warn(missing_docs)]

/// Capability flags.
pub mod capability;
/// Engine configuration.
pub mod config;
/// Event routing.
pub mod dispatch;
/// Debug dumps of a tree.
pub mod dump;
/// The UI-thread engine loop.
pub mod engine;
/// Error types.
pub mod error;
/// Input events and the cross-thread queue.
pub mod event;
/// Focus management.
pub mod focus;
/// Swipe gesture tracking.
pub mod gesture;
/// Node ID type.
pub mod id;
/// Layout engine.
pub mod layout;
/// Node data.
pub mod node;
/// Draw command generation.
pub mod render;
/// Node names.
pub mod state;
/// Style snapshots.
pub mod style;
/// The node arena.
pub mod tree;
/// Stock widgets.
pub mod widgets;

pub use geom;

pub use capability::{Capabilities, Capability};
pub use config::EngineConfig;
pub use dispatch::{
    Behavior, DisabledPolicy, DispatchResult, Dispatcher, EventContext, EventOutcome, Phase,
};
pub use engine::{Engine, PumpStats};
pub use error::{Error, Result};
pub use event::{EventKind, EventQueue, EventSender, InputEvent, KeyAction, PointerAction};
pub use focus::FocusManager;
pub use id::NodeId;
pub use layout::{Align, Constraint, Flow, Grid, LayoutStats, Overflow, Overlay, Policy, Stack};
pub use node::{Content, ImageRef, Node};
pub use render::{DrawCommand, DrawOp, Recorder, Renderer, Surface};
pub use state::NodeName;
pub use style::{Color, Font, Style, StyleKey, StyleValue};
pub use tree::Tree;
