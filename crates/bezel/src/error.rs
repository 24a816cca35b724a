use std::{io, result::Result as StdResult, sync::mpsc};

use thiserror::Error;

use crate::id::NodeId;

/// Result type for bezel operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("invalid geometry: {0}")]
    /// A geometry value could not be constructed.
    InvalidGeometry(String),
    #[error("invalid child {child:?} for {parent:?}: {reason}")]
    /// A tree mutation would break the tree structure.
    InvalidChild {
        /// Intended parent.
        parent: NodeId,
        /// Offending child.
        child: NodeId,
        /// What was wrong.
        reason: String,
    },
    #[error("node not found: {0:?}")]
    /// The node does not exist, or is not where the caller expected it.
    NotFound(NodeId),
    #[error("layout cycle through {0:?}")]
    /// A node's size depends on itself. This is a bug in the tree or policy.
    LayoutCycle(NodeId),
    #[error("invalid name: {0}")]
    /// A node name contains invalid characters.
    InvalidName(String),
    #[error("config: {0}")]
    /// Configuration could not be loaded.
    Config(String),
    #[error("surface: {0}")]
    /// The drawing surface failed.
    Surface(String),
    #[error("event queue disconnected")]
    /// All event producers have gone away.
    Disconnected,
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        match e {
            geom::Error::InvalidGeometry(s) => Self::InvalidGeometry(s),
        }
    }
}

impl From<mpsc::RecvError> for Error {
    fn from(_: mpsc::RecvError) -> Self {
        Self::Disconnected
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Surface(e.to_string())
    }
}
