use std::{error::Error as StdError, fmt, result::Result as StdResult};

/// Geometry error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A value that cannot be represented, such as a negative width.
    InvalidGeometry(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry(s) => write!(f, "invalid geometry: {s}"),
        }
    }
}

impl StdError for Error {}

/// Result type for geometry operations.
pub type Result<T> = StdResult<T, Error>;

/// Convert a signed dimension, rejecting negative values.
pub(crate) fn dimension(what: &str, v: i32) -> Result<u32> {
    u32::try_from(v).map_err(|_| Error::InvalidGeometry(format!("negative {what}: {v}")))
}
