use std::{fmt, str::FromStr};

use convert_case::{Case, Casing};

use crate::error::{Error, Result};

/// Return true if the character may appear in a node name.
pub fn valid_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

/// A node name: lowercase ASCII alphanumerics plus underscores. Names are used
/// for lookups, paths and the debug dump. They need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName {
    /// Stored name.
    name: String,
}

impl NodeName {
    /// Create a name, failing if the string contains invalid characters.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() || !name.chars().all(valid_name_char) {
            return Err(Error::InvalidName(name.into()));
        }
        Ok(Self { name: name.into() })
    }

    /// Munge any string into a valid name: snake-case it, then drop whatever
    /// is left that isn't allowed. Names that are already valid are kept
    /// as-is, so "item2" stays "item2".
    pub fn convert(name: &str) -> Self {
        if let Ok(valid) = Self::new(name) {
            return valid;
        }
        let filtered: String = name
            .to_case(Case::Snake)
            .chars()
            .filter(|c| valid_name_char(*c))
            .collect();
        if filtered.is_empty() {
            Self {
                name: "node".into(),
            }
        } else {
            Self { name: filtered }
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl FromStr for NodeName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl From<&str> for NodeName {
    fn from(name: &str) -> Self {
        Self::convert(name)
    }
}
