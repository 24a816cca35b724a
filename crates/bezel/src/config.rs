use std::{fs, path::Path};

use geom::Size;
use serde::{Deserialize, Serialize};

use crate::{
    dispatch::DisabledPolicy,
    error::{Error, Result},
};

/// Engine settings. Every field has a default, so an empty JSON object is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Whether disabled nodes hide their subtree from hit-testing.
    pub disabled_policy: DisabledPolicy,
    /// Skip render work for subtrees outside the visible area.
    pub prune_render: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 240,
            screen_height: 240,
            disabled_policy: DisabledPolicy::default(),
            prune_render: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The screen size.
    pub fn screen(&self) -> Size {
        Size::new(self.screen_width, self.screen_height)
    }

    /// Reject settings the engine can't run with.
    pub fn validate(&self) -> Result<()> {
        if self.screen().is_empty() {
            return Err(Error::Config(format!(
                "screen must be non-empty, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        Ok(())
    }
}
