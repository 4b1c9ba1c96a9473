//! JSON configuration for the `sable` binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sable_core::{ParserRules, RenderOptions};
use serde::Deserialize;

/// Render options and parser rule tables, loaded from a JSON file.
///
/// Every field is optional. A rule table that is present replaces the
/// default table of the same name; absent tables keep their defaults.
///
/// ```json
/// {
///   "render": { "self_closing_style": "xhtml", "include_comments": false },
///   "rules": { "auto_closes": { "li": ["li", "ul", "ol"] } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderOptions,
    pub rules: ParserRules,
}

impl Config {
    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
