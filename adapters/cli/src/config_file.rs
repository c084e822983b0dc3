use std::{fs, path::Path};

use anyhow::{Context, Result};
use sky_arena_core::ArenaConfig;

/// Loads and validates the arena configuration.
///
/// Without a path the built-in defaults are used.
pub(crate) fn load(path: Option<&Path>) -> Result<ArenaConfig> {
    let Some(path) = path else {
        return Ok(ArenaConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Parses a TOML document and checks its numeric invariants.
pub(crate) fn parse(text: &str) -> Result<ArenaConfig> {
    let config: ArenaConfig = toml::from_str(text).context("malformed TOML document")?;
    config.validate()?;
    Ok(config)
}
