pub mod schema;
#[cfg(feature = "watch")]
pub mod watcher;

pub use schema::{
    Compression, FormConfig, LoaderConfig, NavConfig, NavLink, PageConfig, ThemeConfig,
    TrackingConfig, WidgetConfig, WidgetKind, MAX_ANCESTOR_DEPTH,
};
#[cfg(feature = "watch")]
pub use watcher::ConfigWatcher;

use frame_core::{FrameError, Result};
use std::path::{Path, PathBuf};

/// Load and validate a page configuration from a TOML file.  Returns
/// `PageConfig::default()` if the file doesn't exist so a page always renders.
pub fn load(path: impl AsRef<Path>) -> Result<PageConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(PageConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| FrameError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate configuration text.
pub fn parse(raw: &str) -> Result<PageConfig> {
    let config: PageConfig =
        toml::from_str(raw).map_err(|e| FrameError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("frame").join("frame.toml")
}
