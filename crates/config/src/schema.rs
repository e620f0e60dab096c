use frame_core::{FrameError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Depth cap for the click tracker's ancestor walk.
///
/// Bounds the walk from a clicked node towards the root; markers further up
/// than this are not considered.
pub const MAX_ANCESTOR_DEPTH: usize = 5;

/// Root configuration structure parsed from `frame.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page title used by the markup host.
    pub title: String,
    /// Theme / visual settings.
    pub theme: ThemeConfig,
    /// Payload retrieval settings shared by all widgets.
    pub loader: LoaderConfig,
    /// Click-tracking beacon settings.
    pub tracking: TrackingConfig,
    /// Navigation links to highlight.
    pub nav: NavConfig,
    /// Forms submitted as JSON.
    pub forms: Vec<FormConfig>,
    /// Loader widgets on the page, in document order.
    pub widgets: Vec<WidgetConfig>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title:    "frame".to_string(),
            theme:    ThemeConfig::default(),
            loader:   LoaderConfig::default(),
            tracking: TrackingConfig::default(),
            nav:      NavConfig::default(),
            forms:    Vec::new(),
            widgets:  Vec::new(),
        }
    }
}

impl PageConfig {
    /// Reject configurations no host could render.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for widget in &self.widgets {
            if !seen.insert(widget.id.as_str()) {
                return Err(FrameError::Config(format!(
                    "duplicate widget id '{}'",
                    widget.id
                )));
            }
            widget.validate()?;
        }
        if self.tracking.max_depth == 0 {
            return Err(FrameError::Config("tracking.max_depth must be at least 1".into()));
        }
        Ok(())
    }

    pub fn widget(&self, id: &str) -> Option<&WidgetConfig> {
        self.widgets.iter().find(|w| w.id == id)
    }
}

/// Which widget variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    /// Fetch, decompress and bootstrap a module onto a canvas.
    #[default]
    WasmLoader,
    /// Point an embedded frame at a page that boots itself.
    WasmFrame,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WasmLoader => "wasm-loader",
            Self::WasmFrame  => "wasm-frame",
        }
    }
}

/// Payload encoding.  `Auto` sniffs the first bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Auto,
    Zlib,
    Gzip,
    Lz4,
    None,
}

impl std::str::FromStr for Compression {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "zlib" | "deflate" => Ok(Self::Zlib),
            "gzip" | "gz" => Ok(Self::Gzip),
            "lz4" => Ok(Self::Lz4),
            "none" | "identity" => Ok(Self::None),
            other => Err(FrameError::Config(format!("unknown codec '{other}'"))),
        }
    }
}

/// Config block for a single widget instance.
///
/// Field names follow the element attributes (`src`, `canvas-id`) so a
/// widget can be configured identically from markup or from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Instance id, also the widget root element id.
    pub id: String,
    #[serde(default)]
    pub kind: WidgetKind,
    /// Payload (or embedded page) locator.
    #[serde(rename = "src", alias = "source")]
    pub source: String,
    /// Cover image locator.
    #[serde(default)]
    pub cover: String,
    /// Execution surface element id.
    #[serde(rename = "canvas-id", alias = "surface", default = "default_surface")]
    pub surface: String,
    /// Declared height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Declared width; `None` = measured from layout at activation.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub codec: Compression,
    /// Show a fullscreen control once running.
    #[serde(default)]
    pub fullscreen: bool,
    /// Offer the load control again after a failure.
    #[serde(default = "default_true")]
    pub retry: bool,
    /// Load control text override.
    #[serde(default)]
    pub label: Option<String>,
    /// JS glue of the hosted build, imported only on activation.
    #[serde(rename = "script-path", alias = "script", default)]
    pub script: Option<String>,
    /// Give up on an embedded frame that has not loaded after this many
    /// seconds; `0` waits forever.
    #[serde(rename = "timeout", default = "default_frame_timeout")]
    pub frame_timeout_secs: u32,
}

fn default_surface() -> String {
    "frame-canvas".to_string()
}

fn default_height() -> u32 {
    480
}

fn default_frame_timeout() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

impl WidgetConfig {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id:         id.into(),
            kind:       WidgetKind::default(),
            source:     source.into(),
            cover:      String::new(),
            surface:    default_surface(),
            height:     default_height(),
            width:      None,
            codec:      Compression::default(),
            fullscreen: false,
            retry:      true,
            label:      None,
            script:     None,
            frame_timeout_secs: default_frame_timeout(),
        }
    }

    /// Text of the load control.
    pub fn load_label(&self) -> &str {
        self.label.as_deref().unwrap_or("Load & Play")
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FrameError::Config("widget id must not be empty".into()));
        }
        if self.source.trim().is_empty() {
            return Err(FrameError::Config(format!("widget '{}': src is empty", self.id)));
        }
        if self.surface.trim().is_empty() {
            return Err(FrameError::Config(format!("widget '{}': canvas-id is empty", self.id)));
        }
        if self.height == 0 {
            return Err(FrameError::Config(format!("widget '{}': height must be > 0", self.id)));
        }
        Ok(())
    }

    /// Apply a single element attribute by name.
    ///
    /// Returns `Ok(false)` for attributes this widget does not observe.
    pub fn apply_attribute(&mut self, key: &str, value: &str) -> Result<bool> {
        let bad_number =
            |e: std::num::ParseIntError| FrameError::Config(format!("attribute '{key}': {e}"));

        match key {
            "src" | "source" | "wasm-path" => self.source = value.to_string(),
            "cover" => self.cover = value.to_string(),
            "canvas-id" | "surface" => self.surface = value.to_string(),
            "height" => self.height = value.trim().parse().map_err(bad_number)?,
            "width" => {
                self.width = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().parse().map_err(bad_number)?)
                }
            }
            "codec" => self.codec = value.parse()?,
            "fullscreen" => self.fullscreen = parse_flag(value),
            "retry" => self.retry = parse_flag(value),
            "label" => self.label = Some(value.to_string()).filter(|l| !l.is_empty()),
            "script-path" | "script" => {
                self.script = Some(value.trim().to_string()).filter(|p| !p.is_empty())
            }
            "timeout" => self.frame_timeout_secs = value.trim().parse().map_err(bad_number)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Boolean attribute semantics: present and not explicitly false.
fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
}

/// Payload retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Abort the retrieval after this many seconds (`None` = wait forever).
    pub timeout_secs: Option<u64>,
    /// Base URL prepended to relative `src` values for HTTP retrieval.
    pub base_url: Option<String>,
}

/// Theme / styling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Page background color (hex, e.g. `"#1e1e2e"`).
    pub background: String,
    /// Primary text color.
    pub foreground: String,
    /// Load control background.
    pub accent: String,
    /// Load control background on hover.
    pub accent_hover: String,
    /// Busy indicator backdrop.
    pub busy_background: String,
    /// Error message color.
    pub error: String,
    /// Widget outline color.
    pub outline: String,
    /// Font family name.
    pub font: String,
    /// Load control font size in rem.
    pub control_size: f32,
    /// Corner radius in rem.
    pub border_radius: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background:      "#1e1e2e".to_string(),
            foreground:      "#ffffff".to_string(),
            accent:          "#008000".to_string(),
            accent_hover:    "#adff2f".to_string(),
            busy_background: "#000000".to_string(),
            error:           "#f38ba8".to_string(),
            outline:         "#ffffff".to_string(),
            font:            "sans-serif".to_string(),
            control_size:    2.0,
            border_radius:   0.25,
        }
    }
}

/// Click-tracking beacon settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackingConfig {
    pub enabled: bool,
    /// Beacon endpoint receiving `{"action": …}` JSON.
    pub endpoint: String,
    /// Marker attribute looked up on the clicked node and its ancestors.
    pub attribute: String,
    /// Ancestor walk bound.
    pub max_depth: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled:   false,
            endpoint:  "/interact".to_string(),
            attribute: "track".to_string(),
            max_depth: MAX_ANCESTOR_DEPTH,
        }
    }
}

/// Navigation bar links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavConfig {
    /// Class added to the active link.
    pub active_class: String,
    pub links: Vec<NavLink>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            active_class: "active".to_string(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// A form submitted as JSON instead of a page navigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormConfig {
    pub id: String,
    /// Endpoint the JSON body is POSTed to.
    pub action: String,
    /// Field names, in document order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Submit control stays hidden this long after a successful submit.
    #[serde(default = "default_success_cooldown")]
    pub success_cooldown_ms: u64,
    /// Submit control stays disabled this long after a failed submit.
    #[serde(default = "default_failure_cooldown")]
    pub failure_cooldown_ms: u64,
}

fn default_success_cooldown() -> u64 {
    5_000
}

fn default_failure_cooldown() -> u64 {
    1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_widget_with_attribute_names() {
        let raw = r#"
            title = "Games"

            [[widgets]]
            id = "asteroids"
            src = "/games/asteroids.wasm.gz"
            cover = "/games/asteroids.png"
            canvas-id = "asteroids-canvas"
            height = 600
            codec = "gzip"
        "#;
        let cfg: PageConfig = toml::from_str(raw).unwrap();
        let w = &cfg.widgets[0];
        assert_eq!(w.kind, WidgetKind::WasmLoader);
        assert_eq!(w.surface, "asteroids-canvas");
        assert_eq!(w.codec, Compression::Gzip);
        assert_eq!(w.width, None);
        assert!(w.retry);
        assert_eq!(cfg.tracking.max_depth, MAX_ANCESTOR_DEPTH);
        assert_eq!(cfg.tracking.attribute, "track");
        cfg.validate().unwrap();
    }

    #[test]
    fn duplicate_widget_ids_are_rejected() {
        let mut cfg = PageConfig::default();
        cfg.widgets.push(WidgetConfig::new("a", "/a.bin"));
        cfg.widgets.push(WidgetConfig::new("a", "/b.bin"));
        assert!(matches!(cfg.validate(), Err(FrameError::Config(_))));
    }

    #[test]
    fn apply_attribute_parses_and_ignores_unknown() {
        let mut w = WidgetConfig::new("a", "/a.bin");
        assert!(w.apply_attribute("height", "320").unwrap());
        assert!(w.apply_attribute("fullscreen", "").unwrap());
        assert!(w.apply_attribute("codec", "lz4").unwrap());
        assert!(!w.apply_attribute("some-attribute", "x").unwrap());
        assert_eq!(w.height, 320);
        assert!(w.fullscreen);
        assert_eq!(w.codec, Compression::Lz4);
        assert!(w.apply_attribute("height", "tall").is_err());
    }

    #[test]
    fn script_path_and_timeout_are_observed() {
        let mut w = WidgetConfig::new("a", "/a.bin");
        assert_eq!(w.script, None);
        assert_eq!(w.frame_timeout_secs, 30);

        assert!(w.apply_attribute("script-path", "/games/a/a.js").unwrap());
        assert!(w.apply_attribute("timeout", "5").unwrap());
        assert_eq!(w.script.as_deref(), Some("/games/a/a.js"));
        assert_eq!(w.frame_timeout_secs, 5);

        assert!(w.apply_attribute("script-path", " ").unwrap());
        assert_eq!(w.script, None);
        assert!(w.apply_attribute("timeout", "soon").is_err());

        let parsed: WidgetConfig = toml::from_str(
            r#"
                id = "b"
                src = "/b.bin"
                script-path = "/b.js"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.script.as_deref(), Some("/b.js"));
    }
}
