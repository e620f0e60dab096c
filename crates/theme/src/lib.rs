pub mod colors;
pub mod style;

pub use colors::Color;
pub use style::stylesheet;

use frame_config::ThemeConfig;

/// Compiled theme derived from [`ThemeConfig`].
///
/// Calling [`Theme::from_config`] is infallible — invalid color strings fall
/// back to safe defaults.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background:      Color,
    pub foreground:      Color,
    pub accent:          Color,
    pub accent_hover:    Color,
    pub busy_background: Color,
    pub error:           Color,
    pub outline:         Color,
    pub font:            String,
    /// Load control font size in rem.
    pub control_size:    f32,
    /// Corner radius in rem.
    pub border_radius:   f32,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        Self {
            background:      Color::from_hex(&cfg.background).unwrap_or(Color::BLACK),
            foreground:      Color::from_hex(&cfg.foreground).unwrap_or(Color::WHITE),
            accent:          Color::from_hex(&cfg.accent).unwrap_or(Color::GREEN),
            accent_hover:    Color::from_hex(&cfg.accent_hover).unwrap_or(Color::GREEN),
            busy_background: Color::from_hex(&cfg.busy_background).unwrap_or(Color::BLACK),
            error:           Color::from_hex(&cfg.error).unwrap_or(Color::RED),
            outline:         Color::from_hex(&cfg.outline).unwrap_or(Color::WHITE),
            font:            cfg.font.clone(),
            control_size:    cfg.control_size.max(0.5),
            border_radius:   cfg.border_radius.max(0.0),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}
