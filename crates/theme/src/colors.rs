use std::fmt;

/// 8-bit RGBA colour as used in stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK:       Self = Self { r: 0x00, g: 0x00, b: 0x00, a: 0xff };
    pub const WHITE:       Self = Self { r: 0xff, g: 0xff, b: 0xff, a: 0xff };
    pub const GREEN:       Self = Self { r: 0x00, g: 0x80, b: 0x00, a: 0xff };
    pub const RED:         Self = Self { r: 0xf3, g: 0x8b, b: 0xa8, a: 0xff };
    pub const TRANSPARENT: Self = Self { r: 0x00, g: 0x00, b: 0x00, a: 0x00 };

    /// Parse a CSS-style hex color string (`#RGB`, `#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        let byte = |s: &str| -> Option<u8> { u8::from_str_radix(s, 16).ok() };
        let nibble = |s: &str| -> Option<u8> { byte(s).map(|n| n * 0x11) };

        match hex.len() {
            3 => Some(Self {
                r: nibble(hex.get(0..1)?)?,
                g: nibble(hex.get(1..2)?)?,
                b: nibble(hex.get(2..3)?)?,
                a: 0xff,
            }),
            6 | 8 => Some(Self {
                r: byte(hex.get(0..2)?)?,
                g: byte(hex.get(2..4)?)?,
                b: byte(hex.get(4..6)?)?,
                a: if hex.len() == 8 { byte(hex.get(6..8)?)? } else { 0xff },
            }),
            _ => None,
        }
    }

    /// Return a copy with the alpha channel set to `alpha` (`0.0`–`1.0`).
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        self
    }
}

/// Renders as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}
