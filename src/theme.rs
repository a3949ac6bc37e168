//! Color themes for the chart view.
//!
//! Four retro-inspired schemes selectable via `--theme`. Category bar colors come
//! from the category map and are converted with [`parse_hex_color`].

use ratatui::style::Color;
use std::fmt;

/// Available color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Nord-inspired theme (default) - modern muted colors
    Nord,
    /// Classic DOS Blue - bright white on blue background
    DosBlue,
    /// Amber CRT - orange/amber text on black
    AmberCrt,
    /// Green Phosphor - green text on black
    GreenPhosphor,
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::DosBlue => ColorScheme::dos_blue(),
            Theme::AmberCrt => ColorScheme::amber_crt(),
            Theme::GreenPhosphor => ColorScheme::green_phosphor(),
        }
    }

    /// Monochrome themes ignore category colors and tint bars with the text color.
    pub fn monochrome(&self) -> bool {
        matches!(self, Theme::AmberCrt | Theme::GreenPhosphor)
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "dos" | "dosblue" | "dos-blue" => Ok(Theme::DosBlue),
            "amber" | "ambercrt" | "amber-crt" => Ok(Theme::AmberCrt),
            "green" | "greenphosphor" | "green-phosphor" => Ok(Theme::GreenPhosphor),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{s}'. Available: nord, dos-blue, amber-crt, green-phosphor"
            )),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Nord
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Nord => write!(f, "nord"),
            Theme::DosBlue => write!(f, "dos-blue"),
            Theme::AmberCrt => write!(f, "amber-crt"),
            Theme::GreenPhosphor => write!(f, "green-phosphor"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    /// Axis labels, hints
    pub text_dim: Color,
    /// Active tab and chart border
    pub focus_border: Color,
    pub unfocused_border: Color,
    pub status_ok: Color,
    pub status_error: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            focus_border: Color::Yellow,
            unfocused_border: Color::Gray,
            status_ok: Color::Green,
            status_error: Color::Red,
        }
    }

    pub fn dos_blue() -> Self {
        Self {
            background: Color::Blue,
            text: Color::White,
            text_dim: Color::LightBlue,
            focus_border: Color::Yellow,
            unfocused_border: Color::Cyan,
            status_ok: Color::LightGreen,
            status_error: Color::LightRed,
        }
    }

    pub fn amber_crt() -> Self {
        let amber = Color::Rgb(255, 176, 0);
        let amber_bright = Color::Rgb(255, 200, 100);
        let amber_dim = Color::Rgb(180, 120, 0);

        Self {
            background: Color::Black,
            text: amber,
            text_dim: amber_dim,
            focus_border: amber_bright,
            unfocused_border: amber_dim,
            status_ok: amber_bright,
            status_error: Color::Red,
        }
    }

    pub fn green_phosphor() -> Self {
        let green = Color::Rgb(0, 255, 0);
        let green_dim = Color::Rgb(0, 180, 0);
        let green_bright = Color::Rgb(100, 255, 100);

        Self {
            background: Color::Black,
            text: green,
            text_dim: green_dim,
            focus_border: green_bright,
            unfocused_border: green_dim,
            status_ok: green_bright,
            status_error: Color::Red,
        }
    }

    /// Bar color for a category's `#rrggbb`, falling back to the text color.
    pub fn category_color(&self, theme: Theme, hex: Option<&str>) -> Color {
        if theme.monochrome() {
            return self.text;
        }
        hex.and_then(parse_hex_color).unwrap_or(self.text)
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::nord()
    }
}

/// `#rrggbb` (or `rrggbb`) to an RGB color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let h = hex.trim().trim_start_matches('#');
    if h.len() != 6 || !h.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&h[0..2], 16).ok()?;
    let g = u8::from_str_radix(&h[2..4], 16).ok()?;
    let b = u8::from_str_radix(&h[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parsing() {
        assert_eq!("nord".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("NORD".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("dos".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("dos-blue".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("amber".parse::<Theme>().unwrap(), Theme::AmberCrt);
        assert_eq!("green".parse::<Theme>().unwrap(), Theme::GreenPhosphor);
        assert!("invalid".parse::<Theme>().is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#6F67D8"), Some(Color::Rgb(0x6f, 0x67, 0xd8)));
        assert_eq!(parse_hex_color("ffffff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn test_category_color_fallbacks() {
        let nord = Theme::Nord.colors();
        assert_eq!(nord.category_color(Theme::Nord, Some("#000000")), Color::Rgb(0, 0, 0));
        assert_eq!(nord.category_color(Theme::Nord, None), nord.text);
        let amber = Theme::AmberCrt.colors();
        assert_eq!(amber.category_color(Theme::AmberCrt, Some("#000000")), amber.text);
    }
}
