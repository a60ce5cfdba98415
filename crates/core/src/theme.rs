use std::fmt;
use std::str::FromStr;

use crate::color::{Color, ColorScheme};
use crate::error::InvalidSelector;

/// A named look for the show: whether rainbow treatments are allowed, plus
/// the candidate palettes the director shifts between.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    name: &'static str,
    pub allow_rainbows: bool,
    schemes: Vec<ColorScheme>,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schemes(&self) -> &[ColorScheme] {
        &self.schemes
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

const THEME_NAMES: [&str; 4] = ["neon", "pastel", "ember", "midnight"];

/// The built-in theme table. Palettes are (foreground, background, accent).
pub fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme {
            name: "neon",
            allow_rainbows: true,
            schemes: vec![
                scheme(0xff2d95, 0x10004a, 0x00e5ff),
                scheme(0x39ff14, 0x1a0033, 0xff00ff),
                scheme(0x00e5ff, 0x0a0a2a, 0xffe600),
                scheme(0xff6ec7, 0x001433, 0x7df9ff),
            ],
        },
        Theme {
            name: "pastel",
            allow_rainbows: false,
            schemes: vec![
                scheme(0xffb3c6, 0x2b2d42, 0xa2d2ff),
                scheme(0xcdb4db, 0x22223b, 0xbde0fe),
                scheme(0xffe5b4, 0x3a3042, 0xb5ead7),
            ],
        },
        Theme {
            name: "ember",
            allow_rainbows: false,
            schemes: vec![
                scheme(0xff4500, 0x1f0a00, 0xffc300),
                scheme(0xd00000, 0x250902, 0xffba08),
                scheme(0xff7b00, 0x241203, 0xffdd67),
            ],
        },
        Theme {
            name: "midnight",
            allow_rainbows: false,
            schemes: vec![
                scheme(0x4361ee, 0x03045e, 0x90e0ef),
                scheme(0x7209b7, 0x10002b, 0x4cc9f0),
                scheme(0x2d6a9f, 0x011627, 0x80ffdb),
            ],
        },
    ]
}

pub fn default_theme() -> Theme {
    builtin_themes().remove(0)
}

fn scheme(foreground: u32, background: u32, accent: u32) -> ColorScheme {
    ColorScheme::new(
        Color::hex(foreground),
        Color::hex(background),
        Color::hex(accent),
    )
}

impl FromStr for Theme {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        builtin_themes()
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidSelector::new("theme", s, THEME_NAMES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_theme_has_candidates() {
        for theme in builtin_themes() {
            assert!(!theme.schemes().is_empty(), "{} has no schemes", theme);
        }
    }

    #[test]
    fn test_theme_names_match_table() {
        let themes = builtin_themes();
        assert_eq!(themes.len(), THEME_NAMES.len());
        for (theme, name) in themes.iter().zip(THEME_NAMES) {
            assert_eq!(theme.name(), name);
        }
    }

    #[test]
    fn test_parse_unknown_theme() {
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!("EMBER".parse::<Theme>().unwrap().name(), "ember");
    }
}
