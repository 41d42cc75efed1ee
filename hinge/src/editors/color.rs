//! Strict `#RRGGBB` color entry.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use palette::Srgb;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static HEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorRejection {
    #[error("expected #RRGGBB, got {0:?}")]
    NotHex(String),
}

/// An sRGB color that was entered as exactly `#` plus six hex digits.
///
/// Shorthand (`#abc`), alpha (`#aabbccdd`) and missing `#` are rejected.
/// Displays as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    pub fn parse(text: &str) -> Result<Self, ColorRejection> {
        if !HEX_PATTERN.is_match(text) {
            return Err(ColorRejection::NotHex(text.to_string()));
        }
        Srgb::<u8>::from_str(text)
            .map(Self)
            .map_err(|_| ColorRejection::NotHex(text.to_string()))
    }

    pub fn is_valid(text: &str) -> bool {
        HEX_PATTERN.is_match(text)
    }

    pub fn red(&self) -> u8 {
        self.0.red
    }

    pub fn green(&self) -> u8 {
        self.0.green
    }

    pub fn blue(&self) -> u8 {
        self.0.blue
    }

    pub fn srgb(&self) -> Srgb<u8> {
        self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

impl FromStr for HexColor {
    type Err = ColorRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorRejection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Text being typed into a color field plus the last color it committed.
///
/// Partial input is kept as-is and never committed. The committed color
/// only moves when the text is a complete, valid hex color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDraft {
    text: String,
    committed: HexColor,
}

impl ColorDraft {
    pub fn new(committed: HexColor) -> Self {
        Self {
            text: committed.to_string(),
            committed,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn committed(&self) -> HexColor {
        self.committed
    }

    pub fn is_valid(&self) -> bool {
        HexColor::is_valid(&self.text)
    }

    /// Replace the draft text. Returns the newly committed color when the
    /// text parses to a color different from the current one.
    pub fn set_text(&mut self, text: impl Into<String>) -> Option<HexColor> {
        self.text = text.into();
        match HexColor::parse(&self.text) {
            Ok(color) if color != self.committed => {
                self.committed = color;
                Some(color)
            }
            _ => None,
        }
    }

    /// Adopt an externally supplied color and overwrite the draft.
    pub fn sync(&mut self, color: HexColor) {
        self.committed = color;
        self.text = color.to_string();
    }

    /// Throw away an invalid draft (on blur).
    pub fn revert(&mut self) {
        self.text = self.committed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_case_and_prints_lowercase() {
        let color = HexColor::parse("#FFaa00").unwrap();
        assert_eq!((color.red(), color.green(), color.blue()), (255, 170, 0));
        assert_eq!(color.to_string(), "#ffaa00");
    }

    #[test]
    fn rejects_shorthand_alpha_and_bare_digits() {
        for text in ["#abc", "#aabbccdd", "aabbcc", "#gggggg", " #aabbcc", ""] {
            assert!(HexColor::parse(text).is_err(), "{text:?} should be rejected");
        }
    }
}
