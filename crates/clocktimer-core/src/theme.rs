//! Color themes. Cosmetic only; the engine never looks at them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Favicon color shown before the first fade to the theme color.
pub const NEUTRAL_COLOR: &str = "#ffffff";
/// Dark counterpart of the neutral color, used for floating-window chrome.
pub const NEUTRAL_DARK_COLOR: &str = "#d4cfc0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Green,
    Yellow,
    Blue,
    Purple,
    Red,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Green,
        Theme::Yellow,
        Theme::Blue,
        Theme::Purple,
        Theme::Red,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Green => "green",
            Theme::Yellow => "yellow",
            Theme::Blue => "blue",
            Theme::Purple => "purple",
            Theme::Red => "red",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Theme::Green => "Green",
            Theme::Yellow => "Yellow",
            Theme::Blue => "Blue",
            Theme::Purple => "Purple",
            Theme::Red => "Red",
        }
    }

    pub fn primary(self) -> &'static str {
        match self {
            Theme::Green => "#22c55e",
            Theme::Yellow => "#ffd700",
            Theme::Blue => "#3b82f6",
            Theme::Purple => "#a855f7",
            Theme::Red => "#ef4444",
        }
    }

    pub fn dark(self) -> &'static str {
        match self {
            Theme::Green => "#16a34a",
            Theme::Yellow => "#ccaa00",
            Theme::Blue => "#2563eb",
            Theme::Purple => "#9333ea",
            Theme::Red => "#dc2626",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!(
                    "unknown theme '{s}' (expected one of: green, yellow, blue, purple, red)"
                ),
            })
    }
}

/// Parse a `#rrggbb` color into its components.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
