//! Website themes offered to the user.
//!
//! A theme is only a label forwarded into prompt text; nothing checks that the
//! generated site actually follows it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Modern,
    Minimal,
    Dark,
    Creative,
}

impl Theme {
    /// All themes, in the order they are offered.
    pub const ALL: [Theme; 4] = [Theme::Modern, Theme::Minimal, Theme::Dark, Theme::Creative];

    /// The label embedded in prompts, e.g. `"Minimal"`.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Modern => "Modern",
            Theme::Minimal => "Minimal",
            Theme::Dark => "Dark",
            Theme::Creative => "Creative",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("Unknown theme '{0}'. Expected one of: Modern, Minimal, Dark, Creative")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    /// Case-insensitive label match; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Theme::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_default_is_modern() {
        assert_eq!(Theme::default(), Theme::Modern);
        assert_eq!(Theme::ALL[0], Theme::default());
    }

    #[test]
    fn test_theme_parses_labels_case_insensitively() {
        assert_eq!("Minimal".parse::<Theme>().unwrap(), Theme::Minimal);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("  CREATIVE ".parse::<Theme>().unwrap(), Theme::Creative);
    }

    #[test]
    fn test_theme_rejects_unknown_label() {
        let err = "Neon".parse::<Theme>().unwrap_err();
        assert!(err.to_string().contains("Neon"));
        assert!("".parse::<Theme>().is_err());
    }

    #[test]
    fn test_theme_display_round_trips_through_parse() {
        for theme in Theme::ALL {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn test_theme_serde_uses_label() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), r#""Dark""#);
        let theme: Theme = serde_json::from_str(r#""Creative""#).unwrap();
        assert_eq!(theme, Theme::Creative);
    }
}
