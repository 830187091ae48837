//! Aspect ratios accepted by the generation endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of aspect ratios the generation provider accepts.
///
/// Requests carrying an absent or unrecognized ratio fall back to
/// [`AspectRatio::Square`] rather than failing; the ratio is presentation
/// input, not a correctness input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1.
    #[default]
    #[serde(rename = "1:1")]
    Square,

    /// 16:9.
    #[serde(rename = "16:9")]
    Landscape,

    /// 9:16.
    #[serde(rename = "9:16")]
    Portrait,

    /// 4:3.
    #[serde(rename = "4:3")]
    Classic,

    /// 3:4.
    #[serde(rename = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    /// Parse a ratio string, falling back to the canonical square ratio for
    /// absent or unrecognized values.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("1:1") => Self::Square,
            Some("16:9") => Self::Landscape,
            Some("9:16") => Self::Portrait,
            Some("4:3") => Self::Classic,
            Some("3:4") => Self::ClassicPortrait,
            _ => Self::default(),
        }
    }

    /// The wire representation sent to the generation provider.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Classic => "4:3",
            Self::ClassicPortrait => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
