//! Media quality tiers available for download.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quality tier of a downloadable media file.
///
/// Ordered from lowest to highest so tiers can be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// Standard definition.
    #[serde(rename = "SD")]
    Sd,
    /// High definition.
    #[serde(rename = "HD")]
    Hd,
    /// Ultra high definition.
    #[serde(rename = "4K")]
    Uhd,
}

impl Quality {
    /// Returns the catalog string representation (also used for storage).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sd => "SD",
            Self::Hd => "HD",
            Self::Uhd => "4K",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SD" => Ok(Self::Sd),
            "HD" => Ok(Self::Hd),
            "4K" => Ok(Self::Uhd),
            _ => Err(format!("invalid quality: {s}")),
        }
    }
}
