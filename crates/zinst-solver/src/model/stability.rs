use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stability rating of an implementation.
///
/// Variants are declared from most to least preferred, so the derived
/// ordering puts better ratings first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// No explicit rating (user preferences only)
    #[default]
    Unset,
    Preferred,
    Packaged,
    Stable,
    Testing,
    Developer,
    Buggy,
    Insecure,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Unset => "unset",
            Stability::Preferred => "preferred",
            Stability::Packaged => "packaged",
            Stability::Stable => "stable",
            Stability::Testing => "testing",
            Stability::Developer => "developer",
            Stability::Buggy => "buggy",
            Stability::Insecure => "insecure",
        }
    }

    /// Ratings below this one are never selected
    pub fn is_usable(&self) -> bool {
        !matches!(self, Stability::Buggy | Stability::Insecure)
    }
}

impl FromStr for Stability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unset" | "" => Ok(Stability::Unset),
            "preferred" => Ok(Stability::Preferred),
            "packaged" => Ok(Stability::Packaged),
            "stable" => Ok(Stability::Stable),
            "testing" => Ok(Stability::Testing),
            "developer" => Ok(Stability::Developer),
            "buggy" => Ok(Stability::Buggy),
            "insecure" => Ok(Stability::Insecure),
            other => Err(format!("Unknown stability: {}", other)),
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
