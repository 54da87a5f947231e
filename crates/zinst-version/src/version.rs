//! Implementation version numbers

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error type for version and range parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,
    #[error("Invalid version string \"{0}\": must start with a dotted list of numbers")]
    MissingDottedList(String),
    #[error("Invalid version part \"{part}\" in \"{version}\"")]
    InvalidPart { version: String, part: String },
    #[error("Invalid version range \"{range}\": {reason}")]
    InvalidRange { range: String, reason: String },
}

lazy_static! {
    static ref DOTTED_LIST_RE: Regex = Regex::new(r"^\d+(?:\.\d+)*$").unwrap();

    // An additional part: optional modifier followed by an optional dotted list
    static ref VERSION_PART_RE: Regex = Regex::new(r"^(pre|rc|post)?(\d+(?:\.\d+)*)?$").unwrap();
}

/// A dot-separated list of non-negative integers (`1.2.3`).
///
/// Lists compare element-wise; a strict prefix sorts before the longer list.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DottedList(Vec<u64>);

impl DottedList {
    pub fn new(numbers: Vec<u64>) -> Self {
        DottedList(numbers)
    }

    pub fn numbers(&self) -> &[u64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn parse(value: &str) -> Option<Self> {
        if !DOTTED_LIST_RE.is_match(value) {
            return None;
        }
        value
            .split('.')
            .map(|n| n.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()
            .map(DottedList)
    }
}

impl fmt::Display for DottedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

/// Modifier of an additional version part.
///
/// Declaration order is significance order: `pre < rc < (none) < post`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Pre,
    Rc,
    #[default]
    None,
    Post,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Pre => "pre",
            Modifier::Rc => "rc",
            Modifier::None => "",
            Modifier::Post => "post",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "pre" => Modifier::Pre,
            "rc" => Modifier::Rc,
            "post" => Modifier::Post,
            _ => Modifier::None,
        }
    }
}

/// One `-`-separated part following the leading dotted list.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionPart {
    modifier: Modifier,
    list: DottedList,
}

impl VersionPart {
    pub fn new(modifier: Modifier, list: DottedList) -> Self {
        VersionPart { modifier, list }
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    pub fn list(&self) -> &DottedList {
        &self.list
    }

    fn is_default(&self) -> bool {
        self.modifier == Modifier::None && self.list.is_empty()
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.modifier.as_str(), self.list)
    }
}

/// A version number such as `1.0`, `2.4-rc1` or `0.9-pre2-post1`.
#[derive(Debug, Clone)]
pub struct ImplementationVersion {
    first: DottedList,
    additional: Vec<VersionPart>,
}

impl ImplementationVersion {
    /// Parse a version string
    pub fn parse(value: &str) -> Result<Self, VersionError> {
        if value.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = value.split('-');
        let first = parts
            .next()
            .and_then(DottedList::parse)
            .ok_or_else(|| VersionError::MissingDottedList(value.to_string()))?;

        let additional = parts
            .map(|part| {
                let caps = VERSION_PART_RE.captures(part).ok_or_else(|| VersionError::InvalidPart {
                    version: value.to_string(),
                    part: part.to_string(),
                })?;
                let modifier = caps.get(1).map(|m| Modifier::parse(m.as_str())).unwrap_or_default();
                let list = match caps.get(2) {
                    Some(m) => DottedList::parse(m.as_str()).ok_or_else(|| VersionError::InvalidPart {
                        version: value.to_string(),
                        part: part.to_string(),
                    })?,
                    None => DottedList::default(),
                };
                Ok(VersionPart { modifier, list })
            })
            .collect::<Result<Vec<_>, VersionError>>()?;

        Ok(ImplementationVersion { first, additional })
    }

    /// Build a plain dotted version from its numbers
    pub fn from_numbers(numbers: Vec<u64>) -> Self {
        ImplementationVersion {
            first: DottedList(numbers),
            additional: Vec::new(),
        }
    }

    pub fn first_part(&self) -> &DottedList {
        &self.first
    }

    pub fn additional_parts(&self) -> &[VersionPart] {
        &self.additional
    }

    // Trailing default parts ("1.0-") do not change the value
    fn significant_parts(&self) -> &[VersionPart] {
        let len = self
            .additional
            .iter()
            .rposition(|p| !p.is_default())
            .map_or(0, |i| i + 1);
        &self.additional[..len]
    }
}

impl Ord for ImplementationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.first.cmp(&other.first) {
            Ordering::Equal => {}
            ord => return ord,
        }

        let default = VersionPart::default();
        let len = self.additional.len().max(other.additional.len());
        for i in 0..len {
            let left = self.additional.get(i).unwrap_or(&default);
            let right = other.additional.get(i).unwrap_or(&default);
            match left.cmp(right) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ImplementationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ImplementationVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ImplementationVersion {}

impl Hash for ImplementationVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first.hash(state);
        self.significant_parts().hash(state);
    }
}

impl FromStr for ImplementationVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImplementationVersion::parse(s)
    }
}

impl fmt::Display for ImplementationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for part in &self.additional {
            write!(f, "-{}", part)?;
        }
        Ok(())
    }
}

impl Serialize for ImplementationVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImplementationVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ImplementationVersion::parse(&s).map_err(de::Error::custom)
    }
}
