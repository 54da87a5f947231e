//! VersionRange - disjunction of range parts
//!
//! Syntax: alternatives are separated by `|`, a single alternative may
//! combine several parts with `,` (all of them must match).
//!
//! | form          | meaning                               |
//! |---------------|---------------------------------------|
//! | `1.2`         | exactly 1.2                           |
//! | `!1.2`        | anything but 1.2                      |
//! | `1.0..!2.0`   | at least 1.0, below 2.0               |
//! | `1.0..`       | at least 1.0                          |
//! | `..!2.0`      | below 2.0                             |
//! | `>=1.0`, `<2` | operator comparison                   |

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::Operator;
use crate::version::{ImplementationVersion, VersionError};

lazy_static! {
    static ref OPERATOR_RE: Regex = Regex::new(r"^(==|!=|<=|>=|<|>|=)\s*(\S+)$").unwrap();
}

/// A single restriction on acceptable versions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangePart {
    /// Exactly this version
    Exact(ImplementationVersion),
    /// Any version except this one
    Exclude(ImplementationVersion),
    /// `start <= v < end`, either side may be open
    Interval {
        start: Option<ImplementationVersion>,
        end: Option<ImplementationVersion>,
    },
    /// Operator comparison against a reference version
    Compare(Operator, ImplementationVersion),
    /// All of the contained parts must match
    All(Vec<RangePart>),
}

impl RangePart {
    /// Check whether a version satisfies this part
    pub fn matches(&self, version: &ImplementationVersion) -> bool {
        match self {
            RangePart::Exact(v) => version == v,
            RangePart::Exclude(v) => version != v,
            RangePart::Interval { start, end } => {
                start.as_ref().map_or(true, |s| version >= s) && end.as_ref().map_or(true, |e| version < e)
            }
            RangePart::Compare(op, v) => op.accepts(version.cmp(v)),
            RangePart::All(parts) => parts.iter().all(|p| p.matches(version)),
        }
    }

    fn parse(range: &str, item: &str) -> Result<Self, VersionError> {
        let invalid = |reason: &str| VersionError::InvalidRange {
            range: range.to_string(),
            reason: reason.to_string(),
        };

        if let Some((start, end)) = item.split_once("..") {
            let start = start.trim();
            let end = end.trim();
            let start = if start.is_empty() {
                None
            } else {
                Some(ImplementationVersion::parse(start)?)
            };
            let end = if end.is_empty() {
                None
            } else {
                let end = end
                    .strip_prefix('!')
                    .ok_or_else(|| invalid("interval end must be written as \"!version\""))?;
                Some(ImplementationVersion::parse(end)?)
            };
            return Ok(RangePart::Interval { start, end });
        }

        if let Some(caps) = OPERATOR_RE.captures(item) {
            let op = caps[1].parse::<Operator>().map_err(|e| invalid(&e.to_string()))?;
            return Ok(RangePart::Compare(op, ImplementationVersion::parse(&caps[2])?));
        }

        if let Some(excluded) = item.strip_prefix('!') {
            return Ok(RangePart::Exclude(ImplementationVersion::parse(excluded.trim())?));
        }

        Ok(RangePart::Exact(ImplementationVersion::parse(item)?))
    }

    fn flatten(self) -> Vec<RangePart> {
        match self {
            RangePart::All(parts) => parts,
            part => vec![part],
        }
    }
}

impl fmt::Display for RangePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangePart::Exact(v) => write!(f, "{}", v),
            RangePart::Exclude(v) => write!(f, "!{}", v),
            RangePart::Interval { start, end } => {
                if let Some(start) = start {
                    write!(f, "{}", start)?;
                }
                f.write_str("..")?;
                if let Some(end) = end {
                    write!(f, "!{}", end)?;
                }
                Ok(())
            }
            RangePart::Compare(op, v) => write!(f, "{}{}", op, v),
            RangePart::All(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}

/// A set of acceptable versions, expressed as alternatives.
///
/// A range without alternatives accepts every version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionRange {
    parts: Vec<RangePart>,
}

impl VersionRange {
    /// A range accepting every version
    pub fn all() -> Self {
        VersionRange::default()
    }

    /// Parse a range expression
    pub fn parse(value: &str) -> Result<Self, VersionError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(VersionRange::all());
        }

        let parts = value
            .split('|')
            .map(|alternative| {
                let items = alternative
                    .split(',')
                    .map(str::trim)
                    .map(|item| {
                        if item.is_empty() {
                            Err(VersionError::InvalidRange {
                                range: value.to_string(),
                                reason: "empty range part".to_string(),
                            })
                        } else {
                            RangePart::parse(value, item)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if items.len() == 1 {
                    items.into_iter().next().unwrap_or(RangePart::All(Vec::new()))
                } else {
                    RangePart::All(items)
                })
            })
            .collect::<Result<Vec<_>, VersionError>>()?;

        Ok(VersionRange { parts })
    }

    pub fn parts(&self) -> &[RangePart] {
        &self.parts
    }

    /// Whether this range accepts every version
    pub fn is_all(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check whether a version satisfies at least one alternative
    pub fn matches(&self, version: &ImplementationVersion) -> bool {
        self.is_all() || self.parts.iter().any(|p| p.matches(version))
    }

    /// Range accepting only versions accepted by both `self` and `other`
    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        if self.is_all() || self == other {
            return other.clone();
        }
        if other.is_all() {
            return self.clone();
        }

        let mut parts = Vec::with_capacity(self.parts.len() * other.parts.len());
        for a in &self.parts {
            for b in &other.parts {
                if a == b {
                    parts.push(a.clone());
                    continue;
                }
                let mut combined = a.clone().flatten();
                for item in b.clone().flatten() {
                    if !combined.contains(&item) {
                        combined.push(item);
                    }
                }
                parts.push(RangePart::All(combined));
            }
        }
        VersionRange { parts }
    }
}

impl From<RangePart> for VersionRange {
    fn from(part: RangePart) -> Self {
        VersionRange { parts: vec![part] }
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        VersionRange::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ImplementationVersion {
        ImplementationVersion::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_empty_range_matches_everything() {
        assert!(r("").matches(&v("0.1")));
        assert!(r("  ").is_all());
        assert!(VersionRange::all().matches(&v("99")));
    }

    #[test]
    fn test_exact_and_exclude() {
        assert!(r("1.2").matches(&v("1.2")));
        assert!(!r("1.2").matches(&v("1.2.1")));
        assert!(r("!1.2").matches(&v("1.3")));
        assert!(!r("!1.2").matches(&v("1.2")));
    }

    #[test]
    fn test_intervals() {
        let range = r("1.0..!2.0");
        assert!(range.matches(&v("1.0")));
        assert!(range.matches(&v("1.9.9")));
        assert!(!range.matches(&v("2.0")));
        assert!(!range.matches(&v("0.9")));
        assert!(range.matches(&v("2.0-pre1")));

        assert!(r("1.0..").matches(&v("100")));
        assert!(!r("..!2.0").matches(&v("2.0")));
        assert!(r("..!2.0").matches(&v("0.1")));
    }

    #[test]
    fn test_operator_parts() {
        assert!(r("<2.0").matches(&v("1.5")));
        assert!(!r("<2.0").matches(&v("2.5")));
        assert!(r(">= 1.0").matches(&v("1.0")));
        assert!(r("=1.0").matches(&v("1.0")));
        assert!(r("!=1.0").matches(&v("1.1")));
        assert!(!r("!=1.0").matches(&v("1.0")));
    }

    #[test]
    fn test_alternatives_and_conjunctions() {
        let range = r("1.0..!2.0 | 3.0");
        assert!(range.matches(&v("1.5")));
        assert!(range.matches(&v("3.0")));
        assert!(!range.matches(&v("2.5")));

        let range = r(">=1.0,!=1.3,<2.0");
        assert!(range.matches(&v("1.2")));
        assert!(!range.matches(&v("1.3")));
        assert!(!range.matches(&v("2.0")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(VersionRange::parse("1.0..2.0").is_err());
        assert!(VersionRange::parse("foo").is_err());
        assert!(VersionRange::parse("1.0,,2.0").is_err());
        assert!(VersionRange::parse("1.0 |").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["1.2", "!1.2", "1.0..!2.0", "1.0..", "..!2.0", ">=1.0,<2.0", "1.0 | 2.0..!3.0"] {
            let range = r(s);
            assert_eq!(range.to_string(), s);
            assert_eq!(r(&range.to_string()), range);
        }
    }

    #[test]
    fn test_intersect() {
        let a = r("1.0..!3.0");
        let b = r("2.0..");
        let both = a.intersect(&b);
        assert!(both.matches(&v("2.5")));
        assert!(!both.matches(&v("1.5")));
        assert!(!both.matches(&v("3.0")));

        assert_eq!(VersionRange::all().intersect(&a), a);
        assert_eq!(a.intersect(&VersionRange::all()), a);
        assert_eq!(a.intersect(&a), a);
    }

    #[test]
    fn test_intersect_disjoint_matches_nothing() {
        let both = r("<2.0").intersect(&r(">=3.0"));
        for version in ["1.0", "2.0", "2.5", "3.0", "4.0"] {
            assert!(!both.matches(&v(version)), "{} should not match", version);
        }
    }

    #[test]
    fn test_intersect_distributes_over_alternatives() {
        let both = r("1.0 | 2.0").intersect(&r("!1.0"));
        assert!(!both.matches(&v("1.0")));
        assert!(both.matches(&v("2.0")));
    }
}
