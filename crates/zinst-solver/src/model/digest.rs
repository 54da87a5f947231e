use serde::{Deserialize, Serialize};
use std::fmt;

/// Content digests identifying an implementation's payload.
///
/// An implementation may be known under several algorithms; two digests
/// refer to the same content when any algorithm they share agrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestDigest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1new: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256new: Option<String>,
}

impl ManifestDigest {
    pub fn sha256new(value: impl Into<String>) -> Self {
        ManifestDigest {
            sha256new: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sha1new.is_none() && self.sha256.is_none() && self.sha256new.is_none()
    }

    /// Whether both digests share at least one algorithm with an equal value
    pub fn partial_eq(&self, other: &ManifestDigest) -> bool {
        fn same(a: &Option<String>, b: &Option<String>) -> bool {
            matches!((a, b), (Some(a), Some(b)) if a == b)
        }
        same(&self.sha1new, &other.sha1new)
            || same(&self.sha256, &other.sha256)
            || same(&self.sha256new, &other.sha256new)
    }

    /// Strongest available digest as `algorithm_value`
    pub fn best(&self) -> Option<String> {
        if let Some(v) = &self.sha256new {
            return Some(format!("sha256new_{}", v));
        }
        if let Some(v) = &self.sha256 {
            return Some(format!("sha256={}", v));
        }
        self.sha1new.as_ref().map(|v| format!("sha1new={}", v))
    }
}

impl fmt::Display for ManifestDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best() {
            Some(best) => f.write_str(&best),
            None => f.write_str("(no digest)"),
        }
    }
}
