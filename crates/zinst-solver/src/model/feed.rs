use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use zinst_version::ImplementationVersion;

use super::{Architecture, Implementation};

/// Identifier of an interface or feed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedUri(String);

impl FeedUri {
    pub fn new(uri: impl Into<String>) -> Self {
        FeedUri(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeedUri {
    fn from(uri: &str) -> Self {
        FeedUri(uri.to_string())
    }
}

impl From<String> for FeedUri {
    fn from(uri: String) -> Self {
        FeedUri(uri)
    }
}

impl From<&FeedUri> for FeedUri {
    fn from(uri: &FeedUri) -> Self {
        uri.clone()
    }
}

impl fmt::Display for FeedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference from one feed to another providing more implementations
/// of the same interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedReference {
    pub source: FeedUri,
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

impl FeedReference {
    pub fn new(source: impl Into<FeedUri>) -> Self {
        FeedReference {
            source: source.into(),
            architecture: Architecture::default(),
            languages: Vec::new(),
        }
    }

    /// Whether the referenced feed is relevant for the given architecture and languages.
    ///
    /// An empty language list on either side matches any language.
    pub fn applies_to(&self, architecture: &Architecture, languages: &BTreeSet<String>) -> bool {
        self.architecture.is_compatible(architecture) && languages_intersect(&self.languages, languages)
    }
}

pub(crate) fn languages_intersect(declared: &[String], wanted: &BTreeSet<String>) -> bool {
    declared.is_empty() || wanted.is_empty() || declared.iter().any(|l| wanted.contains(l))
}

/// Descriptor document for one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Feed {
    pub uri: FeedUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Oldest solver able to interpret this feed correctly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_solver_version: Option<ImplementationVersion>,
    #[serde(default)]
    pub implementations: Vec<Arc<Implementation>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<FeedReference>,
}

impl Feed {
    pub fn new(uri: impl Into<FeedUri>) -> Self {
        Feed {
            uri: uri.into(),
            name: None,
            min_solver_version: None,
            implementations: Vec::new(),
            feeds: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementations.push(Arc::new(implementation));
        self
    }

    pub fn with_feed(mut self, reference: FeedReference) -> Self {
        self.feeds.push(reference);
        self
    }

    pub fn get_implementation(&self, id: &str) -> Option<&Arc<Implementation>> {
        self.implementations.iter().find(|i| i.id == id)
    }
}
