//! Resolution requests

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use zinst_version::VersionRange;

use crate::model::{Architecture, Command, FeedUri};

/// A request to resolve an interface into a runnable selection.
///
/// `command` of `None` means the canonical `run` command; `Some("")` asks for
/// an implementation without requiring any command at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Requirements {
    pub interface: FeedUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub architecture: Architecture,
    /// Preferred languages; empty accepts any language
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub languages: BTreeSet<String>,
    /// Allowed native package distributions; empty allows all
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub distributions: BTreeSet<String>,
    /// Version restrictions per interface, including the requested one
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_restrictions: BTreeMap<FeedUri, VersionRange>,
}

impl Requirements {
    pub fn new(interface: impl Into<FeedUri>) -> Self {
        Requirements {
            interface: interface.into(),
            command: None,
            architecture: Architecture::default(),
            languages: BTreeSet::new(),
            distributions: BTreeSet::new(),
            extra_restrictions: BTreeMap::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.insert(language.into());
        self
    }

    pub fn with_distribution(mut self, distribution: impl Into<String>) -> Self {
        self.distributions.insert(distribution.into());
        self
    }

    /// Restrict the versions of the requested interface
    pub fn with_versions(mut self, versions: VersionRange) -> Self {
        let interface = self.interface.clone();
        self.add_restriction(interface, versions);
        self
    }

    /// The command to resolve, with `None` treated as `run`
    pub fn command_name(&self) -> &str {
        self.command.as_deref().unwrap_or(Command::NAME_RUN)
    }

    /// Add a version restriction, narrowing any existing one for the same interface
    pub fn add_restriction(&mut self, interface: FeedUri, versions: VersionRange) {
        if versions.is_all() {
            return;
        }
        match self.extra_restrictions.get_mut(&interface) {
            Some(existing) => *existing = existing.intersect(&versions),
            None => {
                self.extra_restrictions.insert(interface, versions);
            }
        }
    }

    /// Merge all version restrictions of another request
    pub fn add_restrictions(&mut self, other: &Requirements) {
        for (interface, versions) in &other.extra_restrictions {
            self.add_restriction(interface.clone(), versions.clone());
        }
    }

    pub fn restriction_for(&self, interface: &FeedUri) -> Option<&VersionRange> {
        self.extra_restrictions.get(interface)
    }

    /// The request with its command defaulted to `run`
    pub fn normalized(&self) -> Requirements {
        let mut normalized = self.clone();
        if normalized.command.is_none() {
            normalized.command = Some(Command::NAME_RUN.to_string());
        }
        normalized
    }

    /// Equivalent requests to try in order.
    ///
    /// When no command was named, an implementation without a `run` command
    /// is still acceptable as a last resort.
    pub fn normalized_alternatives(&self) -> Vec<Requirements> {
        let mut alternatives = vec![self.normalized()];
        if self.command.is_none() {
            let mut without_command = self.clone();
            without_command.command = Some(String::new());
            alternatives.push(without_command);
        }
        alternatives
    }
}

impl fmt::Display for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interface)?;
        match self.command.as_deref() {
            Some("") => {}
            Some(command) => write!(f, " ({})", command)?,
            None => write!(f, " ({})", Command::NAME_RUN)?,
        }
        if let Some(versions) = self.restriction_for(&self.interface) {
            write!(f, " [{}]", versions)?;
        }
        Ok(())
    }
}
