//! Solver output: one chosen implementation per interface

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use zinst_version::ImplementationVersion;

use crate::model::{
    Architecture, Binding, Command, Dependency, FeedUri, Implementation, ManifestDigest, Restriction,
    Stability,
};
use crate::repository::ImplementationStore;
use crate::requirements::Requirements;

use super::candidate::SelectionCandidate;

/// An implementation chosen for an interface, together with the commands
/// that must be runnable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImplementationSelection {
    pub interface: FeedUri,
    /// Feed the implementation came from, when it differs from the interface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_feed: Option<FeedUri>,
    pub id: String,
    pub version: ImplementationVersion,
    #[serde(default)]
    pub digest: ManifestDigest,
    pub stability: Stability,
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl ImplementationSelection {
    /// Select a candidate, adding the requested command if it names one
    pub fn from_candidate(candidate: &SelectionCandidate, requirements: &Requirements) -> Self {
        let implementation = &candidate.implementation;
        let from_feed = if candidate.feed_uri == requirements.interface {
            None
        } else {
            Some(candidate.feed_uri.clone())
        };

        let mut selection = ImplementationSelection {
            interface: requirements.interface.clone(),
            from_feed,
            id: implementation.id.clone(),
            version: implementation.version.clone(),
            digest: implementation.digest.clone(),
            stability: candidate.effective_stability(),
            architecture: implementation.architecture,
            distribution: implementation.distribution.clone(),
            local_path: implementation.local_path.clone(),
            commands: Vec::new(),
            dependencies: implementation.dependencies.clone(),
            restrictions: implementation.restrictions.clone(),
            bindings: implementation.bindings.clone(),
        };
        selection.add_command(requirements.command_name(), implementation);
        selection
    }

    /// The feed to look the original implementation up in
    pub fn feed_uri(&self) -> &FeedUri {
        self.from_feed.as_ref().unwrap_or(&self.interface)
    }

    pub fn is_native(&self) -> bool {
        self.distribution.is_some()
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// An empty name asks for no command and is always contained
    pub fn contains_command(&self, name: &str) -> bool {
        name.is_empty() || self.command(name).is_some()
    }

    /// Copy a command from the original implementation; `None` if it has no such command
    pub fn add_command(&mut self, name: &str, from: &Implementation) -> Option<&Command> {
        if name.is_empty() {
            return None;
        }
        if let Some(index) = self.commands.iter().position(|c| c.name == name) {
            return self.commands.get(index);
        }
        let command = from.command(name)?.clone();
        self.commands.push(command);
        self.commands.last()
    }

    /// Restrictions this selection places on other interfaces
    pub fn effective_restrictions(&self) -> impl Iterator<Item = &Restriction> {
        self.dependencies
            .iter()
            .map(|d| &d.restriction)
            .chain(self.restrictions.iter())
            .chain(self.commands.iter().flat_map(|c| c.effective_restrictions()))
    }
}

/// The result of a solve: the requested interface and command plus one
/// selection per interface involved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Selections {
    pub interface: FeedUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub implementations: IndexMap<FeedUri, Arc<ImplementationSelection>>,
}

impl Selections {
    pub fn new(interface: impl Into<FeedUri>) -> Self {
        Selections {
            interface: interface.into(),
            command: None,
            implementations: IndexMap::new(),
        }
    }

    /// Empty selections for the interface and command of a request
    pub fn for_requirements(requirements: &Requirements) -> Self {
        Selections {
            interface: requirements.interface.clone(),
            command: requirements.command.clone(),
            implementations: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }

    pub fn get(&self, interface: &FeedUri) -> Option<&ImplementationSelection> {
        self.implementations.get(interface).map(|s| s.as_ref())
    }

    pub fn contains(&self, interface: &FeedUri) -> bool {
        self.implementations.contains_key(interface)
    }

    /// Add a selection, replacing any previous one for the same interface
    pub fn insert(&mut self, selection: ImplementationSelection) {
        self.implementations
            .insert(selection.interface.clone(), Arc::new(selection));
    }

    pub fn remove(&mut self, interface: &FeedUri) -> Option<Arc<ImplementationSelection>> {
        self.implementations.shift_remove(interface)
    }

    /// Mutable access that unshares the selection from any snapshot first
    pub fn get_mut(&mut self, interface: &FeedUri) -> Option<&mut ImplementationSelection> {
        self.implementations.get_mut(interface).map(Arc::make_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImplementationSelection> {
        self.implementations.values().map(|s| s.as_ref())
    }

    /// The selection for the requested interface
    pub fn main_implementation(&self) -> Option<&ImplementationSelection> {
        self.get(&self.interface)
    }

    /// Every restriction the current selections place on `interface`
    pub fn restrictions_for<'a>(&'a self, interface: &'a FeedUri) -> impl Iterator<Item = &'a Restriction> + 'a {
        self.iter()
            .flat_map(|s| s.effective_restrictions())
            .filter(move |r| r.interface == *interface)
    }

    /// Drop restriction-only edges, which are only needed while solving
    pub fn purge_restrictions(&mut self) {
        for selection in self.implementations.values_mut() {
            let has_restrictions = !selection.restrictions.is_empty()
                || selection.commands.iter().any(|c| !c.restrictions.is_empty());
            if has_restrictions {
                let selection = Arc::make_mut(selection);
                selection.restrictions.clear();
                for command in &mut selection.commands {
                    command.restrictions.clear();
                }
            }
        }
    }

    /// Order selections by interface URI
    pub fn sort(&mut self) {
        self.implementations.sort_keys();
    }

    /// Selections that must be fetched before launching.
    ///
    /// Native packages and implementations with a local path never need fetching.
    pub fn uncached(&self, store: &dyn ImplementationStore) -> Vec<&ImplementationSelection> {
        self.iter()
            .filter(|s| !s.is_native() && s.local_path.is_none())
            .filter(|s| !store.contains(&s.digest))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
