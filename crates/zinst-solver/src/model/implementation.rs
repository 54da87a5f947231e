use serde::{Deserialize, Serialize};
use std::fmt;
use zinst_version::{ImplementationVersion, VersionRange};

use super::{Architecture, FeedUri, ManifestDigest, Stability};

/// How important a dependency is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Resolution fails if the dependency cannot be met
    #[default]
    Essential,
    /// Resolution continues without the dependency if it cannot be met
    Recommended,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Importance::Essential => f.write_str("essential"),
            Importance::Recommended => f.write_str("recommended"),
        }
    }
}

/// Limits which implementations of another interface may be selected
/// alongside the implementation declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Restriction {
    pub interface: FeedUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<VersionRange>,
    /// Allowed native package distributions; empty allows all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distributions: Vec<String>,
}

impl Restriction {
    pub fn new(interface: impl Into<FeedUri>) -> Self {
        Restriction {
            interface: interface.into(),
            versions: None,
            distributions: Vec::new(),
        }
    }

    pub fn with_versions(mut self, versions: VersionRange) -> Self {
        self.versions = Some(versions);
        self
    }

    /// Whether the version is accepted
    pub fn allows_version(&self, version: &ImplementationVersion) -> bool {
        self.versions.as_ref().map_or(true, |range| range.matches(version))
    }

    /// Whether a native package from `distribution` is accepted
    pub fn allows_distribution(&self, distribution: &str) -> bool {
        self.distributions.is_empty() || self.distributions.iter().any(|d| d == distribution)
    }
}

/// A binding exposes a selected implementation to the program using it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Binding {
    /// Set or extend an environment variable with a path inside the implementation
    Environment {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        insert: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// Store the path of a launcher for `command` in an environment variable
    ExecutableInVar {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },
    /// Put a launcher for `command` named `name` on the search path
    ExecutableInPath {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },
}

impl Binding {
    /// The command an executable-in binding needs, `None` for other bindings
    pub fn executable_command(&self) -> Option<&str> {
        match self {
            Binding::ExecutableInVar { command, .. } | Binding::ExecutableInPath { command, .. } => {
                Some(command.as_deref().unwrap_or(Command::NAME_RUN))
            }
            Binding::Environment { .. } => None,
        }
    }
}

/// A dependency on another interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub restriction: Restriction,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl Dependency {
    pub fn new(interface: impl Into<FeedUri>) -> Self {
        Dependency {
            restriction: Restriction::new(interface),
            importance: Importance::Essential,
            bindings: Vec::new(),
        }
    }

    pub fn interface(&self) -> &FeedUri {
        &self.restriction.interface
    }

    pub fn with_versions(mut self, versions: VersionRange) -> Self {
        self.restriction.versions = Some(versions);
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// Another interface's command used to launch a command (e.g. an interpreter)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Runner {
    #[serde(flatten)]
    pub restriction: Restriction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl Runner {
    pub fn new(interface: impl Into<FeedUri>) -> Self {
        Runner {
            restriction: Restriction::new(interface),
            command: None,
            arguments: Vec::new(),
        }
    }

    pub fn interface(&self) -> &FeedUri {
        &self.restriction.interface
    }

    pub fn command_name(&self) -> &str {
        self.command.as_deref().unwrap_or(Command::NAME_RUN)
    }

    pub fn with_versions(mut self, versions: VersionRange) -> Self {
        self.restriction.versions = Some(versions);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// A named entry point of an implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<Runner>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl Command {
    pub const NAME_RUN: &'static str = "run";
    pub const NAME_RUN_GUI: &'static str = "run-gui";
    pub const NAME_COMPILE: &'static str = "compile";
    pub const NAME_TEST: &'static str = "test";

    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            path: None,
            arguments: Vec::new(),
            runner: None,
            dependencies: Vec::new(),
            restrictions: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Restrictions this command imposes on other interfaces
    pub fn effective_restrictions(&self) -> impl Iterator<Item = &Restriction> {
        self.dependencies
            .iter()
            .map(|d| &d.restriction)
            .chain(self.restrictions.iter())
            .chain(self.runner.iter().map(|r| &r.restriction))
    }
}

/// One concrete, versioned artifact satisfying an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Implementation {
    pub id: String,
    pub version: ImplementationVersion,
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default = "default_stability")]
    pub stability: Stability,
    #[serde(default)]
    pub digest: ManifestDigest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
    /// Native package distribution, set for implementations provided by the OS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    /// Already unpacked on disk at this path; never needs fetching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

fn default_stability() -> Stability {
    Stability::Testing
}

impl Implementation {
    pub fn new(id: impl Into<String>, version: ImplementationVersion) -> Self {
        Implementation {
            id: id.into(),
            version,
            architecture: Architecture::default(),
            stability: default_stability(),
            digest: ManifestDigest::default(),
            languages: Vec::new(),
            commands: Vec::new(),
            dependencies: Vec::new(),
            restrictions: Vec::new(),
            bindings: Vec::new(),
            distribution: None,
            local_path: None,
        }
    }

    pub fn with_stability(mut self, stability: Stability) -> Self {
        self.stability = stability;
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn with_digest(mut self, digest: ManifestDigest) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn with_distribution(mut self, distribution: impl Into<String>) -> Self {
        self.distribution = Some(distribution.into());
        self
    }

    pub fn is_native(&self) -> bool {
        self.distribution.is_some()
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Restrictions this implementation always imposes on other interfaces
    pub fn effective_restrictions(&self) -> impl Iterator<Item = &Restriction> {
        self.dependencies
            .iter()
            .map(|d| &d.restriction)
            .chain(self.restrictions.iter())
    }
}
