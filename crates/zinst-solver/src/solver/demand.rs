use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{FeedError, SolverError};
use crate::model::{Binding, Command, Dependency, FeedUri, Importance, Restriction, Runner};
use crate::requirements::Requirements;

use super::candidate::SelectionCandidate;
use super::provider::CandidateProvider;
use super::selections::ImplementationSelection;

/// Requirements the solver must meet, with lazily retrieved candidates
pub struct SolverDemand {
    pub requirements: Requirements,
    pub importance: Importance,
    candidates: OnceCell<Rc<[SelectionCandidate]>>,
}

impl SolverDemand {
    pub fn new(requirements: Requirements, importance: Importance) -> Self {
        Self {
            requirements,
            importance,
            candidates: OnceCell::new(),
        }
    }

    pub fn essential(requirements: Requirements) -> Self {
        Self::new(requirements, Importance::Essential)
    }

    pub fn is_essential(&self) -> bool {
        self.importance == Importance::Essential
    }

    /// Sorted candidates, fetched from the provider on first access
    pub fn candidates(&self, provider: &CandidateProvider<'_>) -> Result<Rc<[SelectionCandidate]>, FeedError> {
        if let Some(candidates) = self.candidates.get() {
            return Ok(Rc::clone(candidates));
        }
        let candidates = provider.get_sorted_candidates(&self.requirements)?;
        Ok(Rc::clone(self.candidates.get_or_init(|| candidates)))
    }

    pub fn has_suitable_candidate(&self, provider: &CandidateProvider<'_>) -> Result<bool, FeedError> {
        Ok(self.candidates(provider)?.iter().any(|c| c.is_suitable))
    }
}

impl fmt::Debug for SolverDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverDemand")
            .field("requirements", &self.requirements)
            .field("importance", &self.importance)
            .finish()
    }
}

impl fmt::Display for SolverDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.requirements, self.importance)
    }
}

/// Everything a selection can demand of other interfaces
#[derive(Debug, Clone, Copy)]
pub enum DemandSource<'a> {
    Dependency(&'a Dependency),
    Runner(&'a Runner),
    /// An `executable-in-*` binding of an implementation on `interface`
    ExecutableBinding {
        binding: &'a Binding,
        interface: &'a FeedUri,
    },
    /// The chosen command of an implementation on `interface`
    Command {
        command: &'a Command,
        interface: &'a FeedUri,
    },
}

/// Turns demand sources into child requirements.
///
/// Every child inherits the architecture, languages and version
/// restrictions of the top-level request.
#[derive(Debug, Clone, Copy)]
pub struct DemandBuilder<'t> {
    top_level: &'t Requirements,
}

impl<'t> DemandBuilder<'t> {
    pub fn new(top_level: &'t Requirements) -> Self {
        Self { top_level }
    }

    /// Requirements for another interface in the context of the top-level request
    pub fn requirements_for(&self, interface: &FeedUri, command: Option<&str>) -> Requirements {
        let mut requirements = Requirements::new(interface.clone())
            .with_command(command.unwrap_or(Command::NAME_RUN))
            .with_architecture(self.top_level.architecture);
        requirements.add_restrictions(self.top_level);
        requirements
            .languages
            .extend(self.top_level.languages.iter().cloned());
        requirements
    }

    /// Child requirements of one source, paired with their importance
    pub fn requirements(&self, source: DemandSource<'_>) -> Result<Vec<(Requirements, Importance)>, SolverError> {
        match source {
            DemandSource::Dependency(dependency) => {
                let mut restricted = self.requirements_for(dependency.interface(), Some(""));
                restrict(&mut restricted, &dependency.restriction);

                let mut children = vec![(restricted, dependency.importance)];
                children.extend(
                    executable_commands(&dependency.bindings)
                        .map(|command| (self.requirements_for(dependency.interface(), Some(command)), dependency.importance)),
                );
                Ok(children)
            }
            DemandSource::Runner(runner) => {
                let mut requirements = self.requirements_for(runner.interface(), Some(runner.command_name()));
                restrict(&mut requirements, &runner.restriction);
                Ok(vec![(requirements, Importance::Essential)])
            }
            DemandSource::ExecutableBinding { binding, interface } => Ok(binding
                .executable_command()
                .map(|command| (self.requirements_for(interface, Some(command)), Importance::Essential))
                .into_iter()
                .collect()),
            DemandSource::Command { command, interface } => {
                if executable_commands(&command.bindings).next().is_some() {
                    return Err(SolverError::UnsupportedBinding {
                        command: command.name.clone(),
                        interface: interface.clone(),
                    });
                }

                let mut children = Vec::new();
                if let Some(runner) = &command.runner {
                    children.extend(self.requirements(DemandSource::Runner(runner))?);
                }
                for dependency in &command.dependencies {
                    children.extend(self.requirements(DemandSource::Dependency(dependency))?);
                }
                Ok(children)
            }
        }
    }

    /// Demands introduced by one source
    pub fn demands(&self, source: DemandSource<'_>) -> Result<Vec<SolverDemand>, SolverError> {
        Ok(self
            .requirements(source)?
            .into_iter()
            .map(|(requirements, importance)| SolverDemand::new(requirements, importance))
            .collect())
    }

    /// Demands introduced by a new selection made for `requirements`
    pub fn demands_for_selection(
        &self,
        selection: &ImplementationSelection,
        requirements: &Requirements,
    ) -> Result<Vec<SolverDemand>, SolverError> {
        let mut demands = Vec::new();
        for dependency in &selection.dependencies {
            demands.extend(self.demands(DemandSource::Dependency(dependency))?);
        }
        for binding in &selection.bindings {
            demands.extend(self.demands(DemandSource::ExecutableBinding {
                binding,
                interface: &selection.interface,
            })?);
        }
        if let Some(command) = selection.command(requirements.command_name()) {
            demands.extend(self.demands(DemandSource::Command {
                command,
                interface: &selection.interface,
            })?);
        }
        Ok(demands)
    }
}

fn restrict(requirements: &mut Requirements, restriction: &Restriction) {
    if let Some(versions) = &restriction.versions {
        requirements.add_restriction(restriction.interface.clone(), versions.clone());
    }
    requirements
        .distributions
        .extend(restriction.distributions.iter().cloned());
}

fn executable_commands(bindings: &[Binding]) -> impl Iterator<Item = &str> {
    bindings.iter().filter_map(Binding::executable_command)
}
