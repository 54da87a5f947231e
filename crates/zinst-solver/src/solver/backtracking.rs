//! Limited backtracking search
//!
//! Demands are met depth-first. When a set of essential demands cannot be met
//! in one order, the selections are rolled back and the next ordering is
//! tried. A candidate whose own demands fail is dropped together with the
//! demand; lower-ranked candidates for the same interface are not retried,
//! which bounds the running time but means not every possible solution is found.

use crate::error::{Result, SolverError};
use crate::model::FeedUri;
use crate::requirements::Requirements;

use super::cancel::CancellationToken;
use super::candidate::SelectionCandidate;
use super::demand::{DemandBuilder, DemandSource, SolverDemand};
use super::provider::CandidateProvider;
use super::selections::{ImplementationSelection, Selections};

/// Solves [`Requirements`] using candidates from a [`CandidateProvider`]
pub struct BacktrackingSolver<'p, 'a> {
    provider: &'p CandidateProvider<'a>,
    cancellation: CancellationToken,
}

impl<'p, 'a> BacktrackingSolver<'p, 'a> {
    pub fn new(provider: &'p CandidateProvider<'a>) -> Self {
        Self {
            provider,
            cancellation: CancellationToken::new(),
        }
    }

    /// Abort the search once `cancellation` is triggered
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn solve(&self, requirements: &Requirements) -> Result<Selections> {
        log::info!("Running backtracking solver for {}", requirements);

        self.provider.clear();
        for alternative in requirements.normalized_alternatives() {
            let mut attempt = Attempt::new(&alternative, self.provider, &self.cancellation);
            if attempt.run()? {
                log::info!(
                    "Solved {} with {} selection(s)",
                    alternative,
                    attempt.selections.len()
                );
                return Ok(attempt.selections);
            }
            log::debug!("No solution for {}", alternative);
        }

        Err(SolverError::NoSolution {
            requirements: Box::new(requirements.clone()),
        })
    }
}

/// A single attempt to solve one normalized form of the requirements
struct Attempt<'s, 'a> {
    top_level: &'s Requirements,
    provider: &'s CandidateProvider<'a>,
    cancellation: &'s CancellationToken,
    selections: Selections,
}

impl<'s, 'a> Attempt<'s, 'a> {
    fn new(
        top_level: &'s Requirements,
        provider: &'s CandidateProvider<'a>,
        cancellation: &'s CancellationToken,
    ) -> Self {
        Self {
            top_level,
            provider,
            cancellation,
            selections: Selections::for_requirements(top_level),
        }
    }

    fn run(&mut self) -> Result<bool> {
        let successful = self.try_to_meet_all(vec![SolverDemand::essential(self.top_level.clone())])?;
        self.selections.purge_restrictions();
        self.selections.sort();
        Ok(successful)
    }

    fn builder(&self) -> DemandBuilder<'s> {
        DemandBuilder::new(self.top_level)
    }

    fn try_to_meet_all(&mut self, demands: Vec<SolverDemand>) -> Result<bool> {
        let (essential, recommended): (Vec<_>, Vec<_>) = demands.into_iter().partition(SolverDemand::is_essential);

        // Quickly reject impossible sets of demands
        for demand in &essential {
            if !demand.has_suitable_candidate(self.provider)? {
                log::debug!("No suitable candidate for {}", demand);
                return Ok(false);
            }
        }

        let snapshot = self.selections.clone();
        for order in Permutations::new(essential.len()) {
            if self.try_to_meet_in_order(&essential, &order)? {
                for demand in &recommended {
                    let before = self.selections.clone();
                    if !self.try_to_meet(demand)? {
                        log::debug!("Skipping unmet {}", demand);
                        self.selections = before;
                    }
                }
                return Ok(true);
            }
            log::debug!("Backtracking over {} essential demand(s)", essential.len());
            self.selections = snapshot.clone();
        }
        Ok(false)
    }

    fn try_to_meet_in_order(&mut self, demands: &[SolverDemand], order: &[usize]) -> Result<bool> {
        for &index in order {
            if !self.try_to_meet(&demands[index])? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn try_to_meet(&mut self, demand: &SolverDemand) -> Result<bool> {
        if self.cancellation.is_cancelled() {
            return Err(SolverError::Cancelled);
        }

        let candidates = demand.candidates(self.provider)?;
        let interface = &demand.requirements.interface;

        let existing = self.selections.implementations.get(interface).cloned();
        match existing {
            None => {
                let Some(candidate) = candidates.iter().find(|c| self.is_compatible(c, &demand.requirements)) else {
                    log::trace!("No compatible candidate for {}", demand);
                    return Ok(false);
                };

                let selection = ImplementationSelection::from_candidate(candidate, &demand.requirements);
                let demands = self.builder().demands_for_selection(&selection, &demand.requirements)?;
                log::debug!("Selected {} version {} for {}", selection.id, selection.version, interface);
                self.selections.insert(selection);

                if self.try_to_meet_all(demands)? {
                    Ok(true)
                } else {
                    log::debug!("Rejected {} for {}", candidate.id(), interface);
                    self.selections.remove(interface);
                    Ok(false)
                }
            }
            Some(existing) => {
                let still_compatible = candidates
                    .iter()
                    .any(|c| c.is_selected_as(&existing) && self.is_compatible(c, &demand.requirements));
                if !still_compatible {
                    log::trace!("Existing selection {} does not meet {}", existing.id, demand);
                    return Ok(false);
                }

                let command_name = demand.requirements.command_name();
                if existing.contains_command(command_name) {
                    return Ok(true);
                }

                let Some(original) = self.provider.lookup_original_implementation(&existing)? else {
                    return Ok(true);
                };
                let Some(command) = original.command(command_name) else {
                    return Ok(true);
                };

                let demands = self.builder().demands(DemandSource::Command {
                    command,
                    interface,
                })?;
                log::debug!("Adding command {} to {}", command_name, interface);
                if let Some(selection) = self.selections.get_mut(interface) {
                    selection.add_command(command_name, &original);
                }
                self.try_to_meet_all(demands)
            }
        }
    }

    /// Checks restrictions in both directions: those already recorded against
    /// the candidate's interface, and those the candidate would place on
    /// interfaces that are already selected.
    fn is_compatible(&self, candidate: &SelectionCandidate, requirements: &Requirements) -> bool {
        if !candidate.is_suitable {
            return false;
        }

        let implementation = &candidate.implementation;
        for restriction in self.selections.restrictions_for(&requirements.interface) {
            if !restriction.allows_version(&implementation.version) {
                log::trace!("{} excluded by a restriction on its version", candidate.id());
                return false;
            }
            if let Some(distribution) = &implementation.distribution {
                if !restriction.allows_distribution(distribution) {
                    log::trace!("{} excluded by a restriction on its distribution", candidate.id());
                    return false;
                }
            }
        }

        let command = implementation.command(requirements.command_name());
        let own_restrictions = implementation
            .effective_restrictions()
            .chain(command.into_iter().flat_map(|c| c.effective_restrictions()));
        for restriction in own_restrictions {
            if let Some(selected) = self.selected(&restriction.interface) {
                if !restriction.allows_version(&selected.version) {
                    log::trace!("{} conflicts with selected {}", candidate.id(), selected.id);
                    return false;
                }
                if let Some(distribution) = &selected.distribution {
                    if !restriction.allows_distribution(distribution) {
                        log::trace!("{} conflicts with selected {}", candidate.id(), selected.id);
                        return false;
                    }
                }
            }
        }

        true
    }

    fn selected(&self, interface: &FeedUri) -> Option<&ImplementationSelection> {
        self.selections.get(interface)
    }
}

/// All orderings of `0..n` in lexicographic order, starting with the identity
struct Permutations {
    next: Option<Vec<usize>>,
}

impl Permutations {
    fn new(n: usize) -> Self {
        Self {
            next: Some((0..n).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;

        let mut following = current.clone();
        if let Some(pivot) = following.windows(2).rposition(|w| w[0] < w[1]) {
            let swap = following
                .iter()
                .rposition(|&x| x > following[pivot])
                .unwrap_or(pivot);
            following.swap(pivot, swap);
            following[pivot + 1..].reverse();
            self.next = Some(following);
        }

        Some(current)
    }
}
