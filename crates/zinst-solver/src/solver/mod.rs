//! Backtracking dependency solver
//!
//! The [`CandidateProvider`] turns feeds into ranked [`SelectionCandidate`]s,
//! the [`BacktrackingSolver`] commits to candidates demand by demand and
//! records the result in [`Selections`].

mod backtracking;
mod cancel;
mod candidate;
mod comparer;
mod demand;
mod provider;
mod selections;

#[cfg(test)]
mod tests;

pub use backtracking::BacktrackingSolver;
pub use cancel::CancellationToken;
pub use candidate::SelectionCandidate;
pub use comparer::SelectionCandidateComparer;
pub use demand::{DemandBuilder, DemandSource, SolverDemand};
pub use provider::CandidateProvider;
pub use selections::{ImplementationSelection, Selections};
