//! Dependency resolution for feed-based software distribution
//!
//! Resolves a [`Requirements`] value against a pool of feeds into a
//! [`Selections`] value: one implementation per interface, with the commands
//! that must be runnable and the restrictions that justified each choice.
//! Feed retrieval, the implementation store and user preferences are reached
//! through the traits in [`repository`].

pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod requirements;
pub mod solver;

pub use config::{ConfigLoader, NetworkLevel, SolverConfig};
pub use error::{ConfigError, FeedError, Result, SolverError};
pub use model::{
    Architecture, Binding, Command, Dependency, Feed, FeedReference, FeedUri, Implementation,
    Importance, ManifestDigest, Restriction, Runner, Stability,
};
pub use repository::{
    FeedProvider, ImplementationStore, MemoryFeedProvider, MemoryPreferences, MemoryStore,
    PreferencesProvider,
};
pub use requirements::Requirements;
pub use solver::{
    BacktrackingSolver, CancellationToken, CandidateProvider, ImplementationSelection,
    SelectionCandidate, SelectionCandidateComparer, Selections, SolverDemand,
};
