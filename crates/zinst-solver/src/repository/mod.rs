//! Collaborators the solver reads from: feeds, the implementation store and
//! user preferences. All of them are read-only for the duration of a solve.

mod feeds;
mod preferences;
mod store;

pub use feeds::{FeedProvider, MemoryFeedProvider};
pub use preferences::{MemoryPreferences, PreferencesProvider};
pub use store::{ImplementationStore, MemoryStore};
