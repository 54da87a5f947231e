//! Feed model for interfaces and their implementations
//!
//! Feeds are supplied already parsed and validated; the solver only reads them.

mod architecture;
mod digest;
mod feed;
mod implementation;
mod preferences;
mod stability;

pub use architecture::{Architecture, Cpu, Os};
pub use digest::ManifestDigest;
pub use feed::{Feed, FeedReference, FeedUri};
pub(crate) use feed::languages_intersect;
pub use implementation::{
    Binding, Command, Dependency, Implementation, Importance, Restriction, Runner,
};
pub use preferences::{FeedPreferences, ImplementationPreferences, InterfacePreferences};
pub use stability::Stability;
