//! Version numbers and version ranges for feed-based dependency resolution
//!
//! Versions are dotted lists of numbers followed by optional `-`-separated
//! parts carrying a `pre`, `rc` or `post` modifier (`1.2-rc3-post1`).
//! Ranges combine exact versions, exclusions, half-open intervals and
//! operator comparisons (`1.0..!2.0 | >=3.0,!=3.1`).

pub mod constraint;
mod version;

pub use constraint::{InvalidOperatorError, Operator, RangePart, VersionRange};
pub use version::{DottedList, ImplementationVersion, Modifier, VersionError, VersionPart};
