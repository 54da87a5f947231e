//! Version range types for restricting acceptable versions

mod operator;
mod range;

pub use operator::{InvalidOperatorError, Operator};
pub use range::{RangePart, VersionRange};
