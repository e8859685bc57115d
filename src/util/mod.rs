//! Utilities
//!
//! Small containers and source-location types used throughout the crate.

mod bimap;
mod scope;
mod span;

pub use bimap::Bimap;
pub use scope::{AlreadyDefined, Scope};
pub use span::{Position, Span};
