// ABOUTME: Checker module - pluggable predicates and the registry that holds them.
// ABOUTME: Checkers decide actions whose conditions need runtime evaluation.

mod registry;
mod traits;

pub use registry::*;
pub use traits::*;
