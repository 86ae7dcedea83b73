// ABOUTME: Engine module - the Permissioner decision engine and its table sources.
// ABOUTME: This is where stored tables, fallbacks and checkers meet.

mod merge;
mod permissioner;
mod source;

pub use merge::*;
pub use permissioner::*;
pub use source::*;

#[cfg(test)]
mod source_test;
