// ABOUTME: Root module for permissioner - data-driven permission decisions.
// ABOUTME: Re-exports the model, checkers, engine and provider from submodules.

pub mod checker;
pub mod engine;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;

pub use engine::Permissioner;
pub use error::PermissionerError;
