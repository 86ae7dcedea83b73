// ABOUTME: Provider module - embeds one engine per context and runs live queries.
// ABOUTME: For hosts that re-check permissions as their inputs change.

mod provider;
mod query;

pub use provider::*;
pub use query::*;
