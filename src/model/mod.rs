// ABOUTME: Model module - the permission schema, query keys, and table shapes.
// ABOUTME: Everything here is plain data plus setup-time validation.

mod key;
mod schema;
mod table;

pub use key::*;
pub use schema::*;
pub use table::*;

#[cfg(test)]
mod table_test;
