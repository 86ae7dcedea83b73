// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use permissioner::prelude::*;` to get started quickly.

pub use crate::checker::{AsyncFnChecker, Checker, CheckerRegistry, FnChecker, TypedChecker};
pub use crate::engine::{
    merge_conditions, table_async, table_fn, AsyncTableFn, Permissioner, TableFn, TableSource,
};
pub use crate::error::{CheckError, PermissionerError, SchemaError};
pub use crate::model::{
    Conditions, FallbackEntry, FallbackTable, PermissionEntry, PermissionKey, PermissionModel,
    PermissionModelBuilder, PermissionTable,
};
pub use crate::provider::{PermissionQuery, PermissionerProvider, QueryState};
