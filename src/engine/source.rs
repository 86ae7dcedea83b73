// ABOUTME: Defines TableSource - how the engine obtains a permission table per call.
// ABOUTME: Covers preloaded tables and sync or async producers invoked on every call.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::model::PermissionTable;

/// Anything that can yield a permission table for one query.
///
/// Sources are resolved exactly once per query and never cached across
/// queries.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Resolve the table. An error fails the query; it is never a grant.
    async fn resolve(&self) -> Result<Cow<'_, PermissionTable>, anyhow::Error>;
}

#[async_trait]
impl TableSource for PermissionTable {
    async fn resolve(&self) -> Result<Cow<'_, PermissionTable>, anyhow::Error> {
        Ok(Cow::Borrowed(self))
    }
}

#[async_trait]
impl TableSource for Arc<PermissionTable> {
    async fn resolve(&self) -> Result<Cow<'_, PermissionTable>, anyhow::Error> {
        Ok(Cow::Borrowed(self.as_ref()))
    }
}

/// A synchronous zero-argument producer.
pub struct TableFn<F>(F);

/// Wrap a closure that builds the table on demand.
pub fn table_fn<F>(f: F) -> TableFn<F>
where
    F: Fn() -> PermissionTable + Send + Sync,
{
    TableFn(f)
}

#[async_trait]
impl<F> TableSource for TableFn<F>
where
    F: Fn() -> PermissionTable + Send + Sync,
{
    async fn resolve(&self) -> Result<Cow<'_, PermissionTable>, anyhow::Error> {
        Ok(Cow::Owned((self.0)()))
    }
}

/// An asynchronous zero-argument producer, e.g. a fetch from a store.
pub struct AsyncTableFn<F>(F);

/// Wrap a closure returning a future that yields the table.
pub fn table_async<F, Fut>(f: F) -> AsyncTableFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<PermissionTable, anyhow::Error>> + Send + 'static,
{
    AsyncTableFn(f)
}

#[async_trait]
impl<F, Fut> TableSource for AsyncTableFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<PermissionTable, anyhow::Error>> + Send + 'static,
{
    async fn resolve(&self) -> Result<Cow<'_, PermissionTable>, anyhow::Error> {
        (self.0)().await.map(Cow::Owned)
    }
}
