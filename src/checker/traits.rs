// ABOUTME: Defines the Checker trait - the pluggable predicate for conditional actions.
// ABOUTME: Also provides adapters for sync closures, async closures, and typed payloads.

use std::fmt;
use std::marker::PhantomData;

use anyhow::Context as _;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::Conditions;

/// Decides an action once its merged conditions call for dynamic evaluation.
///
/// A checker only runs when at least one merged condition weighs `true`.
/// Returning `Err` is a checker fault: the engine propagates it unchanged
/// and never reads it as a denial.
#[async_trait]
pub trait Checker<C>: Send + Sync {
    /// Evaluate the action for the engine's context.
    async fn check(
        &self,
        context: &C,
        conditions: &Conditions,
        data: &Value,
    ) -> Result<bool, anyhow::Error>;
}

/// A checker backed by a synchronous closure.
pub struct FnChecker<F>(F);

impl<F> FnChecker<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<C, F> Checker<C> for FnChecker<F>
where
    C: Send + Sync,
    F: Fn(&C, &Conditions, &Value) -> bool + Send + Sync,
{
    async fn check(
        &self,
        context: &C,
        conditions: &Conditions,
        data: &Value,
    ) -> Result<bool, anyhow::Error> {
        Ok((self.0)(context, conditions, data))
    }
}

/// A checker backed by a closure returning a boxed future.
///
/// ```ignore
/// AsyncFnChecker::new(|ctx: &Session, conditions, _data| {
///     Box::pin(async move { Ok(conditions.get("isOwner") && ctx.is_active().await) })
/// })
/// ```
pub struct AsyncFnChecker<F>(F);

impl<F> AsyncFnChecker<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<C, F> Checker<C> for AsyncFnChecker<F>
where
    C: Send + Sync,
    F: for<'a> Fn(&'a C, &'a Conditions, &'a Value) -> BoxFuture<'a, Result<bool, anyhow::Error>>
        + Send
        + Sync,
{
    async fn check(
        &self,
        context: &C,
        conditions: &Conditions,
        data: &Value,
    ) -> Result<bool, anyhow::Error> {
        (self.0)(context, conditions, data).await
    }
}

/// A checker whose data payload is deserialized into `D` before the closure runs.
///
/// A payload that does not match `D` is a checker fault.
pub struct TypedChecker<D, F> {
    f: F,
    _data: PhantomData<fn() -> D>,
}

impl<D, F> TypedChecker<D, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _data: PhantomData,
        }
    }
}

#[async_trait]
impl<C, D, F> Checker<C> for TypedChecker<D, F>
where
    C: Send + Sync,
    D: DeserializeOwned + Send + 'static,
    F: Fn(&C, &Conditions, D) -> bool + Send + Sync,
{
    async fn check(
        &self,
        context: &C,
        conditions: &Conditions,
        data: &Value,
    ) -> Result<bool, anyhow::Error> {
        let data = serde_json::from_value::<D>(data.clone()).with_context(|| {
            format!(
                "checker data does not match {}",
                std::any::type_name::<D>()
            )
        })?;
        Ok((self.f)(context, conditions, data))
    }
}

impl<F> fmt::Debug for FnChecker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnChecker")
    }
}

impl<F> fmt::Debug for AsyncFnChecker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncFnChecker")
    }
}

impl<D, F> fmt::Debug for TypedChecker<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedChecker")
            .field("data", &std::any::type_name::<D>())
            .finish()
    }
}
