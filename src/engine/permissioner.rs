// ABOUTME: Implements the Permissioner - the decision engine for permission queries.
// ABOUTME: Merges stored entries with the fallback schema and invokes checkers.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use super::merge::merge_conditions;
use super::source::TableSource;
use crate::checker::CheckerRegistry;
use crate::error::{CheckError, SchemaError};
use crate::model::{FallbackTable, PermissionKey, PermissionModel, PermissionTable};

/// Answers "is action A of functionality F allowed?" for one context.
///
/// The fallback table, checkers and context are fixed for the engine's
/// lifetime; to swap any of them, build a new engine. The engine holds no
/// mutable state, so any number of queries may run concurrently.
pub struct Permissioner<C> {
    fallbacks: Arc<FallbackTable>,
    checkers: Arc<CheckerRegistry<C>>,
    context: C,
}

impl<C: Send + Sync + 'static> Permissioner<C> {
    /// Bind an engine to a fallback table, a checker registry and a context.
    pub fn new(
        fallbacks: impl Into<Arc<FallbackTable>>,
        checkers: impl Into<Arc<CheckerRegistry<C>>>,
        context: C,
    ) -> Self {
        Self {
            fallbacks: fallbacks.into(),
            checkers: checkers.into(),
            context,
        }
    }

    /// Like [`Permissioner::new`], but first checks the model, the fallback
    /// table and the registry against each other.
    pub fn validated(
        model: &PermissionModel,
        fallbacks: impl Into<Arc<FallbackTable>>,
        checkers: impl Into<Arc<CheckerRegistry<C>>>,
        context: C,
    ) -> Result<Self, SchemaError> {
        let engine = Self::new(fallbacks, checkers, context);
        model.validate()?;
        engine.fallbacks.validate(model)?;
        engine.checkers.validate(model)?;
        Ok(engine)
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        &self.fallbacks
    }

    pub fn checkers(&self) -> &CheckerRegistry<C> {
        &self.checkers
    }

    /// Check a permission whose checker takes no data.
    pub async fn has_permission<T>(&self, table: &T, key: &str) -> Result<bool, CheckError>
    where
        T: TableSource + ?Sized,
    {
        self.has_permission_with(table, key, &Value::Null).await
    }

    /// Check a permission, forwarding `data` verbatim to the checker.
    ///
    /// `table` is resolved exactly once, before anything else is looked up.
    /// Returns `Ok(true)` only for an unconditional grant or a checker that
    /// says yes; every other outcome is `Ok(false)` or an error.
    #[instrument(level = "debug", skip(self, table, data))]
    pub async fn has_permission_with<T>(
        &self,
        table: &T,
        key: &str,
        data: &Value,
    ) -> Result<bool, CheckError>
    where
        T: TableSource + ?Sized,
    {
        let key = PermissionKey::parse(key)?;
        let table = table.resolve().await.map_err(CheckError::Source)?;
        self.decide(&table, &key, data).await
    }

    async fn decide(
        &self,
        table: &PermissionTable,
        key: &PermissionKey,
        data: &Value,
    ) -> Result<bool, CheckError> {
        let entry = table
            .entry(key)
            .ok_or_else(|| CheckError::SchemaMiss(key.to_string()))?;

        if entry.default {
            debug!("unconditional grant");
            return Ok(true);
        }

        let fallback = self
            .fallbacks
            .entry(key)
            .ok_or_else(|| CheckError::MissingFallback(key.to_string()))?;

        let conditions = merge_conditions(&fallback.conditions, entry);

        if !conditions.any_granted() {
            debug!("no condition granted, denying");
            return Ok(false);
        }

        let Some(checker) = self.checkers.get(key) else {
            debug!("no checker registered, denying");
            return Ok(false);
        };

        let allowed = checker
            .check(&self.context, &conditions, data)
            .await
            .map_err(|source| CheckError::Checker {
                key: key.to_string(),
                source,
            })?;

        debug!(allowed, "checker decided");
        Ok(allowed)
    }
}

impl<C> fmt::Debug for Permissioner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permissioner")
            .field("fallbacks", &self.fallbacks)
            .field("checkers", &self.checkers)
            .finish_non_exhaustive()
    }
}
