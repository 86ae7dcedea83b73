// ABOUTME: Implements PermissionerProvider - an embedding scope around one engine.
// ABOUTME: Rebuilds the engine when the context changes and drives live queries.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use super::query::{PermissionQuery, QueryState};
use crate::checker::CheckerRegistry;
use crate::engine::{Permissioner, TableSource};
use crate::error::CheckError;
use crate::model::{FallbackTable, PermissionKey};

type EngineSlot<C> = Option<Arc<Permissioner<C>>>;

/// Holds the fixed fallback table and checkers of an application, and the
/// engine built for the current context.
///
/// The scope is inactive until [`PermissionerProvider::provide`] is called.
pub struct PermissionerProvider<C> {
    fallbacks: Arc<FallbackTable>,
    checkers: Arc<CheckerRegistry<C>>,
    engine: watch::Sender<EngineSlot<C>>,
}

impl<C: Send + Sync + 'static> PermissionerProvider<C> {
    pub fn new(
        checkers: impl Into<Arc<CheckerRegistry<C>>>,
        fallbacks: impl Into<Arc<FallbackTable>>,
    ) -> Self {
        let (engine, _) = watch::channel(None);
        Self {
            fallbacks: fallbacks.into(),
            checkers: checkers.into(),
            engine,
        }
    }

    /// Build an engine for `context` and make it the active one.
    ///
    /// Live queries re-evaluate against the new engine.
    pub fn provide(&self, context: C) -> Arc<Permissioner<C>> {
        let engine = Arc::new(Permissioner::new(
            self.fallbacks.clone(),
            self.checkers.clone(),
            context,
        ));
        self.engine.send_replace(Some(engine.clone()));
        debug!("permissioner scope provided");
        engine
    }

    /// End the scope. Live queries settle as failed until a new context is provided.
    pub fn clear(&self) {
        self.engine.send_replace(None);
        debug!("permissioner scope cleared");
    }

    /// The active engine.
    pub fn engine(&self) -> Result<Arc<Permissioner<C>>, CheckError> {
        self.engine.borrow().clone().ok_or(CheckError::NoActiveScope)
    }

    /// Start a live check of `key` against `table`.
    ///
    /// Fails immediately when the scope is inactive or the key is malformed.
    /// Must be called from within a tokio runtime.
    pub fn query(
        &self,
        table: Arc<dyn TableSource>,
        key: &str,
        data: Value,
    ) -> Result<PermissionQuery, CheckError> {
        let mut engines = self.engine.subscribe();
        if engines.borrow_and_update().is_none() {
            return Err(CheckError::NoActiveScope);
        }
        PermissionKey::parse(key)?;

        let key = key.to_string();
        let (state_tx, state_rx) = watch::channel(QueryState::Pending);

        let task = tokio::spawn(async move {
            loop {
                let engine = engines.borrow_and_update().clone();
                let state = match engine {
                    Some(engine) => {
                        state_tx.send_replace(QueryState::Pending);
                        match engine.has_permission_with(table.as_ref(), &key, &data).await {
                            Ok(allowed) => QueryState::Resolved(allowed),
                            Err(err) => QueryState::Failed(err.to_string()),
                        }
                    }
                    None => QueryState::Failed(CheckError::NoActiveScope.to_string()),
                };
                state_tx.send_replace(state);

                if engines.changed().await.is_err() {
                    break;
                }
            }
        });

        Ok(PermissionQuery {
            state: state_rx,
            task,
        })
    }
}

impl<C> fmt::Debug for PermissionerProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionerProvider")
            .field("active", &self.engine.borrow().is_some())
            .field("checkers", &self.checkers)
            .finish_non_exhaustive()
    }
}
