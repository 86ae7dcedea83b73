// ABOUTME: Implements the CheckerRegistry - checkers keyed by functionality and action.
// ABOUTME: Built once at setup time and read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{AsyncFnChecker, Checker, FnChecker, TypedChecker};
use crate::error::{CheckError, SchemaError};
use crate::model::{Conditions, PermissionKey, PermissionModel};

/// Checkers for the actions that need dynamic evaluation.
///
/// An action without a checker is always denied once its conditions call for
/// evaluation, so registering is opt-in per action.
pub struct CheckerRegistry<C> {
    checkers: HashMap<PermissionKey, Arc<dyn Checker<C>>>,
}

impl<C: Send + Sync + 'static> CheckerRegistry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            checkers: HashMap::new(),
        }
    }

    /// Register a checker for `"<functionality>.<action>"`.
    ///
    /// Registering the same key twice replaces the earlier checker.
    pub fn register<T: Checker<C> + 'static>(
        self,
        key: &str,
        checker: T,
    ) -> Result<Self, CheckError> {
        self.register_arc(key, Arc::new(checker))
    }

    /// Register a checker from an Arc.
    pub fn register_arc(
        mut self,
        key: &str,
        checker: Arc<dyn Checker<C>>,
    ) -> Result<Self, CheckError> {
        let key = PermissionKey::parse(key)?;
        self.checkers.insert(key, checker);
        Ok(self)
    }

    /// Register a synchronous closure.
    pub fn register_fn<F>(self, key: &str, f: F) -> Result<Self, CheckError>
    where
        F: Fn(&C, &Conditions, &Value) -> bool + Send + Sync + 'static,
    {
        self.register(key, FnChecker::new(f))
    }

    /// Register a closure returning a boxed future.
    pub fn register_async<F>(self, key: &str, f: F) -> Result<Self, CheckError>
    where
        F: for<'a> Fn(&'a C, &'a Conditions, &'a Value) -> BoxFuture<'a, Result<bool, anyhow::Error>>
            + Send
            + Sync
            + 'static,
    {
        self.register(key, AsyncFnChecker::new(f))
    }

    /// Register a closure that receives the data payload deserialized as `D`.
    pub fn register_typed<D, F>(self, key: &str, f: F) -> Result<Self, CheckError>
    where
        D: DeserializeOwned + Send + 'static,
        F: Fn(&C, &Conditions, D) -> bool + Send + Sync + 'static,
    {
        self.register(key, TypedChecker::<D, F>::new(f))
    }

    /// Get the checker registered for an action.
    pub fn get(&self, key: &PermissionKey) -> Option<&Arc<dyn Checker<C>>> {
        self.checkers.get(key)
    }

    /// Whether a checker is registered for an action.
    pub fn contains(&self, key: &PermissionKey) -> bool {
        self.checkers.contains_key(key)
    }

    /// List all registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.checkers.keys().map(ToString::to_string).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Reject checkers registered for actions the model does not declare.
    pub fn validate(&self, model: &PermissionModel) -> Result<(), SchemaError> {
        let mut unknown: Vec<_> = self
            .checkers
            .keys()
            .filter(|key| !model.contains(key))
            .collect();
        unknown.sort();

        match unknown.first() {
            Some(key) => Err(SchemaError::UnknownAction(key.to_string())),
            None => Ok(()),
        }
    }
}

impl<C: Send + Sync + 'static> Default for CheckerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CheckerRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.checkers.keys().collect();
        keys.sort();
        f.debug_struct("CheckerRegistry")
            .field("keys", &keys)
            .finish()
    }
}
