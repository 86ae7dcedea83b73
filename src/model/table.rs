// ABOUTME: Defines the fallback and permission tables and their per-action entries.
// ABOUTME: Both are serde documents, validated against a PermissionModel at setup time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::key::{join_key, PermissionKey};
use super::schema::PermissionModel;
use crate::error::SchemaError;

/// Named boolean weights for the conditions of one action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(BTreeMap<String, bool>);

impl Conditions {
    /// Create an empty set of conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of a condition. Absent conditions weigh `false`.
    pub fn get(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Whether the condition is present at all.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set a condition's weight, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, weight: bool) -> Option<bool> {
        self.0.insert(name.into(), weight)
    }

    /// Whether any condition weighs `true`.
    pub fn any_granted(&self) -> bool {
        self.0.values().any(|weight| *weight)
    }

    /// Iterate over `(name, weight)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    /// Iterate over condition names in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for Conditions {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Fallback shape of one action: its default and the authoritative condition set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackEntry {
    pub default: bool,
    #[serde(default)]
    pub conditions: Conditions,
}

/// Program-defined fallback for every action.
///
/// The fallback table is the source of truth for which condition keys are
/// legal. It must never grant anything: every default and every weight is
/// `false`. [`PermissionModel::fallback_table`] derives one directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackTable {
    functionalities: BTreeMap<String, BTreeMap<String, FallbackEntry>>,
}

impl FallbackTable {
    /// Create an empty fallback table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fallback table from JSON. Call [`FallbackTable::validate`] afterwards.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up the fallback entry of an action.
    pub fn entry(&self, key: &PermissionKey) -> Option<&FallbackEntry> {
        self.functionalities
            .get(key.functionality())?
            .get(key.action())
    }

    /// Insert or replace the fallback entry of an action.
    pub fn insert(&mut self, key: &PermissionKey, entry: FallbackEntry) {
        self.insert_raw(key.functionality(), key.action(), entry);
    }

    pub(crate) fn insert_raw(&mut self, functionality: &str, action: &str, entry: FallbackEntry) {
        self.functionalities
            .entry(functionality.to_string())
            .or_default()
            .insert(action.to_string(), entry);
    }

    /// Check the table against the model.
    ///
    /// Every declared action must have an entry whose condition set equals the
    /// declared set exactly, and no entry may grant access.
    pub fn validate(&self, model: &PermissionModel) -> Result<(), SchemaError> {
        for (functionality, action, declared) in model.actions() {
            let key = join_key(functionality, action);
            let entry = self
                .functionalities
                .get(functionality)
                .and_then(|actions| actions.get(action))
                .ok_or_else(|| SchemaError::MissingAction(key.clone()))?;

            if let Some(missing) = declared.iter().find(|c| !entry.conditions.contains(c)) {
                return Err(SchemaError::MissingCondition {
                    key,
                    condition: missing.clone(),
                });
            }

            if let Some(unknown) = entry
                .conditions
                .names()
                .find(|c| !declared.iter().any(|d| d == c))
            {
                return Err(SchemaError::UnknownCondition {
                    key,
                    condition: unknown.to_string(),
                });
            }

            if entry.default || entry.conditions.any_granted() {
                return Err(SchemaError::NotConservative(key));
            }
        }

        for (functionality, actions) in &self.functionalities {
            for action in actions.keys() {
                let declared = model
                    .actions()
                    .any(|(f, a, _)| f == functionality && a == action);
                if !declared {
                    return Err(SchemaError::UnknownAction(join_key(functionality, action)));
                }
            }
        }

        Ok(())
    }
}

/// Stored permissions of one action.
///
/// `{ "default": true }` is an unconditional grant. Otherwise `conditions`
/// partially overrides the fallback weights; a `null` weight is treated the
/// same as an omitted one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<BTreeMap<String, Option<bool>>>,
}

impl PermissionEntry {
    /// An unconditional grant.
    pub fn granted() -> Self {
        Self {
            default: true,
            conditions: None,
        }
    }

    /// A plain denial with no condition overrides.
    pub fn denied() -> Self {
        Self::default()
    }

    /// A non-granting default plus condition overrides.
    pub fn conditional<I, S>(default: bool, conditions: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            default,
            conditions: Some(
                conditions
                    .into_iter()
                    .map(|(name, weight)| (name.into(), Some(weight)))
                    .collect(),
            ),
        }
    }

    /// Overridden weights, skipping `null` ones.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, bool)> {
        self.conditions
            .iter()
            .flatten()
            .filter_map(|(name, weight)| weight.map(|w| (name.as_str(), w)))
    }
}

/// Externally supplied permissions of one actor or role.
///
/// The table must be total over the model: a query for an action without an
/// entry is a schema miss, not a denial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    functionalities: BTreeMap<String, BTreeMap<String, PermissionEntry>>,
}

impl PermissionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A total table that grants nothing.
    pub fn deny_all(model: &PermissionModel) -> Self {
        let mut table = Self::new();
        for (functionality, action, _) in model.actions() {
            table
                .functionalities
                .entry(functionality.to_string())
                .or_default()
                .insert(action.to_string(), PermissionEntry::denied());
        }
        table
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the table for storage beside a user or role record.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Look up the entry of an action.
    pub fn entry(&self, key: &PermissionKey) -> Option<&PermissionEntry> {
        self.functionalities
            .get(key.functionality())?
            .get(key.action())
    }

    /// Insert or replace the entry of an action.
    pub fn set(&mut self, key: &PermissionKey, entry: PermissionEntry) {
        self.functionalities
            .entry(key.functionality().to_string())
            .or_default()
            .insert(key.action().to_string(), entry);
    }

    /// Builder-style [`PermissionTable::set`] taking a textual key.
    pub fn with_entry(
        mut self,
        key: &str,
        entry: PermissionEntry,
    ) -> Result<Self, crate::error::CheckError> {
        let key = PermissionKey::parse(key)?;
        self.set(&key, entry);
        Ok(self)
    }

    /// Check that the table covers every declared action.
    ///
    /// Stale actions and stale conditions are tolerated; the engine ignores
    /// the former and prunes the latter.
    pub fn validate(&self, model: &PermissionModel) -> Result<(), SchemaError> {
        for (functionality, action, _) in model.actions() {
            let present = self
                .functionalities
                .get(functionality)
                .is_some_and(|actions| actions.contains_key(action));
            if !present {
                return Err(SchemaError::MissingAction(join_key(functionality, action)));
            }
        }
        Ok(())
    }
}
