// ABOUTME: Defines the PermissionModel - functionality -> action -> condition names.
// ABOUTME: The model is the runtime-validated schema every table is checked against.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::key::{is_valid_segment, join_key, PermissionKey};
use super::table::{Conditions, FallbackEntry, FallbackTable};
use crate::error::SchemaError;

/// The static shape of an application's permissions.
///
/// Each functionality groups a set of actions; each action declares the
/// (possibly empty) ordered list of condition names that gate it.
///
/// ```json
/// { "docs": { "read": [], "edit": ["isOwner", "isAdmin"] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionModel {
    functionalities: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl PermissionModel {
    /// Create a new model builder.
    pub fn builder() -> PermissionModelBuilder {
        PermissionModelBuilder::new()
    }

    /// Parse and validate a model from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Check names and condition lists.
    ///
    /// Functionality and action names must be non-empty and dot-free, so that
    /// every action is addressable by a key. Condition names must be non-empty
    /// and unique within their action.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (functionality, actions) in &self.functionalities {
            check_segment(functionality)?;

            for (action, conditions) in actions {
                check_segment(action)?;

                let mut seen = BTreeSet::new();
                for condition in conditions {
                    if condition.is_empty() {
                        return Err(SchemaError::InvalidName {
                            name: condition.clone(),
                            reason: "condition names must not be empty",
                        });
                    }
                    if !seen.insert(condition.as_str()) {
                        return Err(SchemaError::DuplicateCondition {
                            key: join_key(functionality, action),
                            condition: condition.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// The declared condition names of an action, if the action exists.
    pub fn conditions(&self, key: &PermissionKey) -> Option<&[String]> {
        self.functionalities
            .get(key.functionality())?
            .get(key.action())
            .map(Vec::as_slice)
    }

    /// Whether the model declares this action.
    pub fn contains(&self, key: &PermissionKey) -> bool {
        self.conditions(key).is_some()
    }

    /// Iterate over `(functionality, action, conditions)` in key order.
    pub fn actions(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.functionalities.iter().flat_map(|(functionality, actions)| {
            actions.iter().map(move |(action, conditions)| {
                (functionality.as_str(), action.as_str(), conditions.as_slice())
            })
        })
    }

    /// Number of declared actions across all functionalities.
    pub fn len(&self) -> usize {
        self.functionalities.values().map(BTreeMap::len).sum()
    }

    /// Whether the model declares no actions at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Derive the conservative fallback table for this model.
    ///
    /// Every action gets `default: false` and every declared condition a
    /// weight of `false`.
    pub fn fallback_table(&self) -> FallbackTable {
        let mut table = FallbackTable::new();
        for (functionality, action, conditions) in self.actions() {
            let entry = FallbackEntry {
                default: false,
                conditions: conditions
                    .iter()
                    .map(|name| (name.as_str(), false))
                    .collect::<Conditions>(),
            };
            table.insert_raw(functionality, action, entry);
        }
        table
    }
}

fn check_segment(name: &str) -> Result<(), SchemaError> {
    if is_valid_segment(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            name: name.to_string(),
            reason: "functionality and action names must be non-empty and must not contain '.'",
        })
    }
}

/// Builder for constructing models in code.
#[derive(Default)]
pub struct PermissionModelBuilder {
    functionalities: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl PermissionModelBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an action and its condition names.
    ///
    /// Declaring the same action twice replaces the earlier declaration.
    pub fn action<I, S>(
        mut self,
        functionality: impl Into<String>,
        action: impl Into<String>,
        conditions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functionalities
            .entry(functionality.into())
            .or_default()
            .insert(action.into(), conditions.into_iter().map(Into::into).collect());
        self
    }

    /// Build and validate the model.
    pub fn build(self) -> Result<PermissionModel, SchemaError> {
        let model = PermissionModel {
            functionalities: self.functionalities,
        };
        model.validate()?;
        Ok(model)
    }
}
