// ABOUTME: Defines all error types for the permissioner library using thiserror.
// ABOUTME: Query-time and setup-time errors are separate enums, unified under PermissionerError.

/// Top-level error type for the permissioner library.
#[derive(Debug, thiserror::Error)]
pub enum PermissionerError {
    #[error("Check error: {0}")]
    Check(#[from] CheckError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors raised while answering a single permission query.
///
/// None of these is ever a grant. A caller that gets one of them back must
/// treat the check as failed, not as denied-and-handled.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Invalid permission key '{0}': expected '<functionality>.<action>'")]
    InvalidKey(String),

    #[error("Permission table has no entry for '{0}'")]
    SchemaMiss(String),

    #[error("Fallback table has no entry for '{0}'")]
    MissingFallback(String),

    #[error("Permission table source failed: {0}")]
    Source(#[source] anyhow::Error),

    #[error("Checker for '{key}' failed: {source}")]
    Checker {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No active permissioner scope")]
    NoActiveScope,
}

/// Errors raised while loading or validating models and tables at setup time.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Duplicate condition '{condition}' on '{key}'")]
    DuplicateCondition { key: String, condition: String },

    #[error("'{0}' is declared in the model but missing from the table")]
    MissingAction(String),

    #[error("'{0}' is not declared in the model")]
    UnknownAction(String),

    #[error("Condition '{condition}' of '{key}' is missing from the fallback table")]
    MissingCondition { key: String, condition: String },

    #[error("Condition '{condition}' of '{key}' is not declared in the model")]
    UnknownCondition { key: String, condition: String },

    #[error("Fallback entry for '{0}' grants access")]
    NotConservative(String),
}
