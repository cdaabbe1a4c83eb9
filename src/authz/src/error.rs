//! Error types for the authorization engine
//!
//! Two failure families with very different lives: [`AuthzError`] covers
//! configuration mistakes raised while the engine is assembled, and must
//! abort startup. [`ConditionError`] is what a rule predicate returns when
//! it cannot answer; the rule engine catches it, logs it, and fails the
//! condition closed. Neither ever propagates out of an evaluation.

use thiserror::Error;

/// Convenience alias for engine results
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Configuration-time errors
///
/// All variants indicate programmer or configuration mistakes detected
/// during bootstrap. None of them can occur once the engine is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// A descriptor or provider under the same key was already registered
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// Nothing is registered under the requested (domain, id) pair
    #[error("Not found: {0}")]
    NotFound(String),

    /// A role cannot be its own parent
    #[error("Self-inheritance rejected for role: {0}")]
    SelfInheritance(String),

    /// The edge would make a role its own ancestor
    #[error("Inheritance cycle: {parent} -> {child} would make {child} its own ancestor")]
    InheritanceCycle {
        /// The would-be parent role
        parent: String,
        /// The would-be child role
        child: String,
    },

    /// Two rules bound to the same (role, action, resource) key
    #[error("Duplicate rule for ({role}, {action}, {resource})")]
    DuplicateRule {
        /// Role component of the key
        role: String,
        /// Action id component of the key
        action: String,
        /// Resource name component of the key
        resource: String,
    },

    /// A rule bound to a (role, action, resource) key no grant covers
    #[error("Rule for ({role}, {action}, {resource}) matches no declared grant")]
    DanglingRule {
        /// Role component of the key
        role: String,
        /// Action id component of the key
        action: String,
        /// Resource name component of the key
        resource: String,
    },
}

/// Failure raised by a condition predicate
///
/// Returning `Err` from a predicate is the "condition threw" case. The
/// rule engine treats it as a failing condition: logged, fail-closed,
/// never a grant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// A context key the predicate needs is absent
    #[error("Missing context key: {0}")]
    MissingContext(String),

    /// The context value under a key has the wrong type
    #[error("Context key {key} does not hold a {expected}")]
    WrongType {
        /// The context key that was read
        key: String,
        /// What the predicate expected to find there
        expected: &'static str,
    },

    /// Any other predicate failure
    #[error("Condition failed: {0}")]
    Failed(String),
}

impl ConditionError {
    /// Create a `MissingContext` error
    pub fn missing_context(key: impl Into<String>) -> Self {
        ConditionError::MissingContext(key.into())
    }

    /// Create a `Failed` error
    pub fn failed(msg: impl Into<String>) -> Self {
        ConditionError::Failed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthzError::DuplicateRegistration("project:update".to_string());
        assert_eq!(err.to_string(), "Duplicate registration: project:update");

        let err = AuthzError::InheritanceCycle {
            parent: "editor".to_string(),
            child: "admin".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Inheritance cycle: editor -> admin would make admin its own ancestor"
        );
    }

    #[test]
    fn test_condition_error_construction() {
        let err = ConditionError::missing_context("owner_id_provider");
        assert!(matches!(err, ConditionError::MissingContext(_)));
        assert_eq!(err.to_string(), "Missing context key: owner_id_provider");

        let err = ConditionError::failed("ledger unavailable");
        assert_eq!(err.to_string(), "Condition failed: ledger unavailable");
    }
}
