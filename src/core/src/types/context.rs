//! Per-request context: an open-ended bag of typed facts
//!
//! A context is built by a context provider right before an authorization
//! check and discarded afterwards. It carries scalar facts (ids, flags,
//! JSON blobs) and closures that answer the questions rule conditions and
//! domain role providers ask ("who owns resource 42", "is user 7 on this
//! team"). Closures must be side-effect-free and pre-resolved: anything
//! that needs I/O captures its answer, or a cheap synchronous handle,
//! before the check starts.

use crate::types::principal::{ResourceId, UserId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Well-known context keys
pub mod keys {
    /// Maps a resource id to its owner; consumed by the built-in
    /// ownership condition.
    pub const OWNER_ID_PROVIDER: &str = "owner_id_provider";

    /// Name of the resource type the current check targets.
    pub const RESOURCE_TYPE: &str = "resource_type";

    /// Owner of the targeted resource, when the context provider already
    /// resolved it.
    pub const RESOURCE_OWNER: &str = "resource_owner";
}

/// Resolves the owner of a resource
pub type OwnerProviderFn = Arc<dyn Fn(ResourceId) -> Option<UserId> + Send + Sync>;

/// Answers a yes/no question about a user (e.g. team membership)
pub type UserPredicateFn = Arc<dyn Fn(UserId) -> bool + Send + Sync>;

/// One typed fact in a [`Context`]
#[derive(Clone)]
pub enum ContextValue {
    /// Boolean fact
    Bool(bool),
    /// Integer fact
    Int(i64),
    /// String fact
    Str(String),
    /// Structured fact
    Json(serde_json::Value),
    /// Closure resolving a resource's owner
    OwnerProvider(OwnerProviderFn),
    /// Closure answering a per-user question
    UserPredicate(UserPredicateFn),
}

impl ContextValue {
    /// Wrap an owner-resolving closure
    pub fn owner_provider<F>(f: F) -> Self
    where
        F: Fn(ResourceId) -> Option<UserId> + Send + Sync + 'static,
    {
        ContextValue::OwnerProvider(Arc::new(f))
    }

    /// Wrap a per-user predicate closure
    pub fn user_predicate<F>(f: F) -> Self
    where
        F: Fn(UserId) -> bool + Send + Sync + 'static,
    {
        ContextValue::UserPredicate(Arc::new(f))
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            ContextValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            ContextValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            ContextValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            ContextValue::OwnerProvider(_) => f.write_str("OwnerProvider(..)"),
            ContextValue::UserPredicate(_) => f.write_str("UserPredicate(..)"),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Int(v)
    }
}

impl From<i32> for ContextValue {
    fn from(v: i32) -> Self {
        ContextValue::Int(v as i64)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Str(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Str(v)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(v: serde_json::Value) -> Self {
        ContextValue::Json(v)
    }
}

/// String-keyed bag of facts for one authorization check
///
/// # Example
///
/// ```
/// use warden_core::{keys, Context, ContextValue, UserId};
///
/// let ctx = Context::new()
///     .with(keys::RESOURCE_TYPE, "ticket")
///     .with("escalated", true)
///     .with(
///         keys::OWNER_ID_PROVIDER,
///         ContextValue::owner_provider(|_resource| Some(UserId(42))),
///     );
///
/// assert_eq!(ctx.get_str(keys::RESOURCE_TYPE), Some("ticket"));
/// assert_eq!(ctx.get_bool("escalated"), Some(true));
/// assert!(ctx.owner_provider(keys::OWNER_ID_PROVIDER).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, ContextValue>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert a fact, replacing any previous value under the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Chainable insert for building contexts inline
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// The raw value under `key`
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Boolean fact under `key`, if present and of that type
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ContextValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Integer fact under `key`
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(ContextValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// String fact under `key`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ContextValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Structured fact under `key`
    pub fn get_json(&self, key: &str) -> Option<&serde_json::Value> {
        match self.values.get(key) {
            Some(ContextValue::Json(v)) => Some(v),
            _ => None,
        }
    }

    /// Owner-resolving closure under `key`
    pub fn owner_provider(&self, key: &str) -> Option<&OwnerProviderFn> {
        match self.values.get(key) {
            Some(ContextValue::OwnerProvider(f)) => Some(f),
            _ => None,
        }
    }

    /// Per-user predicate closure under `key`
    pub fn user_predicate(&self, key: &str) -> Option<&UserPredicateFn> {
        match self.values.get(key) {
            Some(ContextValue::UserPredicate(f)) => Some(f),
            _ => None,
        }
    }

    /// Whether `key` holds any value
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of facts
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no facts
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
