//! Condition rule engine
//!
//! A [`PermissionRule`] is an ordered AND chain of conditions, each of
//! which is either a single predicate or an OR group of predicates.
//! Evaluation short-circuits on the first failing condition, and a
//! predicate that returns an error is logged and treated as not
//! satisfied, so evaluation fails closed rather than propagating.

use crate::error::ConditionError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_core::{keys, Action, AuthUserInfo, Context, ResourceId, ResourceType};

/// Everything a predicate may inspect for one authorization check
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub user: &'a AuthUserInfo,
    pub action: &'a Action,
    pub resource_type: &'a ResourceType,
    /// Absent for collection-level checks such as list or create
    pub resource_id: Option<ResourceId>,
    pub context: &'a Context,
}

/// A single condition over an [`AccessRequest`]
///
/// Predicates return `Err` to signal that the condition could not be
/// decided; the rule engine logs the error and treats the condition as
/// unsatisfied.
pub type Predicate =
    Arc<dyn Fn(&AccessRequest<'_>) -> std::result::Result<bool, ConditionError> + Send + Sync>;

/// Wrap a closure as a [`Predicate`]
pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&AccessRequest<'_>) -> std::result::Result<bool, ConditionError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

enum ConditionKind {
    /// Must hold on its own
    Single(Predicate),
    /// At least one member must hold
    AnyOf(Vec<Predicate>),
}

struct ConditionEntry {
    name: Option<String>,
    kind: ConditionKind,
}

impl ConditionEntry {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl Clone for ConditionEntry {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: match &self.kind {
                ConditionKind::Single(p) => ConditionKind::Single(Arc::clone(p)),
                ConditionKind::AnyOf(ps) => {
                    ConditionKind::AnyOf(ps.iter().map(Arc::clone).collect())
                }
            },
        }
    }
}

/// An AND chain of conditions guarding one (role, action, resource) grant
///
/// An empty rule always passes, so a grant with no conditions is an
/// unconditional allow for permission checks against that grant.
#[derive(Clone, Default)]
pub struct PermissionRule {
    name: Option<String>,
    entries: Vec<ConditionEntry>,
}

impl PermissionRule {
    /// Create an empty rule that passes every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty rule carrying a diagnostic name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            entries: Vec::new(),
        }
    }

    /// The canonical unconditional rule
    pub fn allow_all() -> Self {
        Self::named("allow_all")
    }

    /// Append a single condition that must hold
    pub fn condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&AccessRequest<'_>) -> std::result::Result<bool, ConditionError>
            + Send
            + Sync
            + 'static,
    {
        self.entries.push(ConditionEntry {
            name: None,
            kind: ConditionKind::Single(predicate(f)),
        });
        self
    }

    /// Append a named single condition
    pub fn named_condition<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&AccessRequest<'_>) -> std::result::Result<bool, ConditionError>
            + Send
            + Sync
            + 'static,
    {
        self.entries.push(ConditionEntry {
            name: Some(name.into()),
            kind: ConditionKind::Single(predicate(f)),
        });
        self
    }

    /// Append an OR group: the condition holds if any member holds
    pub fn or_group(self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.push_or_group(None, predicates.into_iter().collect())
    }

    /// Append a named OR group
    pub fn named_or_group(
        self,
        name: impl Into<String>,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> Self {
        self.push_or_group(Some(name.into()), predicates.into_iter().collect())
    }

    /// Append the built-in ownership condition
    ///
    /// Satisfied when the request names a concrete resource, the context
    /// carries an owner provider under [`keys::OWNER_ID_PROVIDER`], and the
    /// provider resolves the resource to the requesting user. A request
    /// without a resource id is simply not satisfied; a missing provider is
    /// reported as an error so the failure is visible in the logs.
    pub fn owner_only(self) -> Self {
        self.named_condition("owner_only", |req| {
            let resource_id = match req.resource_id {
                Some(id) => id,
                None => return Ok(false),
            };
            let provider = req
                .context
                .owner_provider(keys::OWNER_ID_PROVIDER)
                .ok_or_else(|| {
                    ConditionError::missing_context(keys::OWNER_ID_PROVIDER)
                })?;
            Ok(provider(resource_id) == Some(req.user.user_id))
        })
    }

    /// Evaluate the chain against one request
    ///
    /// Conditions are checked in insertion order and the first unsatisfied
    /// one ends evaluation. Predicate errors are logged at `warn` and
    /// count as unsatisfied for the predicate that raised them, which
    /// fails a single condition outright and only that branch of an OR
    /// group.
    pub fn evaluate(&self, req: &AccessRequest<'_>) -> bool {
        for entry in &self.entries {
            match &entry.kind {
                ConditionKind::Single(predicate) => match predicate(req) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(
                            "rule {}: condition {} not satisfied for user {}",
                            self.label(),
                            entry.label(),
                            req.user.user_id
                        );
                        return false;
                    }
                    Err(e) => {
                        warn!(
                            "rule {}: condition {} failed for user {}: {}",
                            self.label(),
                            entry.label(),
                            req.user.user_id,
                            e
                        );
                        return false;
                    }
                },
                ConditionKind::AnyOf(predicates) => {
                    // Empty groups were flagged when built; skip them here.
                    if predicates.is_empty() {
                        continue;
                    }
                    let mut satisfied = false;
                    for predicate in predicates {
                        match predicate(req) {
                            Ok(true) => {
                                satisfied = true;
                                break;
                            }
                            Ok(false) => {}
                            Err(e) => {
                                warn!(
                                    "rule {}: branch of group {} failed for user {}: {}",
                                    self.label(),
                                    entry.label(),
                                    req.user.user_id,
                                    e
                                );
                            }
                        }
                    }
                    if !satisfied {
                        debug!(
                            "rule {}: no branch of group {} satisfied for user {}",
                            self.label(),
                            entry.label(),
                            req.user.user_id
                        );
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Number of conditions in the chain
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the rule is the unconditional allow
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostic name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    // Private helper methods

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<rule>")
    }

    fn push_or_group(mut self, name: Option<String>, predicates: Vec<Predicate>) -> Self {
        match predicates.len() {
            0 => warn!(
                "rule {}: OR group {} has no predicates and will be skipped",
                self.label(),
                name.as_deref().unwrap_or("<unnamed>")
            ),
            1 => warn!(
                "rule {}: OR group {} has a single predicate; prefer condition()",
                self.label(),
                name.as_deref().unwrap_or("<unnamed>")
            ),
            _ => {}
        }
        self.entries.push(ConditionEntry {
            name,
            kind: ConditionKind::AnyOf(predicates),
        });
        self
    }
}

impl fmt::Debug for PermissionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions: Vec<&str> = self.entries.iter().map(ConditionEntry::label).collect();
        f.debug_struct("PermissionRule")
            .field("name", &self.name)
            .field("conditions", &conditions)
            .finish()
    }
}
