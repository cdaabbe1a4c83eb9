//! Caller identity types supplied by the authentication layer

use crate::types::ident::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Numeric user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub i64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated caller: identity plus statically-assigned roles
///
/// Built by the authentication layer and handed to the evaluator.
/// Dynamically-computed domain roles never appear in `roles`; those are
/// resolved per request by a domain role provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUserInfo {
    /// The caller's identity
    pub user_id: UserId,

    /// Statically-assigned roles
    pub roles: HashSet<Role>,
}

impl AuthUserInfo {
    /// Create a user with no roles
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: HashSet::new(),
        }
    }

    /// Add a statically-assigned role (chainable)
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Whether the user holds `role` statically
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
