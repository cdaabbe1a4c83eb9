//! Identity types for domains, actions, resources, roles, and permissions
//!
//! These are plain values with structural equality: two descriptors naming
//! the same (domain, id) pair are the same thing no matter where they were
//! constructed. Nothing here has a lifecycle beyond being declared at
//! bootstrap.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named business area partitioning actions, resources, and roles
///
/// Identity is the name string.
///
/// # Example
///
/// ```
/// use warden_core::Domain;
///
/// let projects = Domain::new("project");
/// assert_eq!(projects.name(), "project");
/// assert_eq!(projects, Domain::new("project"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Domain(String);

impl Domain {
    /// Create a domain from its name
    pub fn new(name: impl Into<String>) -> Self {
        Domain(name.into())
    }

    /// The domain name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A verb scoped to a domain (e.g. "update" in the "project" domain)
///
/// Registered once per (domain, id) pair; the engine's action registry
/// rejects a second registration of the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    domain: Domain,
    id: String,
}

impl Action {
    /// Create an action descriptor
    pub fn new(domain: Domain, id: impl Into<String>) -> Self {
        Self {
            domain,
            id: id.into(),
        }
    }

    /// The owning domain
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The action identifier within its domain
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.id)
    }
}

/// A noun scoped to a domain (e.g. the "project" resource)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType {
    domain: Domain,
    name: String,
}

impl ResourceType {
    /// Create a resource type descriptor
    pub fn new(domain: Domain, name: impl Into<String>) -> Self {
        Self {
            domain,
            name: name.into(),
        }
    }

    /// The owning domain
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The type name within its domain
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.name)
    }
}

/// A named grouping of permissions, optionally scoped to a domain
///
/// A role with no domain is a *system role* that applies across all
/// domains. A domain-scoped role is only meaningful within that domain's
/// context and is typically computed per request by a domain role provider
/// rather than assigned statically.
///
/// Roles support multi-parent inheritance through the engine's role
/// hierarchy; a role holds every permission configured for any of its
/// transitive ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role {
    domain: Option<Domain>,
    id: String,
}

impl Role {
    /// Create a system role, applicable across all domains
    pub fn system(id: impl Into<String>) -> Self {
        Self {
            domain: None,
            id: id.into(),
        }
    }

    /// Create a role scoped to one domain
    pub fn scoped(domain: Domain, id: impl Into<String>) -> Self {
        Self {
            domain: Some(domain),
            id: id.into(),
        }
    }

    /// The owning domain, or `None` for system roles
    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    /// The role identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this is a system role
    pub fn is_system(&self) -> bool {
        self.domain.is_none()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{}:{}", domain, self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// An (action, resource type) pair: "doing X to a Y"
///
/// Equality is structural on both components. Multiple instances of the
/// same descriptors may be constructed independently and still compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    action: Action,
    resource: ResourceType,
}

impl Permission {
    /// Create a permission from its components
    pub fn new(action: Action, resource: ResourceType) -> Self {
        Self { action, resource }
    }

    /// The action component
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The resource type component
    pub fn resource(&self) -> &ResourceType {
        &self.resource
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.action, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_identity() {
        assert_eq!(Domain::new("project"), Domain::new("project"));
        assert_ne!(Domain::new("project"), Domain::new("team"));
    }

    #[test]
    fn test_permission_structural_equality() {
        // Independently constructed descriptors must still compare equal.
        let a = Permission::new(
            Action::new(Domain::new("project"), "update"),
            ResourceType::new(Domain::new("project"), "project"),
        );
        let b = Permission::new(
            Action::new(Domain::new("project"), "update"),
            ResourceType::new(Domain::new("project"), "project"),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_permission_differs_by_component() {
        let domain = Domain::new("project");
        let update = Action::new(domain.clone(), "update");
        let view = Action::new(domain.clone(), "view");
        let project = ResourceType::new(domain, "project");

        let a = Permission::new(update, project.clone());
        let b = Permission::new(view, project);
        assert_ne!(a, b);
    }

    #[test]
    fn test_system_and_scoped_roles() {
        let admin = Role::system("admin");
        assert!(admin.is_system());
        assert!(admin.domain().is_none());
        assert_eq!(admin.to_string(), "admin");

        let leader = Role::scoped(Domain::new("project"), "leader");
        assert!(!leader.is_system());
        assert_eq!(leader.to_string(), "project:leader");

        // Same id with and without a domain is two different roles.
        assert_ne!(Role::system("leader"), Role::scoped(Domain::new("project"), "leader"));
    }

    #[test]
    fn test_display_formats() {
        let domain = Domain::new("team");
        assert_eq!(Action::new(domain.clone(), "join").to_string(), "team:join");
        assert_eq!(ResourceType::new(domain.clone(), "team").to_string(), "team:team");

        let permission = Permission::new(
            Action::new(domain.clone(), "join"),
            ResourceType::new(domain, "team"),
        );
        assert_eq!(permission.to_string(), "team:join on team:team");
    }

    #[test]
    fn test_role_serde_round_trip() {
        let scoped = Role::scoped(Domain::new("project"), "leader");
        let json = serde_json::to_string(&scoped).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(scoped, back);

        let system = Role::system("admin");
        let json = serde_json::to_string(&system).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(system, back);
    }
}
