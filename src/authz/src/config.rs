//! Permission configuration
//!
//! [`PermissionStore`] is the flat lookup table the evaluator reads:
//! per role, an ordered list of (permission, rule) entries. It can be
//! populated directly with [`PermissionStore::add_permission`], or in
//! bulk from a [`PermissionsDef`], the declarative per-domain form that
//! cross-product-expands grants, attaches rules by (role, action,
//! resource) key, and validates everything against the identifier
//! registries before the store is touched.

use crate::error::{AuthzError, Result};
use crate::registry::{ActionRegistry, ResourceRegistry};
use crate::rule::PermissionRule;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use warden_core::{Action, Domain, Permission, ResourceType, Role};

/// One configured grant: a permission guarded by a rule
#[derive(Debug, Clone)]
pub struct PermissionConfig {
    permission: Permission,
    rule: PermissionRule,
}

impl PermissionConfig {
    pub fn new(action: Action, resource: ResourceType, rule: PermissionRule) -> Self {
        Self {
            permission: Permission::new(action, resource),
            rule,
        }
    }

    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    pub fn action(&self) -> &Action {
        self.permission.action()
    }

    pub fn resource_type(&self) -> &ResourceType {
        self.permission.resource()
    }

    pub fn rule(&self) -> &PermissionRule {
        &self.rule
    }
}

/// Role-indexed table of configured grants
///
/// Entries for a role keep insertion order and are not deduplicated;
/// the evaluator uses the first entry matching the requested action and
/// resource type, so earlier entries shadow later ones with the same
/// permission.
#[derive(Debug)]
pub struct PermissionStore {
    permissions: HashMap<Role, Vec<PermissionConfig>>,
}

impl PermissionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            permissions: HashMap::new(),
        }
    }

    /// Append a grant for `role`
    pub fn add_permission(
        &mut self,
        role: Role,
        action: Action,
        resource: ResourceType,
        rule: PermissionRule,
    ) {
        debug!(
            "configuring {} on {} for role {}",
            action, resource, role
        );
        self.permissions
            .entry(role)
            .or_default()
            .push(PermissionConfig::new(action, resource, rule));
    }

    /// All grants configured for `role`, in insertion order
    ///
    /// A role with no grants yields an empty slice.
    pub fn permissions_for(&self, role: &Role) -> &[PermissionConfig] {
        self.permissions
            .get(role)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of roles with at least one grant
    pub fn role_count(&self) -> usize {
        self.permissions.len()
    }

    /// Total number of configured grants
    pub fn config_count(&self) -> usize {
        self.permissions.values().map(Vec::len).sum()
    }
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A role granted a set of actions on a set of resource types
///
/// Action ids and resource names are unqualified; they are resolved
/// against the owning definition's domain when the definition is
/// applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantDef {
    role: Role,
    actions: Vec<String>,
    resources: Vec<String>,
}

impl GrantDef {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            actions: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Add one action id to the grant
    pub fn action(mut self, id: impl Into<String>) -> Self {
        self.actions.push(id.into());
        self
    }

    /// Add several action ids to the grant
    pub fn actions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add one resource type name to the grant
    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.resources.push(name.into());
        self
    }

    /// Add several resource type names to the grant
    pub fn resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

/// A rule attached to one (role, action, resource) combination
#[derive(Clone)]
struct RuleBinding {
    role: Role,
    action: String,
    resource: String,
    rule: PermissionRule,
}

/// Declarative permission configuration for one domain
///
/// Built once at startup and applied to a [`PermissionStore`]. Grants
/// expand to the cross product of their actions and resources; each
/// expanded combination picks up the rule bound to its (role, action,
/// resource) key, or an allow-all rule when none is bound.
#[derive(Clone)]
pub struct PermissionsDef {
    domain: Domain,
    grants: Vec<GrantDef>,
    rules: Vec<RuleBinding>,
}

impl PermissionsDef {
    /// Start building a definition for `domain`
    pub fn builder(domain: Domain) -> PermissionsDefBuilder {
        PermissionsDefBuilder {
            def: PermissionsDef {
                domain,
                grants: Vec::new(),
                rules: Vec::new(),
            },
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    /// Expand the definition into `store`
    ///
    /// Validation runs first and the store is only written once the
    /// whole definition has passed, so a failed apply leaves the store
    /// exactly as it was. A grant combination with no bound rule is
    /// allowed unconditionally and logged at `warn`, since a silent
    /// default here has historically hidden typos in rule keys.
    ///
    /// # Errors
    ///
    /// - [`AuthzError::DuplicateRule`] when two rules share a key
    /// - [`AuthzError::NotFound`] when a grant names an action or
    ///   resource the registries do not know
    /// - [`AuthzError::DanglingRule`] when a rule's key matches no
    ///   grant combination
    pub fn apply(
        &self,
        store: &mut PermissionStore,
        actions: &ActionRegistry,
        resources: &ResourceRegistry,
    ) -> Result<()> {
        // Step 1: index rules by key, rejecting duplicates.
        let mut rule_index: HashMap<(&Role, &str, &str), &PermissionRule> = HashMap::new();
        for binding in &self.rules {
            let key = (&binding.role, binding.action.as_str(), binding.resource.as_str());
            if rule_index.insert(key, &binding.rule).is_some() {
                return Err(AuthzError::DuplicateRule {
                    role: binding.role.to_string(),
                    action: binding.action.clone(),
                    resource: binding.resource.clone(),
                });
            }
        }

        // Step 2: expand grants, resolving identifiers against this
        // definition's domain and attaching rules by key.
        let mut staged: Vec<(Role, Action, ResourceType, PermissionRule)> = Vec::new();
        let mut consumed: HashSet<(&Role, &str, &str)> = HashSet::new();
        for grant in &self.grants {
            for action_id in &grant.actions {
                let action = actions.get(&self.domain, action_id)?;
                for resource_name in &grant.resources {
                    let resource = resources.get(&self.domain, resource_name)?;
                    let key = (&grant.role, action_id.as_str(), resource_name.as_str());
                    let rule = match rule_index.get(&key) {
                        Some(rule) => {
                            consumed.insert(key);
                            (*rule).clone()
                        }
                        None => {
                            warn!(
                                "no rule for ({}, {}, {}) in domain {}, defaulting to allow-all",
                                grant.role, action_id, resource_name, self.domain
                            );
                            PermissionRule::allow_all()
                        }
                    };
                    staged.push((grant.role.clone(), action.clone(), resource.clone(), rule));
                }
            }
        }

        // Step 3: every rule must have guarded at least one combination.
        for binding in &self.rules {
            let key = (&binding.role, binding.action.as_str(), binding.resource.as_str());
            if !consumed.contains(&key) {
                return Err(AuthzError::DanglingRule {
                    role: binding.role.to_string(),
                    action: binding.action.clone(),
                    resource: binding.resource.clone(),
                });
            }
        }

        // Step 4: commit.
        for (role, action, resource, rule) in staged {
            store.add_permission(role, action, resource, rule);
        }
        Ok(())
    }
}

/// Builder for [`PermissionsDef`]
pub struct PermissionsDefBuilder {
    def: PermissionsDef,
}

impl PermissionsDefBuilder {
    /// Add a grant
    pub fn grant(mut self, grant: GrantDef) -> Self {
        self.def.grants.push(grant);
        self
    }

    /// Bind a rule to one (role, action, resource) combination
    pub fn rule(
        mut self,
        role: Role,
        action: impl Into<String>,
        resource: impl Into<String>,
        rule: PermissionRule,
    ) -> Self {
        self.def.rules.push(RuleBinding {
            role,
            action: action.into(),
            resource: resource.into(),
            rule,
        });
        self
    }

    pub fn build(self) -> PermissionsDef {
        self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{AuthUserInfo, Context, UserId};

    fn registries() -> (Domain, ActionRegistry, ResourceRegistry) {
        let domain = Domain::new("library");
        let mut actions = ActionRegistry::default();
        actions.register(Action::new(domain.clone(), "read")).unwrap();
        actions.register(Action::new(domain.clone(), "edit")).unwrap();
        let mut resources = ResourceRegistry::default();
        resources
            .register(ResourceType::new(domain.clone(), "book"))
            .unwrap();
        resources
            .register(ResourceType::new(domain.clone(), "shelf"))
            .unwrap();
        (domain, actions, resources)
    }

    fn evaluate_first(store: &PermissionStore, role: &Role, action: &Action, resource: &ResourceType) -> Option<bool> {
        let user = AuthUserInfo::new(UserId(1));
        let context = Context::new();
        let req = crate::rule::AccessRequest {
            user: &user,
            action,
            resource_type: resource,
            resource_id: None,
            context: &context,
        };
        store
            .permissions_for(role)
            .iter()
            .find(|c| c.action() == action && c.resource_type() == resource)
            .map(|c| c.rule().evaluate(&req))
    }

    #[test]
    fn test_store_append_and_lookup() {
        let (domain, _, _) = registries();
        let mut store = PermissionStore::new();
        let role = Role::system("librarian");
        store.add_permission(
            role.clone(),
            Action::new(domain.clone(), "read"),
            ResourceType::new(domain.clone(), "book"),
            PermissionRule::allow_all(),
        );

        assert_eq!(store.permissions_for(&role).len(), 1);
        assert_eq!(store.role_count(), 1);
        assert_eq!(store.config_count(), 1);
        assert!(store.permissions_for(&Role::system("other")).is_empty());
    }

    #[test]
    fn test_first_matching_entry_shadows_later_ones() {
        let (domain, _, _) = registries();
        let mut store = PermissionStore::new();
        let role = Role::system("librarian");
        let action = Action::new(domain.clone(), "edit");
        let resource = ResourceType::new(domain.clone(), "book");

        store.add_permission(
            role.clone(),
            action.clone(),
            resource.clone(),
            PermissionRule::new().condition(|_| Ok(false)),
        );
        store.add_permission(
            role.clone(),
            action.clone(),
            resource.clone(),
            PermissionRule::allow_all(),
        );

        // Both entries exist, but lookups resolve to the first.
        assert_eq!(store.permissions_for(&role).len(), 2);
        assert_eq!(evaluate_first(&store, &role, &action, &resource), Some(false));
    }

    #[test]
    fn test_apply_expands_cross_product() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain)
            .grant(
                GrantDef::new(role.clone())
                    .actions(["read", "edit"])
                    .resources(["book", "shelf"]),
            )
            .build();

        let mut store = PermissionStore::new();
        def.apply(&mut store, &actions, &resources).unwrap();

        assert_eq!(store.config_count(), 4);
        assert_eq!(store.permissions_for(&role).len(), 4);
    }

    #[test]
    fn test_apply_attaches_bound_rule() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain.clone())
            .grant(GrantDef::new(role.clone()).action("edit").resource("book"))
            .rule(
                role.clone(),
                "edit",
                "book",
                PermissionRule::new().condition(|_| Ok(false)),
            )
            .build();

        let mut store = PermissionStore::new();
        def.apply(&mut store, &actions, &resources).unwrap();

        let action = Action::new(domain.clone(), "edit");
        let resource = ResourceType::new(domain, "book");
        assert_eq!(evaluate_first(&store, &role, &action, &resource), Some(false));
    }

    #[test]
    fn test_apply_defaults_to_allow_all() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain.clone())
            .grant(GrantDef::new(role.clone()).action("read").resource("book"))
            .build();

        let mut store = PermissionStore::new();
        def.apply(&mut store, &actions, &resources).unwrap();

        let action = Action::new(domain.clone(), "read");
        let resource = ResourceType::new(domain, "book");
        assert_eq!(evaluate_first(&store, &role, &action, &resource), Some(true));
    }

    #[test]
    fn test_apply_rejects_duplicate_rule_key() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain)
            .grant(GrantDef::new(role.clone()).action("edit").resource("book"))
            .rule(role.clone(), "edit", "book", PermissionRule::allow_all())
            .rule(role.clone(), "edit", "book", PermissionRule::allow_all())
            .build();

        let mut store = PermissionStore::new();
        let err = def.apply(&mut store, &actions, &resources).unwrap_err();
        assert!(matches!(err, AuthzError::DuplicateRule { .. }));
        assert_eq!(store.config_count(), 0);
    }

    #[test]
    fn test_apply_rejects_dangling_rule() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain)
            .grant(GrantDef::new(role.clone()).action("read").resource("book"))
            .rule(role.clone(), "edit", "book", PermissionRule::allow_all())
            .build();

        let mut store = PermissionStore::new();
        let err = def.apply(&mut store, &actions, &resources).unwrap_err();
        assert_eq!(
            err,
            AuthzError::DanglingRule {
                role: "librarian".to_string(),
                action: "edit".to_string(),
                resource: "book".to_string(),
            }
        );

        // The valid grant must not have been committed either.
        assert_eq!(store.config_count(), 0);
    }

    #[test]
    fn test_apply_rejects_unknown_action() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain)
            .grant(GrantDef::new(role).action("publish").resource("book"))
            .build();

        let mut store = PermissionStore::new();
        let err = def.apply(&mut store, &actions, &resources).unwrap_err();
        assert!(matches!(err, AuthzError::NotFound(_)));
        assert_eq!(store.config_count(), 0);
    }

    #[test]
    fn test_apply_rejects_unknown_resource() {
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain)
            .grant(GrantDef::new(role).action("read").resource("basement"))
            .build();

        let mut store = PermissionStore::new();
        let err = def.apply(&mut store, &actions, &resources).unwrap_err();
        assert!(matches!(err, AuthzError::NotFound(_)));
        assert_eq!(store.config_count(), 0);
    }

    #[test]
    fn test_rule_shared_by_repeated_grant() {
        // The same combination appearing in two grants binds the same
        // rule twice rather than tripping the dangling check.
        let (domain, actions, resources) = registries();
        let role = Role::system("librarian");
        let def = PermissionsDef::builder(domain)
            .grant(GrantDef::new(role.clone()).action("edit").resource("book"))
            .grant(GrantDef::new(role.clone()).action("edit").resource("book"))
            .rule(role.clone(), "edit", "book", PermissionRule::allow_all())
            .build();

        let mut store = PermissionStore::new();
        def.apply(&mut store, &actions, &resources).unwrap();
        assert_eq!(store.config_count(), 2);
    }

    #[test]
    fn test_grant_def_serializes() {
        let grant = GrantDef::new(Role::system("librarian"))
            .action("read")
            .resource("book");
        let json = serde_json::to_string(&grant).unwrap();
        let back: GrantDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role(), &Role::system("librarian"));
        assert_eq!(back.actions, vec!["read"]);
        assert_eq!(back.resources, vec!["book"]);
    }
}
