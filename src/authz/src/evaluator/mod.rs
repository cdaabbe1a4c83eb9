//! Permission evaluation
//!
//! The evaluator answers "may this user exercise this permission" from
//! three inputs fixed at startup: the role hierarchy, the permission
//! store, and the domain role providers. Assigned roles are consulted
//! first, most specific first, with each role's ancestors behind it;
//! the first satisfied grant wins. Only when no assigned role yields a
//! grant are the permission's domain roles computed and given the same
//! treatment. Anything else is a deny.

pub mod decision;


pub use decision::{Decision, DecisionReason};

use crate::config::PermissionStore;
use crate::hierarchy::RoleHierarchy;
use crate::provider::DomainRoleProviderRegistry;
use crate::rule::AccessRequest;
use tracing::{debug, info};
use warden_core::{AuthUserInfo, Context, Permission, ResourceId, Role};

/// Decides permission checks against fixed configuration
pub struct PermissionEvaluator {
    hierarchy: RoleHierarchy,
    store: PermissionStore,
    domain_roles: DomainRoleProviderRegistry,
}

impl PermissionEvaluator {
    pub fn new(
        hierarchy: RoleHierarchy,
        store: PermissionStore,
        domain_roles: DomainRoleProviderRegistry,
    ) -> Self {
        Self {
            hierarchy,
            store,
            domain_roles,
        }
    }

    /// Whether `user` may exercise `permission`
    ///
    /// Shorthand for [`decide`] when only the verdict matters.
    ///
    /// [`decide`]: Self::decide
    pub fn evaluate(
        &self,
        user: &AuthUserInfo,
        permission: &Permission,
        resource_id: Option<ResourceId>,
        context: &Context,
    ) -> bool {
        self.decide(user, permission, resource_id, context).allowed
    }

    /// Evaluate one check and report the full decision
    ///
    /// Roles are tried most specific first: descending transitive
    /// ancestor count, ties broken by role ordering so repeated checks
    /// report the same reason. A role whose own grant is missing or
    /// unsatisfied falls through to its ancestors before the next role
    /// is tried. When neither assigned nor domain roles produce a
    /// satisfied grant the check denies.
    pub fn decide(
        &self,
        user: &AuthUserInfo,
        permission: &Permission,
        resource_id: Option<ResourceId>,
        context: &Context,
    ) -> Decision {
        let req = AccessRequest {
            user,
            action: permission.action(),
            resource_type: permission.resource(),
            resource_id,
            context,
        };
        debug!("evaluating {} for user {}", permission, user.user_id);

        // Step 1: statically assigned roles.
        let assigned: Vec<Role> = user.roles.iter().cloned().collect();
        if let Some((role, via)) = self.first_grant(assigned, &req) {
            info!(
                "user {} allowed {} via assigned role {}",
                user.user_id, permission, role
            );
            return Decision::allow(DecisionReason::GrantedBy { role, via });
        }

        // Step 2: dynamically computed domain roles.
        if let Some(provider) = self.domain_roles.get(permission.action().domain()) {
            let dynamic: Vec<Role> = provider.roles(user.user_id, context).into_iter().collect();
            debug!(
                "domain {} provider returned {} roles for user {}",
                permission.action().domain(),
                dynamic.len(),
                user.user_id
            );
            if let Some((role, via)) = self.first_grant(dynamic, &req) {
                info!(
                    "user {} allowed {} via domain role {}",
                    user.user_id, permission, role
                );
                return Decision::allow(DecisionReason::DomainRoleGrant { role, via });
            }
        }

        // Step 3: nothing matched.
        debug!(
            "denying {} for user {}: no applicable configuration",
            permission, user.user_id
        );
        Decision::deny(DecisionReason::NoApplicableConfig)
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    pub fn store(&self) -> &PermissionStore {
        &self.store
    }

    pub fn domain_roles(&self) -> &DomainRoleProviderRegistry {
        &self.domain_roles
    }

    // Private helper methods

    /// The first (role, inherited-via) pair whose grant is satisfied
    fn first_grant(&self, roles: Vec<Role>, req: &AccessRequest<'_>) -> Option<(Role, Option<Role>)> {
        for role in self.most_specific_first(roles) {
            if self.check_permission(&role, req) {
                return Some((role, None));
            }
            let ancestors: Vec<Role> = self.hierarchy.all_ancestors(&role).into_iter().collect();
            for ancestor in self.most_specific_first(ancestors) {
                if self.check_permission(&ancestor, req) {
                    return Some((role, Some(ancestor)));
                }
            }
        }
        None
    }

    /// Order roles by descending ancestor count, then by role ordering
    ///
    /// A role is always more specific than any of its ancestors, since
    /// its ancestor set strictly contains theirs.
    fn most_specific_first(&self, mut roles: Vec<Role>) -> Vec<Role> {
        roles.sort_by(|a, b| {
            self.hierarchy
                .ancestor_count(b)
                .cmp(&self.hierarchy.ancestor_count(a))
                .then_with(|| a.cmp(b))
        });
        roles
    }

    /// Whether `role` itself carries a satisfied grant for the request
    fn check_permission(&self, role: &Role, req: &AccessRequest<'_>) -> bool {
        let config = self
            .store
            .permissions_for(role)
            .iter()
            .find(|c| c.action() == req.action && c.resource_type() == req.resource_type);
        match config {
            Some(config) => config.rule().evaluate(req),
            None => false,
        }
    }
}
