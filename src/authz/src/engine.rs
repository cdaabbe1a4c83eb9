//! Engine facade
//!
//! [`Engine`] ties the pieces together behind a string-oriented entry
//! point: callers name a domain, an action id, and a resource type name,
//! and the engine resolves them against the registries, asks the
//! domain's context provider for the fact bag, and hands the assembled
//! permission to the evaluator. Everything is wired once through
//! [`EngineBuilder`]; a misconfigured builder refuses to produce an
//! engine at all, while an unknown identifier at check time is a plain
//! deny.

use crate::config::{PermissionStore, PermissionsDef};
use crate::error::Result;
use crate::evaluator::{Decision, DecisionReason, PermissionEvaluator};
use crate::hierarchy::RoleHierarchy;
use crate::provider::{
    ContextProvider, ContextProviderRegistry, DomainRoleProvider, DomainRoleProviderRegistry,
};
use crate::registry::{ActionRegistry, ResourceRegistry};
use crate::rule::PermissionRule;
use std::fmt;
use tracing::{info, warn};
use warden_core::{Action, AuthUserInfo, Context, Domain, Permission, ResourceId, ResourceType, Role};

/// The assembled authorization engine
pub struct Engine {
    actions: ActionRegistry,
    resources: ResourceRegistry,
    contexts: ContextProviderRegistry,
    evaluator: PermissionEvaluator,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("actions", &self.actions)
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Start building an engine
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Whether `user` may perform `action_id` on `resource_name` in `domain`
    ///
    /// Shorthand for [`decide`] when only the verdict matters.
    ///
    /// [`decide`]: Self::decide
    pub fn check(
        &self,
        user: &AuthUserInfo,
        domain: &Domain,
        action_id: &str,
        resource_name: &str,
        resource_id: Option<ResourceId>,
    ) -> bool {
        self.decide(user, domain, action_id, resource_name, resource_id)
            .allowed
    }

    /// Resolve identifiers, assemble context, and evaluate one check
    ///
    /// An action id or resource name the registries do not know denies
    /// with a warning rather than failing; checks must stay total no
    /// matter what strings arrive at the boundary.
    pub fn decide(
        &self,
        user: &AuthUserInfo,
        domain: &Domain,
        action_id: &str,
        resource_name: &str,
        resource_id: Option<ResourceId>,
    ) -> Decision {
        let action = match self.actions.get(domain, action_id) {
            Ok(action) => action,
            Err(e) => {
                warn!("check against unregistered action: {}", e);
                return Decision::deny(DecisionReason::NoApplicableConfig);
            }
        };
        let resource = match self.resources.get(domain, resource_name) {
            Ok(resource) => resource,
            Err(e) => {
                warn!("check against unregistered resource type: {}", e);
                return Decision::deny(DecisionReason::NoApplicableConfig);
            }
        };

        let context = self.context_for(domain, resource_name, resource_id);
        let permission = Permission::new(action.clone(), resource.clone());
        self.evaluator.decide(user, &permission, resource_id, &context)
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    // Private helper methods

    /// Context from the domain's provider, or an empty one
    fn context_for(
        &self,
        domain: &Domain,
        resource_name: &str,
        resource_id: Option<ResourceId>,
    ) -> Context {
        match self.contexts.get(domain) {
            Some(provider) => provider.context(resource_name, resource_id),
            None => Context::new(),
        }
    }
}

/// Accumulates engine configuration and validates it in one shot
///
/// Registration order is preserved; nothing is checked until
/// [`build`], so declarations can arrive in any order.
///
/// [`build`]: Self::build
#[derive(Default)]
pub struct EngineBuilder {
    actions: Vec<Action>,
    resources: Vec<ResourceType>,
    edges: Vec<(Role, Role)>,
    direct: Vec<(Role, Action, ResourceType, PermissionRule)>,
    definitions: Vec<PermissionsDef>,
    role_providers: Vec<(Domain, Box<dyn DomainRoleProvider>)>,
    context_providers: Vec<(Domain, Box<dyn ContextProvider>)>,
}

impl EngineBuilder {
    /// Declare an action
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Declare several actions
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Declare a resource type
    pub fn resource(mut self, resource: ResourceType) -> Self {
        self.resources.push(resource);
        self
    }

    /// Declare several resource types
    pub fn resources(mut self, resources: impl IntoIterator<Item = ResourceType>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Declare `parent` as a direct parent of `child` in the hierarchy
    pub fn edge(mut self, parent: Role, child: Role) -> Self {
        self.edges.push((parent, child));
        self
    }

    /// Configure a single grant directly
    pub fn permission(
        mut self,
        role: Role,
        action: Action,
        resource: ResourceType,
        rule: PermissionRule,
    ) -> Self {
        self.direct.push((role, action, resource, rule));
        self
    }

    /// Add a declarative per-domain definition
    pub fn definition(mut self, def: PermissionsDef) -> Self {
        self.definitions.push(def);
        self
    }

    /// Register the domain role provider for `domain`
    pub fn domain_role_provider(
        mut self,
        domain: Domain,
        provider: impl DomainRoleProvider + 'static,
    ) -> Self {
        self.role_providers.push((domain, Box::new(provider)));
        self
    }

    /// Register the context provider for `domain`
    pub fn context_provider(
        mut self,
        domain: Domain,
        provider: impl ContextProvider + 'static,
    ) -> Self {
        self.context_providers.push((domain, Box::new(provider)));
        self
    }

    /// Validate everything and assemble the engine
    ///
    /// Direct grants are configured before definitions are applied, so
    /// definition-driven entries never shadow explicit ones.
    ///
    /// # Errors
    ///
    /// Any duplicate registration, hierarchy violation, or definition
    /// validation failure aborts the build.
    pub fn build(self) -> Result<Engine> {
        let mut actions = ActionRegistry::default();
        for action in self.actions {
            actions.register(action)?;
        }
        let mut resources = ResourceRegistry::default();
        for resource in self.resources {
            resources.register(resource)?;
        }

        let mut hierarchy = RoleHierarchy::new();
        for (parent, child) in self.edges {
            hierarchy.add_edge(parent, child)?;
        }

        let mut store = PermissionStore::new();
        for (role, action, resource, rule) in self.direct {
            store.add_permission(role, action, resource, rule);
        }
        for def in &self.definitions {
            def.apply(&mut store, &actions, &resources)?;
        }

        let mut domain_roles = DomainRoleProviderRegistry::new();
        for (domain, provider) in self.role_providers {
            domain_roles.register(domain, provider)?;
        }
        let mut contexts = ContextProviderRegistry::new();
        for (domain, provider) in self.context_providers {
            contexts.register(domain, provider)?;
        }

        info!(
            "engine ready: {} actions, {} resource types, {} hierarchy edges, {} configured roles",
            actions.len(),
            resources.len(),
            hierarchy.edge_count(),
            store.role_count()
        );

        Ok(Engine {
            actions,
            resources,
            contexts,
            evaluator: PermissionEvaluator::new(hierarchy, store, domain_roles),
        })
    }
}
