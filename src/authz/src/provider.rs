//! Per-domain extension points
//!
//! Domains plug into the engine through two traits: a
//! [`DomainRoleProvider`] computes roles a user holds dynamically (from
//! ownership, membership, or any other live relationship), and a
//! [`ContextProvider`] assembles the fact bag a check runs against.
//! Each domain registers at most one of each; registration is
//! bootstrap-time and lookups afterwards are read-only.

use crate::error::{AuthzError, Result};
use std::collections::{HashMap, HashSet};
use warden_core::{Context, Domain, ResourceId, Role, UserId};

/// Computes domain roles for a user on the fly
///
/// Consulted only when a user's statically assigned roles yield no
/// grant. Implementations must not block on I/O; anything expensive
/// belongs in the context, resolved by the domain's [`ContextProvider`]
/// before the check starts.
pub trait DomainRoleProvider: Send + Sync {
    /// Roles `user_id` currently holds in this domain
    fn roles(&self, user_id: UserId, context: &Context) -> HashSet<Role>;
}

/// Builds the context for checks against a domain's resources
pub trait ContextProvider: Send + Sync {
    /// Context for a check on `resource_type`, optionally targeting a
    /// concrete resource
    fn context(&self, resource_type: &str, resource_id: Option<ResourceId>) -> Context;
}

/// Adapter turning a closure into a [`DomainRoleProvider`]
pub struct FnDomainRoleProvider<F>(F);

impl<F> FnDomainRoleProvider<F>
where
    F: Fn(UserId, &Context) -> HashSet<Role> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> DomainRoleProvider for FnDomainRoleProvider<F>
where
    F: Fn(UserId, &Context) -> HashSet<Role> + Send + Sync,
{
    fn roles(&self, user_id: UserId, context: &Context) -> HashSet<Role> {
        (self.0)(user_id, context)
    }
}

/// Adapter turning a closure into a [`ContextProvider`]
pub struct FnContextProvider<F>(F);

impl<F> FnContextProvider<F>
where
    F: Fn(&str, Option<ResourceId>) -> Context + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ContextProvider for FnContextProvider<F>
where
    F: Fn(&str, Option<ResourceId>) -> Context + Send + Sync,
{
    fn context(&self, resource_type: &str, resource_id: Option<ResourceId>) -> Context {
        (self.0)(resource_type, resource_id)
    }
}

/// Domain-keyed table of role providers
pub struct DomainRoleProviderRegistry {
    providers: HashMap<Domain, Box<dyn DomainRoleProvider>>,
}

impl DomainRoleProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register the provider for `domain`
    ///
    /// # Errors
    ///
    /// [`AuthzError::DuplicateRegistration`] when the domain already has
    /// a provider.
    pub fn register(&mut self, domain: Domain, provider: Box<dyn DomainRoleProvider>) -> Result<()> {
        if self.providers.contains_key(&domain) {
            return Err(AuthzError::DuplicateRegistration(format!(
                "domain role provider for {}",
                domain
            )));
        }
        self.providers.insert(domain, provider);
        Ok(())
    }

    /// The provider for `domain`, if one is registered
    pub fn get(&self, domain: &Domain) -> Option<&dyn DomainRoleProvider> {
        self.providers.get(domain).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for DomainRoleProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Domain-keyed table of context providers
pub struct ContextProviderRegistry {
    providers: HashMap<Domain, Box<dyn ContextProvider>>,
}

impl ContextProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register the provider for `domain`
    ///
    /// # Errors
    ///
    /// [`AuthzError::DuplicateRegistration`] when the domain already has
    /// a provider.
    pub fn register(&mut self, domain: Domain, provider: Box<dyn ContextProvider>) -> Result<()> {
        if self.providers.contains_key(&domain) {
            return Err(AuthzError::DuplicateRegistration(format!(
                "context provider for {}",
                domain
            )));
        }
        self.providers.insert(domain, provider);
        Ok(())
    }

    /// The provider for `domain`, if one is registered
    pub fn get(&self, domain: &Domain) -> Option<&dyn ContextProvider> {
        self.providers.get(domain).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ContextProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
