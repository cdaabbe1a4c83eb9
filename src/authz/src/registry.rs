//! Identifier registries for actions and resource types
//!
//! Flat (domain, identifier) namespaces that resolve string identifiers
//! back into typed descriptors. They exist to catch configuration typos
//! and collisions at startup rather than at request time: registration
//! rejects duplicates, lookup of an unknown pair is an error.

use crate::error::{AuthzError, Result};
use std::collections::HashMap;
use warden_core::{Action, Domain, ResourceType};

/// A descriptor that can live in an identifier registry
pub trait Descriptor {
    /// The owning domain
    fn domain(&self) -> &Domain;

    /// The identifier within the domain (action id or resource type name)
    fn ident(&self) -> &str;
}

impl Descriptor for Action {
    fn domain(&self) -> &Domain {
        self.domain()
    }

    fn ident(&self) -> &str {
        self.id()
    }
}

impl Descriptor for ResourceType {
    fn domain(&self) -> &Domain {
        self.domain()
    }

    fn ident(&self) -> &str {
        self.name()
    }
}

/// Uniqueness-enforcing map of (domain, identifier) to descriptor
///
/// Populated during single-threaded bootstrap via `&mut self`; read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct IdentifierRegistry<T> {
    entries: HashMap<Domain, HashMap<String, T>>,
}

/// Registry of action descriptors
pub type ActionRegistry = IdentifierRegistry<Action>;

/// Registry of resource type descriptors
pub type ResourceRegistry = IdentifierRegistry<ResourceType>;

impl<T: Descriptor> IdentifierRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a descriptor
    ///
    /// # Errors
    ///
    /// [`AuthzError::DuplicateRegistration`] if a descriptor with the same
    /// (domain, identifier) pair is already present.
    pub fn register(&mut self, descriptor: T) -> Result<()> {
        let domain = descriptor.domain().clone();
        let ident = descriptor.ident().to_string();

        let in_domain = self.entries.entry(domain.clone()).or_default();
        if in_domain.contains_key(&ident) {
            return Err(AuthzError::DuplicateRegistration(format!(
                "{}:{}",
                domain, ident
            )));
        }
        in_domain.insert(ident, descriptor);
        Ok(())
    }

    /// Look up a descriptor by its (domain, identifier) pair
    ///
    /// # Errors
    ///
    /// [`AuthzError::NotFound`] if nothing is registered under the pair.
    pub fn get(&self, domain: &Domain, ident: &str) -> Result<&T> {
        self.entries
            .get(domain)
            .and_then(|in_domain| in_domain.get(ident))
            .ok_or_else(|| AuthzError::NotFound(format!("{}:{}", domain, ident)))
    }

    /// All descriptors of one domain, in no particular order
    pub fn by_domain(&self, domain: &Domain) -> Vec<&T> {
        self.entries
            .get(domain)
            .map(|in_domain| in_domain.values().collect())
            .unwrap_or_default()
    }

    /// Number of registered descriptors across all domains
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether the registry holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Descriptor> Default for IdentifierRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
