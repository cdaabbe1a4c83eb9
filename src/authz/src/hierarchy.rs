//! Role inheritance hierarchy
//!
//! A directed acyclic graph over roles with multi-parent inheritance: a
//! role holds every permission configured for any of its transitive
//! ancestors. Edges are added during bootstrap and rejected if they would
//! close a cycle; ancestor lookups afterwards hit a memoized closure
//! cache that is cleared wholesale whenever the graph mutates.

use crate::error::{AuthzError, Result};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use warden_core::Role;

/// Cycle-safe role inheritance graph
///
/// With roles expected in the tens to low hundreds, reachability is a
/// naive memoized recursion over direct parents; no reachability index
/// is needed.
#[derive(Debug)]
pub struct RoleHierarchy {
    /// Direct parents, keyed by child
    parents: HashMap<Role, HashSet<Role>>,

    /// Memoized transitive ancestor sets, cleared on any mutation
    memo: DashMap<Role, HashSet<Role>>,
}

impl RoleHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self {
            parents: HashMap::new(),
            memo: DashMap::new(),
        }
    }

    /// Declare `parent` as a direct parent of `child`
    ///
    /// On success the memoized ancestor cache is invalidated. On error the
    /// graph is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`AuthzError::SelfInheritance`] when `parent == child`
    /// - [`AuthzError::InheritanceCycle`] when `child` is already a
    ///   transitive ancestor of `parent`
    pub fn add_edge(&mut self, parent: Role, child: Role) -> Result<()> {
        if parent == child {
            return Err(AuthzError::SelfInheritance(parent.to_string()));
        }
        if self.is_ancestor(&child, &parent) {
            return Err(AuthzError::InheritanceCycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        self.parents.entry(child).or_default().insert(parent);
        self.memo.clear();
        Ok(())
    }

    /// Every role reachable from `role` by following parent edges
    ///
    /// Direct parents unioned with each parent's own closure, deduplicated
    /// and excluding `role` itself. A role with no parents yields the
    /// empty set. Results are memoized until the next [`add_edge`].
    ///
    /// [`add_edge`]: Self::add_edge
    pub fn all_ancestors(&self, role: &Role) -> HashSet<Role> {
        if let Some(cached) = self.memo.get(role) {
            return cached.clone();
        }

        let mut closure = HashSet::new();
        if let Some(direct) = self.parents.get(role) {
            for parent in direct {
                closure.insert(parent.clone());
                closure.extend(self.all_ancestors(parent));
            }
        }

        self.memo.insert(role.clone(), closure.clone());
        closure
    }

    /// Whether `candidate` is a transitive ancestor of `role`
    pub fn is_ancestor(&self, candidate: &Role, role: &Role) -> bool {
        self.all_ancestors(role).contains(candidate)
    }

    /// Direct parents of `role`
    pub fn parents(&self, role: &Role) -> HashSet<Role> {
        self.parents.get(role).cloned().unwrap_or_default()
    }

    /// Size of the transitive ancestor set of `role`
    pub fn ancestor_count(&self, role: &Role) -> usize {
        self.all_ancestors(role).len()
    }

    /// Distinct roles appearing in at least one edge
    pub fn role_count(&self) -> usize {
        let mut roles: HashSet<&Role> = self.parents.keys().collect();
        for parents in self.parents.values() {
            roles.extend(parents);
        }
        roles.len()
    }

    /// Number of direct parent-child edges
    pub fn edge_count(&self) -> usize {
        self.parents.values().map(HashSet::len).sum()
    }
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        Self::new()
    }
}
