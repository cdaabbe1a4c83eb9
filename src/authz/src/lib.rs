//! # Warden authorization engine
//!
//! Role-based authorization with inheritance, condition rules, and
//! per-domain extension points. Configuration is declared once at
//! startup and validated as a whole; after that every check runs
//! against immutable state and denies unless some role carries a
//! satisfied grant.
//!
//! A check walks the user's assigned roles most specific first, each
//! followed by its transitive ancestors, and stops at the first grant
//! whose rule passes. If none does, the permission's domain may compute
//! additional roles for the user (ownership, membership) through its
//! registered provider, and those get the same treatment before the
//! final deny.
//!
//! ## Example
//!
//! ```
//! # fn main() -> warden_authz::Result<()> {
//! use warden_authz::{
//!     Action, AuthUserInfo, Domain, Engine, GrantDef, PermissionsDef, ResourceType, Role,
//!     UserId,
//! };
//!
//! let docs = Domain::new("docs");
//! let editor = Role::system("editor");
//!
//! let engine = Engine::builder()
//!     .action(Action::new(docs.clone(), "edit"))
//!     .resource(ResourceType::new(docs.clone(), "document"))
//!     .definition(
//!         PermissionsDef::builder(docs.clone())
//!             .grant(GrantDef::new(editor.clone()).action("edit").resource("document"))
//!             .build(),
//!     )
//!     .build()?;
//!
//! let user = AuthUserInfo::new(UserId(7)).with_role(editor);
//! assert!(engine.check(&user, &docs, "edit", "document", None));
//! assert!(!engine.check(&AuthUserInfo::new(UserId(8)), &docs, "edit", "document", None));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod hierarchy;
pub mod provider;
pub mod registry;
pub mod rule;

pub use config::{GrantDef, PermissionConfig, PermissionStore, PermissionsDef, PermissionsDefBuilder};
pub use engine::{Engine, EngineBuilder};
pub use error::{AuthzError, ConditionError, Result};
pub use evaluator::{Decision, DecisionReason, PermissionEvaluator};
pub use hierarchy::RoleHierarchy;
pub use provider::{
    ContextProvider, ContextProviderRegistry, DomainRoleProvider, DomainRoleProviderRegistry,
    FnContextProvider, FnDomainRoleProvider,
};
pub use registry::{ActionRegistry, Descriptor, IdentifierRegistry, ResourceRegistry};
pub use rule::{predicate, AccessRequest, PermissionRule, Predicate};

pub use warden_core::{
    keys, Action, AuthUserInfo, Context, ContextValue, Domain, OwnerProviderFn, Permission,
    ResourceId, ResourceType, Role, UserId, UserPredicateFn,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
