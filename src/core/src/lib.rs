//! # Warden Core
//!
//! Shared value types for the Warden authorization engine. This package
//! keeps the engine and its embedders (enforcement interceptors,
//! authentication adapters) on one set of identity and context types
//! without pulling in the engine itself.
//!
//! Everything here is a plain value: descriptors compare structurally,
//! contexts live for one authorization check, and nothing performs I/O.

pub mod types;

// Re-export commonly used types
pub use types::context::{keys, Context, ContextValue, OwnerProviderFn, UserPredicateFn};
pub use types::ident::{Action, Domain, Permission, ResourceType, Role};
pub use types::principal::{AuthUserInfo, ResourceId, UserId};
