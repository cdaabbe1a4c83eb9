//! Shared types for the Warden authorization engine

pub mod context;
pub mod ident;
pub mod principal;

// Re-export commonly used types
pub use context::{keys, Context, ContextValue, OwnerProviderFn, UserPredicateFn};
pub use ident::{Action, Domain, Permission, ResourceType, Role};
pub use principal::{AuthUserInfo, ResourceId, UserId};
