//! Evaluation outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::Role;

/// Why a check resolved the way it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DecisionReason {
    /// An assigned role carried a satisfied grant
    GrantedBy {
        /// The role the user holds
        role: Role,
        /// The ancestor whose grant matched, when inherited
        via: Option<Role>,
    },
    /// A dynamically computed domain role carried a satisfied grant
    DomainRoleGrant {
        /// The role the provider returned
        role: Role,
        /// The ancestor whose grant matched, when inherited
        via: Option<Role>,
    },
    /// No role produced a satisfied grant
    NoApplicableConfig,
}

/// The full result of one authorization check
///
/// Carries an id and timestamp so decisions can be correlated with
/// request logs and audited after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub allowed: bool,
    pub reason: DecisionReason,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    /// An allow decision with the given reason
    pub fn allow(reason: DecisionReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            allowed: true,
            reason,
            timestamp: Utc::now(),
        }
    }

    /// A deny decision with the given reason
    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            allowed: false,
            reason,
            timestamp: Utc::now(),
        }
    }
}
