//! Relation tuples and decision requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission grant: `role` may perform `action` on `module` within `domain`
///
/// The action may be the wildcard, meaning any action on the module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub role: String,
    pub domain: String,
    pub module: String,
    pub action: String,
}

impl Grant {
    /// Create a new grant
    pub fn new(
        role: impl Into<String>,
        domain: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            domain: domain.into(),
            module: module.into(),
            action: action.into(),
        }
    }

    /// Permission string in `module.action` form
    pub fn permission(&self) -> String {
        format!("{}.{}", self.module, self.action)
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.role, self.domain, self.module, self.action)
    }
}

/// Role assignment: `user` holds `role` within `domain`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub user: String,
    pub role: String,
    pub domain: String,
}

impl Assignment {
    /// Create a new assignment
    pub fn new(user: impl Into<String>, role: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            role: role.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.user, self.role, self.domain)
    }
}

/// A user and one role they hold, as listed for a domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRole {
    pub user: String,
    pub role: String,
}

impl UserRole {
    pub fn new(user: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            role: role.into(),
        }
    }
}

impl From<&Assignment> for UserRole {
    fn from(assignment: &Assignment) -> Self {
        Self {
            user: assignment.user.clone(),
            role: assignment.role.clone(),
        }
    }
}

/// Decision request: may `user` perform `action` on `module` within `domain`?
///
/// The action is always compared literally; a request never carries a
/// wildcard meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub domain: String,
    pub user: String,
    pub module: String,
    pub action: String,
}

impl AccessRequest {
    pub fn new(
        domain: impl Into<String>,
        user: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            user: user.into(),
            module: module.into(),
            action: action.into(),
        }
    }
}
