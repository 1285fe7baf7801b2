//! Reserved role and action values

use gate_config::validation::Validatable;
use gate_config::{RbacSettings, DEFAULT_ADMIN_ROLE, DEFAULT_WILDCARD_ACTION};

use crate::error::GateResult;

/// Role that is allowed everything within the domain it is held in
pub const ADMIN_ROLE: &str = DEFAULT_ADMIN_ROLE;

/// Grant action that matches every requested action
pub const WILDCARD_ACTION: &str = DEFAULT_WILDCARD_ACTION;

/// The reserved values in effect for one gate instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    admin_role: String,
    wildcard_action: String,
}

impl Sentinels {
    /// Take the sentinels from settings, rejecting empty, padded or colliding values
    pub fn from_settings(settings: &RbacSettings) -> GateResult<Self> {
        settings.validate()?;
        Ok(Self {
            admin_role: settings.admin_role.clone(),
            wildcard_action: settings.wildcard_action.clone(),
        })
    }

    pub fn admin_role(&self) -> &str {
        &self.admin_role
    }

    pub fn wildcard_action(&self) -> &str {
        &self.wildcard_action
    }

    pub fn is_admin_role(&self, role: &str) -> bool {
        role == self.admin_role
    }
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            admin_role: ADMIN_ROLE.to_string(),
            wildcard_action: WILDCARD_ACTION.to_string(),
        }
    }
}
