//! Access-control engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, validate_trimmed, Validatable};

/// Role name that bypasses every check within its domain
pub const DEFAULT_ADMIN_ROLE: &str = "admin";

/// Grant action value that matches any requested action
pub const DEFAULT_WILDCARD_ACTION: &str = "*";

/// Access-control engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacSettings {
    /// Reserved super-role name
    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    /// Reserved wildcard action value
    #[serde(default = "default_wildcard_action")]
    pub wildcard_action: String,

    /// Persist the relation store after every successful mutation
    #[serde(default = "crate::domains::utils::default_true")]
    pub autosave: bool,

    /// Relations seeded into an empty store at startup
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Relations applied when the backing store holds nothing yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub grants: Vec<GrantSpec>,
    pub assignments: Vec<AssignmentSpec>,
}

/// A configured permission grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSpec {
    pub role: String,
    pub domain: String,
    pub module: String,
    pub action: String,
}

/// A configured role assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSpec {
    pub user: String,
    pub role: String,
    pub domain: String,
}

impl Default for RbacSettings {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            wildcard_action: default_wildcard_action(),
            autosave: true,
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Validatable for RbacSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.admin_role, "admin_role", self.domain_name())?;
        validate_trimmed(&self.admin_role, "admin_role", self.domain_name())?;
        validate_required_string(&self.wildcard_action, "wildcard_action", self.domain_name())?;
        validate_trimmed(&self.wildcard_action, "wildcard_action", self.domain_name())?;

        if self.admin_role == self.wildcard_action {
            return Err(self.validation_error("admin_role and wildcard_action must differ"));
        }

        // A wildcard spelled like a word could shadow a real action name
        if self.wildcard_action.chars().any(char::is_alphanumeric) {
            return Err(self.validation_error(format!(
                "wildcard_action '{}' must not contain alphanumeric characters",
                self.wildcard_action
            )));
        }

        for grant in &self.bootstrap.grants {
            for (field, value) in [
                ("role", &grant.role),
                ("domain", &grant.domain),
                ("module", &grant.module),
                ("action", &grant.action),
            ] {
                validate_required_string(value, &format!("bootstrap grant {}", field), self.domain_name())?;
            }
        }

        for assignment in &self.bootstrap.assignments {
            for (field, value) in [
                ("user", &assignment.user),
                ("role", &assignment.role),
                ("domain", &assignment.domain),
            ] {
                validate_required_string(value, &format!("bootstrap assignment {}", field), self.domain_name())?;
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "rbac"
    }
}

fn default_admin_role() -> String {
    DEFAULT_ADMIN_ROLE.to_string()
}

fn default_wildcard_action() -> String {
    DEFAULT_WILDCARD_ACTION.to_string()
}
