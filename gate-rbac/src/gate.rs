//! Access-control facade

use std::collections::BTreeMap;
use std::sync::Arc;

use gate_config::{AssignmentSpec, GrantSpec, RbacSettings};
use tracing::info;

use crate::adapter::PolicyAdapter;
use crate::enforcer::Enforcer;
use crate::error::GateResult;
use crate::models::{AccessRequest, Assignment, Grant, UserRole};
use crate::query;
use crate::relations::{AssignmentFilter, GrantFilter};
use crate::sentinel::Sentinels;
use crate::store::RelationStore;

impl From<&GrantSpec> for Grant {
    fn from(spec: &GrantSpec) -> Self {
        Grant::new(&spec.role, &spec.domain, &spec.module, &spec.action)
    }
}

impl From<&AssignmentSpec> for Assignment {
    fn from(spec: &AssignmentSpec) -> Self {
        Assignment::new(&spec.user, &spec.role, &spec.domain)
    }
}

/// Domain-scoped access control over one relation store
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Gate {
    store: Arc<RelationStore>,
    enforcer: Enforcer,
    sentinels: Arc<Sentinels>,
}

impl Gate {
    /// Create a gate backed by `adapter`
    ///
    /// Loads everything the adapter holds. When it holds nothing, the
    /// bootstrap relations from `settings` are seeded and saved once.
    pub async fn new(adapter: Arc<dyn PolicyAdapter>, settings: &RbacSettings) -> GateResult<Self> {
        let sentinels = Arc::new(Sentinels::from_settings(settings)?);
        let store = Arc::new(RelationStore::open(adapter).await?);

        let seeded = {
            let bootstrap = &settings.bootstrap;
            let empty = store.read().await.is_empty();
            if empty && (!bootstrap.grants.is_empty() || !bootstrap.assignments.is_empty()) {
                store.set_autosave(false);
                let added = store
                    .extend(
                        bootstrap.grants.iter().map(Grant::from),
                        bootstrap.assignments.iter().map(Assignment::from),
                    )
                    .await?;
                store.save().await?;
                added
            } else {
                0
            }
        };
        store.set_autosave(settings.autosave);

        let relations = store.snapshot().await;
        info!(
            grants = relations.grants().len(),
            assignments = relations.assignments().len(),
            seeded,
            autosave = settings.autosave,
            admin_role = sentinels.admin_role(),
            "Access gate ready"
        );

        Ok(Self {
            enforcer: Enforcer::new(store.clone(), sentinels.clone()),
            store,
            sentinels,
        })
    }

    /// Create a gate with default settings
    pub async fn with_defaults(adapter: Arc<dyn PolicyAdapter>) -> GateResult<Self> {
        Self::new(adapter, &RbacSettings::default()).await
    }

    /// Underlying relation store
    pub fn store(&self) -> &Arc<RelationStore> {
        &self.store
    }

    pub fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }

    // Decisions

    /// Check if user may perform action on module within domain
    pub async fn has_permission(
        &self,
        domain: &str,
        user: &str,
        module: &str,
        action: &str,
    ) -> GateResult<bool> {
        self.enforcer.has_permission(domain, user, module, action).await
    }

    pub async fn decide(&self, request: &AccessRequest) -> GateResult<bool> {
        self.enforcer.decide(request).await
    }

    /// Check if user holds the admin role in the domain
    pub async fn is_admin(&self, domain: &str, user: &str) -> bool {
        self.enforcer.is_admin(domain, user).await
    }

    // Queries

    /// All roles known in the domain, admin first
    pub async fn get_roles(&self, domain: &str) -> Vec<String> {
        let relations = self.store.read().await;
        query::list_roles(&relations, domain, &self.sentinels)
    }

    /// Permissions of a role as `module.action` entries
    pub async fn get_permissions_for_role(&self, domain: &str, role: &str) -> Vec<String> {
        let relations = self.store.read().await;
        query::list_permissions(&relations, domain, role, &self.sentinels)
    }

    /// Every user/role pair in the domain
    pub async fn get_all_users_role(&self, domain: &str) -> Vec<UserRole> {
        let relations = self.store.read().await;
        query::list_user_roles(&relations, domain)
    }

    /// Roles the user holds in the domain
    pub async fn get_user_roles(&self, domain: &str, user: &str) -> Vec<String> {
        let relations = self.store.read().await;
        query::roles_of_user(&relations, domain, user)
    }

    /// Users holding the role in the domain
    pub async fn get_users_for_role(&self, domain: &str, role: &str) -> Vec<String> {
        let relations = self.store.read().await;
        query::users_of_role(&relations, domain, role)
    }

    /// Distinct modules the role is granted in the domain
    pub async fn get_modules_for_role(&self, domain: &str, role: &str) -> Vec<String> {
        let relations = self.store.read().await;
        query::modules_of_role(&relations, domain, role)
    }

    /// Number of user/role assignments reaching each module in the domain
    pub async fn count_modules(&self, domain: &str) -> BTreeMap<String, usize> {
        let relations = self.store.read().await;
        query::module_usage_counts(&relations, domain)
    }

    // Mutations

    /// Grant role the action on module within domain
    pub async fn assign_permission_to_role(
        &self,
        domain: &str,
        role: &str,
        module: &str,
        action: &str,
    ) -> GateResult<bool> {
        self.store.add_grant(Grant::new(role, domain, module, action)).await
    }

    /// Withdraw a grant; an absent grant is not an error
    pub async fn revoke_permission_from_role(
        &self,
        domain: &str,
        role: &str,
        module: &str,
        action: &str,
    ) -> GateResult<bool> {
        self.store.remove_grant(&Grant::new(role, domain, module, action)).await
    }

    /// Give user the role within domain
    pub async fn assign_role_to_user(&self, domain: &str, role: &str, user: &str) -> GateResult<bool> {
        self.store.add_assignment(Assignment::new(user, role, domain)).await
    }

    /// Take the role away from user within domain; absent is not an error
    pub async fn revoke_role_from_user(&self, domain: &str, role: &str, user: &str) -> GateResult<bool> {
        self.store.remove_assignment(&Assignment::new(user, role, domain)).await
    }

    /// Remove every grant and assignment of the role within domain
    ///
    /// Returns how many relations were removed. An empty role or domain
    /// removes nothing, since filters treat empty fields as wildcards.
    pub async fn delete_role(&self, domain: &str, role: &str) -> GateResult<usize> {
        if domain.is_empty() || role.is_empty() {
            return Ok(0);
        }

        let removed = self
            .store
            .remove_filtered(
                &GrantFilter::new().role(role).domain(domain),
                &AssignmentFilter::new().role(role).domain(domain),
            )
            .await?;

        info!(domain, role, removed, "Deleted role");
        Ok(removed)
    }

    // Persistence

    /// Replace in-memory relations with what the adapter holds
    pub async fn load(&self) -> GateResult<()> {
        self.store.load().await
    }

    /// Flush in-memory relations to the adapter
    pub async fn save(&self) -> GateResult<()> {
        self.store.save().await
    }

    pub fn set_autosave(&self, enabled: bool) {
        self.store.set_autosave(enabled);
    }
}
