//! Decision orchestration: admin bypass, then grant matching

use std::sync::Arc;

use tracing::debug;

use crate::error::GateResult;
use crate::matcher;
use crate::models::AccessRequest;
use crate::relations::Relations;
use crate::sentinel::Sentinels;
use crate::store::RelationStore;

/// Decide a request against one consistent view of the relation sets
///
/// The admin check runs first and does not consult grants at all, so grants
/// naming the admin role never influence a decision.
pub fn decide(relations: &Relations, request: &AccessRequest, sentinels: &Sentinels) -> bool {
    if matcher::holds_role(relations, &request.domain, &request.user, sentinels.admin_role()) {
        return true;
    }
    matcher::matches(relations, request, sentinels.wildcard_action())
}

/// Answers access requests from the current state of a [`RelationStore`]
#[derive(Clone)]
pub struct Enforcer {
    store: Arc<RelationStore>,
    sentinels: Arc<Sentinels>,
}

impl Enforcer {
    pub fn new(store: Arc<RelationStore>, sentinels: Arc<Sentinels>) -> Self {
        Self { store, sentinels }
    }

    /// Check whether the user holds the admin role in the domain
    pub async fn is_admin(&self, domain: &str, user: &str) -> bool {
        let relations = self.store.read().await;
        matcher::holds_role(&relations, domain, user, self.sentinels.admin_role())
    }

    /// Decide an access request
    ///
    /// Users and domains without any relations are denied, not errors.
    pub async fn decide(&self, request: &AccessRequest) -> GateResult<bool> {
        let allowed = {
            let relations = self.store.read().await;
            decide(&relations, request, &self.sentinels)
        };

        debug!(
            domain = %request.domain,
            user = %request.user,
            module = %request.module,
            action = %request.action,
            allowed,
            "Access decision"
        );
        Ok(allowed)
    }

    /// Check if user may perform action on module within domain
    pub async fn has_permission(
        &self,
        domain: &str,
        user: &str,
        module: &str,
        action: &str,
    ) -> GateResult<bool> {
        self.decide(&AccessRequest::new(domain, user, module, action)).await
    }
}
