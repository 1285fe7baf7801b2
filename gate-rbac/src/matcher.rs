//! Grant matching for decision requests

use crate::models::AccessRequest;
use crate::relations::Relations;

/// Whether `user` holds `role` within `domain`
pub fn holds_role(relations: &Relations, domain: &str, user: &str, role: &str) -> bool {
    relations
        .assignments()
        .iter()
        .any(|a| a.domain == domain && a.user == user && a.role == role)
}

/// Whether any role the requesting user holds in the request domain is
/// granted the requested module and action in that same domain.
///
/// A grant whose action equals `wildcard` matches every requested action.
/// The request action itself is compared literally.
pub fn matches(relations: &Relations, request: &AccessRequest, wildcard: &str) -> bool {
    relations
        .assignments()
        .iter()
        .filter(|a| a.domain == request.domain && a.user == request.user)
        .any(|assignment| {
            relations.grants().iter().any(|grant| {
                grant.role == assignment.role
                    && grant.domain == request.domain
                    && grant.module == request.module
                    && (grant.action == request.action || grant.action == wildcard)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Grant};

    fn relations() -> Relations {
        Relations::from_tuples(
            vec![
                Grant::new("writer", "domain1", "data1", "read"),
                Grant::new("writer", "domain1", "data1", "write"),
                Grant::new("visitor", "domain1", "data3", "*"),
                Grant::new("writer", "domain2", "data9", "read"),
            ],
            vec![
                Assignment::new("alice", "writer", "domain1"),
                Assignment::new("bob", "visitor", "domain1"),
                Assignment::new("carol", "writer", "domain2"),
            ],
        )
    }

    #[test]
    fn test_exact_action_match() {
        let relations = relations();
        assert!(matches(&relations, &AccessRequest::new("domain1", "alice", "data1", "write"), "*"));
        assert!(!matches(&relations, &AccessRequest::new("domain1", "alice", "data1", "delete"), "*"));
        assert!(!matches(&relations, &AccessRequest::new("domain1", "alice", "data2", "read"), "*"));
    }

    #[test]
    fn test_wildcard_grant_matches_any_action() {
        let relations = relations();
        for action in ["view", "write", "delete", "anything"] {
            assert!(matches(&relations, &AccessRequest::new("domain1", "bob", "data3", action), "*"));
        }
        assert!(!matches(&relations, &AccessRequest::new("domain1", "bob", "data1", "view"), "*"));
    }

    #[test]
    fn test_request_wildcard_is_literal() {
        let relations = relations();
        // alice has no wildcard grant, so a "*" request does not match "read"/"write"
        assert!(!matches(&relations, &AccessRequest::new("domain1", "alice", "data1", "*"), "*"));
        assert!(matches(&relations, &AccessRequest::new("domain1", "bob", "data3", "*"), "*"));
    }

    #[test]
    fn test_no_cross_domain_match() {
        let relations = relations();
        // carol is a writer only in domain2; the domain1 writer grants do not apply
        assert!(!matches(&relations, &AccessRequest::new("domain1", "carol", "data1", "read"), "*"));
        assert!(matches(&relations, &AccessRequest::new("domain2", "carol", "data9", "read"), "*"));
        // alice is a writer in domain1; the domain2 writer grant does not apply
        assert!(!matches(&relations, &AccessRequest::new("domain2", "alice", "data9", "read"), "*"));
    }

    #[test]
    fn test_unknown_user_or_domain() {
        let relations = relations();
        assert!(!matches(&relations, &AccessRequest::new("domain1", "mallory", "data1", "read"), "*"));
        assert!(!matches(&relations, &AccessRequest::new("domain4", "alice", "data1", "read"), "*"));
        assert!(!matches(&Relations::new(), &AccessRequest::new("domain1", "alice", "data1", "read"), "*"));
    }

    #[test]
    fn test_holds_role() {
        let relations = relations();
        assert!(holds_role(&relations, "domain1", "alice", "writer"));
        assert!(!holds_role(&relations, "domain2", "alice", "writer"));
        assert!(!holds_role(&relations, "domain1", "alice", "admin"));
    }
}
