//! Read-only projections over the relation sets
//!
//! Every function is scoped to one domain and only reshapes what the sets
//! already contain; nothing here invents a relation.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::UserRole;
use crate::relations::Relations;
use crate::sentinel::Sentinels;

/// Push `value` unless already seen, keeping first-seen order
fn push_distinct<'a>(seen: &mut HashSet<&'a str>, out: &mut Vec<String>, value: &'a str) {
    if seen.insert(value) {
        out.push(value.to_string());
    }
}

/// Distinct roles named by grants in the domain, admin always first
pub fn list_roles(relations: &Relations, domain: &str, sentinels: &Sentinels) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut roles = Vec::new();
    push_distinct(&mut seen, &mut roles, sentinels.admin_role());

    for grant in relations.grants().iter().filter(|g| g.domain == domain) {
        push_distinct(&mut seen, &mut roles, &grant.role);
    }
    roles
}

/// `module.action` entries granted to the role in the domain, in store order
///
/// The admin role always yields the single wildcard entry, whatever grants
/// name it.
pub fn list_permissions(relations: &Relations, domain: &str, role: &str, sentinels: &Sentinels) -> Vec<String> {
    if sentinels.is_admin_role(role) {
        return vec![sentinels.wildcard_action().to_string()];
    }

    relations
        .grants()
        .iter()
        .filter(|g| g.domain == domain && g.role == role)
        .map(|g| g.permission())
        .collect()
}

/// Every user/role pair assigned in the domain, in store order
pub fn list_user_roles(relations: &Relations, domain: &str) -> Vec<UserRole> {
    relations
        .assignments()
        .iter()
        .filter(|a| a.domain == domain)
        .map(UserRole::from)
        .collect()
}

/// Roles the user holds in the domain
pub fn roles_of_user(relations: &Relations, domain: &str, user: &str) -> Vec<String> {
    relations
        .assignments()
        .iter()
        .filter(|a| a.domain == domain && a.user == user)
        .map(|a| a.role.clone())
        .collect()
}

/// Users holding the role in the domain
pub fn users_of_role(relations: &Relations, domain: &str, role: &str) -> Vec<String> {
    relations
        .assignments()
        .iter()
        .filter(|a| a.domain == domain && a.role == role)
        .map(|a| a.user.clone())
        .collect()
}

/// Distinct modules granted to the role in the domain, first-seen order
pub fn modules_of_role(relations: &Relations, domain: &str, role: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut modules = Vec::new();
    for grant in relations
        .grants()
        .iter()
        .filter(|g| g.domain == domain && g.role == role)
    {
        push_distinct(&mut seen, &mut modules, &grant.module);
    }
    modules
}

/// How many user/role assignments in the domain reach each module
///
/// Each assignment adds one to every distinct module its role is granted in
/// the domain. Users sharing a role count separately; roles without users
/// count nothing. The admin bypass is not expanded here: an admin
/// assignment only counts modules explicitly granted to the admin role.
pub fn module_usage_counts(relations: &Relations, domain: &str) -> BTreeMap<String, usize> {
    let mut modules_by_role: HashMap<&str, Vec<String>> = HashMap::new();
    let mut counts = BTreeMap::new();

    for assignment in relations.assignments().iter().filter(|a| a.domain == domain) {
        let modules = modules_by_role
            .entry(assignment.role.as_str())
            .or_insert_with(|| modules_of_role(relations, domain, &assignment.role));

        for module in modules.iter() {
            *counts.entry(module.clone()).or_insert(0) += 1;
        }
    }
    counts
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
                Grant::new("reader", "domain1", "data2", "read"),
                Grant::new("reader", "domain1", "data2", "download"),
                Grant::new("visitor", "domain1", "data3", "view"),
                Grant::new("writer", "domain2", "data5", "read"),
            ],
            vec![
                Assignment::new("alice", "admin", "domain1"),
                Assignment::new("bob", "reader", "domain1"),
                Assignment::new("foo", "visitor", "domain1"),
                Assignment::new("chalet", "visitor", "domain1"),
                Assignment::new("bob", "writer", "domain1"),
                Assignment::new("bob", "writer", "domain2"),
            ],
        )
    }

    #[test]
    fn test_list_roles_admin_first() {
        let sentinels = Sentinels::default();
        assert_eq!(
            list_roles(&relations(), "domain1", &sentinels),
            vec!["admin", "writer", "reader", "visitor"]
        );
        assert_eq!(list_roles(&relations(), "domain4", &sentinels), vec!["admin"]);
        assert_eq!(list_roles(&Relations::new(), "domain1", &sentinels), vec!["admin"]);
    }

    #[test]
    fn test_list_roles_never_repeats_admin() {
        let relations = Relations::from_tuples(
            vec![
                Grant::new("viewer", "domain1", "data1", "read"),
                Grant::new("admin", "domain1", "data1", "read"),
            ],
            vec![],
        );
        assert_eq!(
            list_roles(&relations, "domain1", &Sentinels::default()),
            vec!["admin", "viewer"]
        );
    }

    #[test]
    fn test_list_permissions() {
        let sentinels = Sentinels::default();
        let relations = relations();
        assert_eq!(
            list_permissions(&relations, "domain1", "writer", &sentinels),
            vec!["data1.read", "data1.write"]
        );
        assert_eq!(
            list_permissions(&relations, "domain1", "reader", &sentinels),
            vec!["data2.read", "data2.download"]
        );
        assert!(list_permissions(&relations, "domain1", "ghost", &sentinels).is_empty());
        assert!(list_permissions(&relations, "domain4", "writer", &sentinels).is_empty());
    }

    #[test]
    fn test_admin_permissions_are_wildcard_only() {
        let relations = Relations::from_tuples(
            vec![Grant::new("admin", "domain1", "data1", "read")],
            vec![],
        );
        let sentinels = Sentinels::default();
        assert_eq!(list_permissions(&relations, "domain1", "admin", &sentinels), vec!["*"]);
        assert_eq!(list_permissions(&Relations::new(), "domain9", "admin", &sentinels), vec!["*"]);
    }

    #[test]
    fn test_list_user_roles_keeps_duplicate_users() {
        let pairs = list_user_roles(&relations(), "domain1");
        assert_eq!(
            pairs,
            vec![
                UserRole::new("alice", "admin"),
                UserRole::new("bob", "reader"),
                UserRole::new("foo", "visitor"),
                UserRole::new("chalet", "visitor"),
                UserRole::new("bob", "writer"),
            ]
        );
        assert!(list_user_roles(&relations(), "domain4").is_empty());
    }

    #[test]
    fn test_roles_and_users() {
        let relations = relations();
        assert_eq!(roles_of_user(&relations, "domain1", "bob"), vec!["reader", "writer"]);
        assert_eq!(roles_of_user(&relations, "domain2", "bob"), vec!["writer"]);
        assert!(roles_of_user(&relations, "domain1", "bon").is_empty());
        assert_eq!(users_of_role(&relations, "domain1", "visitor"), vec!["foo", "chalet"]);
        assert!(users_of_role(&relations, "domain2", "visitor").is_empty());
    }

    #[test]
    fn test_modules_of_role_distinct() {
        let relations = relations();
        assert_eq!(modules_of_role(&relations, "domain1", "reader"), vec!["data2"]);
        assert_eq!(modules_of_role(&relations, "domain1", "writer"), vec!["data1"]);
        assert!(modules_of_role(&relations, "domain1", "writer2").is_empty());
        assert!(modules_of_role(&relations, "domain5", "writer").is_empty());
    }

    #[test]
    fn test_module_usage_counts() {
        let counts = module_usage_counts(&relations(), "domain1");
        let expected: BTreeMap<String, usize> = [("data1", 1), ("data2", 1), ("data3", 2)]
            .into_iter()
            .map(|(module, count)| (module.to_string(), count))
            .collect();
        assert_eq!(counts, expected);

        assert!(module_usage_counts(&relations(), "domain5").is_empty());
    }

    #[test]
    fn test_module_usage_counts_shared_role() {
        let relations = Relations::from_tuples(
            vec![
                Grant::new("reader", "domain1", "data2", "read"),
                Grant::new("reader", "domain1", "data2", "download"),
            ],
            vec![
                Assignment::new("alice", "reader", "domain1"),
                Assignment::new("bob", "reader", "domain1"),
            ],
        );
        let counts = module_usage_counts(&relations, "domain1");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["data2"], 2);
    }
}
