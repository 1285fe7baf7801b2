//! Decisions and queries over the three-domain fixture policy

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use gate_rbac::{Gate, PolicyAdapter, UserRole};
use gate_storage::{FileAdapter, SeaOrmAdapter};
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/rbac_with_domains_policy.csv");

/// Fixture copied into a scratch directory so autosave never touches the checked-in file
struct FixtureGate {
    _dir: TempDir,
    path: PathBuf,
    gate: Gate,
}

async fn fixture_gate() -> FixtureGate {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rbac_with_domains_policy.csv");
    std::fs::write(&path, FIXTURE).unwrap();

    let gate = Gate::with_defaults(Arc::new(FileAdapter::new(&path))).await.unwrap();
    FixtureGate { _dir: dir, path, gate }
}

fn pairs(entries: &[(&str, &str)]) -> Vec<UserRole> {
    entries.iter().map(|(user, role)| UserRole::new(*user, *role)).collect()
}

fn counts(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
    entries.iter().map(|(module, n)| (module.to_string(), *n)).collect()
}

#[tokio::test]
async fn test_missing_policy_file_fails_construction() {
    let dir = TempDir::new().unwrap();
    let adapter = Arc::new(FileAdapter::new(dir.path().join("no_file")));
    let result = Gate::with_defaults(adapter).await;
    assert!(matches!(result, Err(ref err) if err.is_adapter()));
}

#[tokio::test]
async fn test_get_all_users_role() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    assert_eq!(
        gate.get_all_users_role("domain1").await,
        pairs(&[("alice", "admin"), ("bob", "reader"), ("foo", "visitor"), ("chalet", "visitor")])
    );
    assert_eq!(
        gate.get_all_users_role("domain2").await,
        pairs(&[("alice", "reader2"), ("bob", "admin"), ("foo", "visitor2"), ("chalet", "visitor2")])
    );
    assert_eq!(
        gate.get_all_users_role("domain3").await,
        pairs(&[("alice", "visitor3"), ("bob", "reader3"), ("chalet", "reader3"), ("foo", "admin")])
    );
    assert!(gate.get_all_users_role("domain4").await.is_empty());
}

#[tokio::test]
async fn test_get_permissions_for_role() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    for domain in ["domain1", "domain2", "domain3"] {
        assert_eq!(gate.get_permissions_for_role(domain, "admin").await, vec!["*"]);
    }

    assert_eq!(
        gate.get_permissions_for_role("domain1", "writer").await,
        vec!["data1.read", "data1.write"]
    );
    assert_eq!(
        gate.get_permissions_for_role("domain1", "reader").await,
        vec!["data2.read", "data2.download"]
    );
    assert_eq!(gate.get_permissions_for_role("domain1", "visitor").await, vec!["data3.view"]);

    assert_eq!(
        gate.get_permissions_for_role("domain2", "writer2").await,
        vec!["data1.read", "data1.write", "data1.download"]
    );
    assert_eq!(gate.get_permissions_for_role("domain2", "reader2").await, vec!["data2.view"]);

    assert_eq!(
        gate.get_permissions_for_role("domain3", "writer3").await,
        vec!["data1.write", "data2.download"]
    );
    assert_eq!(gate.get_permissions_for_role("domain3", "reader3").await, vec!["data2.read"]);
    assert_eq!(gate.get_permissions_for_role("domain3", "visitor3").await, vec!["data3.*"]);
    assert_eq!(gate.get_permissions_for_role("domain3", "Observer3").await, vec!["data3.view"]);

    // Role from another domain, and an unknown domain
    assert!(gate.get_permissions_for_role("domain1", "visitor3").await.is_empty());
    assert!(gate.get_permissions_for_role("domain4", "visitor").await.is_empty());
}

#[tokio::test]
async fn test_get_roles() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    assert_eq!(gate.get_roles("domain1").await, vec!["admin", "writer", "reader", "visitor"]);
    assert_eq!(gate.get_roles("domain2").await, vec!["admin", "writer2", "reader2"]);
    assert_eq!(
        gate.get_roles("domain3").await,
        vec!["admin", "writer3", "reader3", "visitor3", "Observer3"]
    );
    assert_eq!(gate.get_roles("domain4").await, vec!["admin"]);
}

#[tokio::test]
async fn test_has_permission() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    let cases = [
        // domain1
        ("domain1", "alice", "data1", "write", true),
        ("domain1", "alice", "data4", "write", true),
        ("domain1", "bob", "data2", "download", true),
        ("domain1", "bob", "data2", "write", false),
        // domain2
        ("domain2", "alice", "data2", "download", false),
        ("domain2", "alice", "data2", "view", true),
        ("domain2", "bob", "data2", "download", true),
        ("domain2", "bob", "data2", "view", true),
        ("domain2", "foo", "data2", "view", false),
        // domain3
        ("domain3", "foo", "data2", "view", true),
        ("domain3", "alice", "data3", "view", true),
        ("domain3", "alice", "data3", "write", true),
        ("domain3", "alice", "data2", "view", false),
        ("domain3", "bob", "data2", "view", false),
        ("domain3", "bob", "data2", "read", true),
        // unknown user, unknown domain
        ("domain1", "bunny", "data2", "read", false),
        ("domain4", "alice", "data2", "read", false),
    ];

    for (domain, user, module, action, expected) in cases {
        assert_eq!(
            gate.has_permission(domain, user, module, action).await.unwrap(),
            expected,
            "{domain} {user} {module} {action}"
        );
    }
}

#[tokio::test]
async fn test_is_admin() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    let cases = [
        ("domain1", "alice", true),
        ("domain1", "bob", false),
        ("domain2", "alice", false),
        ("domain2", "bob", true),
        ("domain3", "alice", false),
        ("domain3", "bob", false),
        ("domain3", "foo", true),
        ("domain1", "bee", false),
        ("domain4", "alice", false),
        ("domain4", "bob", false),
        ("domain4", "foo", false),
    ];
    for (domain, user, expected) in cases {
        assert_eq!(gate.is_admin(domain, user).await, expected, "{domain} {user}");
    }
}

#[tokio::test]
async fn test_get_user_roles() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    let cases = [
        ("domain1", "alice", "admin"),
        ("domain1", "bob", "reader"),
        ("domain1", "foo", "visitor"),
        ("domain1", "chalet", "visitor"),
        ("domain2", "alice", "reader2"),
        ("domain2", "bob", "admin"),
        ("domain2", "foo", "visitor2"),
        ("domain2", "chalet", "visitor2"),
        ("domain3", "foo", "admin"),
        ("domain3", "alice", "visitor3"),
        ("domain3", "bob", "reader3"),
        ("domain3", "chalet", "reader3"),
    ];
    for (domain, user, role) in cases {
        assert_eq!(gate.get_user_roles(domain, user).await, vec![role], "{domain} {user}");
    }

    assert!(gate.get_user_roles("domain1", "bon").await.is_empty());
    assert!(gate.get_user_roles("domain4", "alice").await.is_empty());
}

#[tokio::test]
async fn test_grant_and_revoke_round_trip() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    assert!(!gate.has_permission("domain5", "bella", "resource1", "write").await.unwrap());

    gate.assign_permission_to_role("domain5", "dep1", "resource1", "write").await.unwrap();
    gate.assign_role_to_user("domain5", "dep1", "bella").await.unwrap();
    gate.save().await.unwrap();
    assert!(gate.has_permission("domain5", "bella", "resource1", "write").await.unwrap());

    let saved = std::fs::read_to_string(&fixture.path).unwrap();
    assert!(saved.contains("p, dep1, domain5, resource1, write"));
    assert!(saved.contains("g, bella, dep1, domain5"));

    gate.revoke_role_from_user("domain5", "dep1", "bella").await.unwrap();
    assert!(!gate.has_permission("domain5", "bella", "resource1", "write").await.unwrap());

    gate.revoke_permission_from_role("domain5", "dep1", "resource1", "write").await.unwrap();
    assert!(!gate.has_permission("domain5", "bella", "resource1", "write").await.unwrap());

    gate.save().await.unwrap();
    gate.load().await.unwrap();

    // Back to the fixture contents
    let reloaded = gate_storage::parse_policy(&std::fs::read_to_string(&fixture.path).unwrap()).unwrap();
    let fixture_policy = gate_storage::parse_policy(FIXTURE).unwrap();
    assert_eq!(reloaded, fixture_policy);
}

#[tokio::test]
async fn test_count_modules() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    assert_eq!(gate.count_modules("domain1").await, counts(&[("data2", 1), ("data3", 2)]));
    assert_eq!(gate.count_modules("domain2").await, counts(&[("data2", 1)]));
    assert_eq!(gate.count_modules("domain3").await, counts(&[("data2", 2), ("data3", 1)]));
    assert!(gate.count_modules("domain5").await.is_empty());
}

#[tokio::test]
async fn test_get_modules_for_role() {
    let fixture = fixture_gate().await;
    let gate = &fixture.gate;

    assert_eq!(gate.get_modules_for_role("domain1", "reader").await, vec!["data2"]);
    assert_eq!(gate.get_modules_for_role("domain1", "visitor").await, vec!["data3"]);
    assert_eq!(gate.get_modules_for_role("domain1", "writer").await, vec!["data1"]);
    assert_eq!(gate.get_modules_for_role("domain3", "writer3").await, vec!["data1", "data2"]);
    assert!(gate.get_modules_for_role("domain1", "writer2").await.is_empty());
    assert!(gate.get_modules_for_role("domain5", "writer2").await.is_empty());
}

#[tokio::test]
async fn test_fixture_migrates_to_database() {
    let fixture = fixture_gate().await;
    let source = FileAdapter::new(&fixture.path).load_all().await.unwrap();

    let database = Arc::new(SeaOrmAdapter::connect("sqlite::memory:").await.unwrap());
    database.save_all(&source.grants, &source.assignments).await.unwrap();

    let gate = Gate::with_defaults(database).await.unwrap();
    assert_eq!(
        gate.get_roles("domain3").await,
        vec!["admin", "writer3", "reader3", "visitor3", "Observer3"]
    );
    assert!(gate.has_permission("domain3", "alice", "data3", "write").await.unwrap());
    assert_eq!(gate.count_modules("domain1").await, counts(&[("data2", 1), ("data3", 2)]));
}
