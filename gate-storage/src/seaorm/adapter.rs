//! SeaORM adapter storing relations in the `casbin_rules` table

use async_trait::async_trait;
use gate_rbac::{AdapterResult, Assignment, Grant, PolicyAdapter, PolicySnapshot};
use sea_orm::{
    ActiveValue::Set, Database, DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use super::entities::{casbin_rules, CasbinRule, CasbinRuleActiveModel, CasbinRuleColumn, CasbinRules};
use super::migrations::Migrator;
use crate::error::{StorageError, StorageResult};

const GRANT_PTYPE: &str = "p";
const ASSIGNMENT_PTYPE: &str = "g";

// Keeps bound parameters per statement well under SQLite's limit
const INSERT_BATCH: usize = 100;

/// Adapter persisting relations through SeaORM
#[derive(Clone)]
pub struct SeaOrmAdapter {
    db: DatabaseConnection,
}

impl SeaOrmAdapter {
    /// Create an adapter over an existing connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect to `url` and make sure the rules table exists
    pub async fn connect(url: &str) -> StorageResult<Self> {
        info!("Connecting policy database");
        let adapter = Self::new(Database::connect(url).await?);
        adapter.ensure_schema().await?;
        Ok(adapter)
    }

    /// Create the rules table if it is not there yet
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        Migrator::up(&self.db, None).await?;
        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn read(&self) -> StorageResult<PolicySnapshot> {
        let rules = CasbinRules::find()
            .order_by_asc(CasbinRuleColumn::Id)
            .all(&self.db)
            .await?;

        let mut snapshot = PolicySnapshot::default();
        for rule in rules {
            let ptype = rule.ptype.clone();
            match ptype.as_str() {
                GRANT_PTYPE => snapshot.grants.push(grant_from_rule(rule)?),
                ASSIGNMENT_PTYPE => snapshot.assignments.push(assignment_from_rule(rule)?),
                other => {
                    return Err(StorageError::InvalidRule {
                        id: rule.id,
                        message: format!("unknown ptype '{other}'"),
                    })
                }
            }
        }
        Ok(snapshot)
    }

    /// Replace every stored rule inside one transaction
    async fn replace(&self, grants: &[Grant], assignments: &[Assignment]) -> StorageResult<()> {
        let rows: Vec<CasbinRuleActiveModel> = grants
            .iter()
            .map(grant_to_rule)
            .chain(assignments.iter().map(assignment_to_rule))
            .collect();

        let txn = self.db.begin().await?;
        CasbinRules::delete_many().exec(&txn).await?;
        for batch in rows.chunks(INSERT_BATCH) {
            CasbinRules::insert_many(batch.to_vec()).exec(&txn).await?;
        }
        txn.commit().await?;

        debug!(rules = rows.len(), "Replaced stored policy rules");
        Ok(())
    }
}

fn grant_to_rule(grant: &Grant) -> CasbinRuleActiveModel {
    casbin_rules::ActiveModel {
        ptype: Set(GRANT_PTYPE.to_string()),
        v0: Set(Some(grant.role.clone())),
        v1: Set(Some(grant.domain.clone())),
        v2: Set(Some(grant.module.clone())),
        v3: Set(Some(grant.action.clone())),
        v4: Set(None),
        v5: Set(None),
        ..Default::default()
    }
}

fn assignment_to_rule(assignment: &Assignment) -> CasbinRuleActiveModel {
    casbin_rules::ActiveModel {
        ptype: Set(ASSIGNMENT_PTYPE.to_string()),
        v0: Set(Some(assignment.user.clone())),
        v1: Set(Some(assignment.role.clone())),
        v2: Set(Some(assignment.domain.clone())),
        v3: Set(None),
        v4: Set(None),
        v5: Set(None),
        ..Default::default()
    }
}

fn missing(rule: &CasbinRule, column: &str) -> StorageError {
    StorageError::InvalidRule {
        id: rule.id,
        message: format!("'{}' rule has no {column}", rule.ptype),
    }
}

fn grant_from_rule(rule: CasbinRule) -> StorageResult<Grant> {
    let role = rule.v0.clone().ok_or_else(|| missing(&rule, "v0"))?;
    let domain = rule.v1.clone().ok_or_else(|| missing(&rule, "v1"))?;
    let module = rule.v2.clone().ok_or_else(|| missing(&rule, "v2"))?;
    let action = rule.v3.clone().ok_or_else(|| missing(&rule, "v3"))?;
    Ok(Grant::new(role, domain, module, action))
}

fn assignment_from_rule(rule: CasbinRule) -> StorageResult<Assignment> {
    let user = rule.v0.clone().ok_or_else(|| missing(&rule, "v0"))?;
    let role = rule.v1.clone().ok_or_else(|| missing(&rule, "v1"))?;
    let domain = rule.v2.clone().ok_or_else(|| missing(&rule, "v2"))?;
    Ok(Assignment::new(user, role, domain))
}

#[async_trait]
impl PolicyAdapter for SeaOrmAdapter {
    async fn load_all(&self) -> AdapterResult<PolicySnapshot> {
        Ok(self.read().await?)
    }

    async fn save_all(&self, grants: &[Grant], assignments: &[Assignment]) -> AdapterResult<()> {
        self.replace(grants, assignments).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "database"
    }
}
