//! Relation store: the single owner of grants and assignments

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::adapter::PolicyAdapter;
use crate::error::GateResult;
use crate::models::{Assignment, Grant};
use crate::relations::{AssignmentFilter, GrantFilter, Relations};

/// In-memory grant and assignment sets backed by a [`PolicyAdapter`]
///
/// Reads share the lock; mutations and loads take it exclusively. With
/// autosave on, a mutation that changed the sets is flushed to the adapter
/// before the call returns. The write guard is downgraded for the flush so
/// readers are not blocked on I/O while other writers still are.
pub struct RelationStore {
    relations: RwLock<Relations>,
    adapter: Arc<dyn PolicyAdapter>,
    autosave: AtomicBool,
}

impl RelationStore {
    /// Create an empty store with autosave enabled; nothing is loaded
    pub fn new(adapter: Arc<dyn PolicyAdapter>) -> Self {
        Self {
            relations: RwLock::new(Relations::new()),
            adapter,
            autosave: AtomicBool::new(true),
        }
    }

    /// Create a store and populate it from the adapter
    pub async fn open(adapter: Arc<dyn PolicyAdapter>) -> GateResult<Self> {
        let store = Self::new(adapter);
        store.load().await?;
        Ok(store)
    }

    pub fn autosave(&self) -> bool {
        self.autosave.load(Ordering::SeqCst)
    }

    pub fn set_autosave(&self, enabled: bool) {
        self.autosave.store(enabled, Ordering::SeqCst);
    }

    /// Insert a grant if absent. Returns whether the store changed.
    pub async fn add_grant(&self, grant: Grant) -> GateResult<bool> {
        let changed = self
            .mutate("add_grant", |relations| relations.grants_mut().insert(grant) as usize)
            .await?;
        Ok(changed > 0)
    }

    /// Delete a grant if present; an absent grant is not an error
    pub async fn remove_grant(&self, grant: &Grant) -> GateResult<bool> {
        let changed = self
            .mutate("remove_grant", |relations| relations.grants_mut().remove(grant) as usize)
            .await?;
        Ok(changed > 0)
    }

    /// Insert an assignment if absent. Returns whether the store changed.
    pub async fn add_assignment(&self, assignment: Assignment) -> GateResult<bool> {
        let changed = self
            .mutate("add_assignment", |relations| {
                relations.assignments_mut().insert(assignment) as usize
            })
            .await?;
        Ok(changed > 0)
    }

    /// Delete an assignment if present; an absent assignment is not an error
    pub async fn remove_assignment(&self, assignment: &Assignment) -> GateResult<bool> {
        let changed = self
            .mutate("remove_assignment", |relations| {
                relations.assignments_mut().remove(assignment) as usize
            })
            .await?;
        Ok(changed > 0)
    }

    /// Insert many relations under one lock and one flush
    ///
    /// Returns how many tuples were new.
    pub async fn extend(
        &self,
        grants: impl IntoIterator<Item = Grant>,
        assignments: impl IntoIterator<Item = Assignment>,
    ) -> GateResult<usize> {
        self.mutate("extend", |relations| {
            let mut added = 0;
            for grant in grants {
                added += relations.grants_mut().insert(grant) as usize;
            }
            for assignment in assignments {
                added += relations.assignments_mut().insert(assignment) as usize;
            }
            added
        })
        .await
    }

    /// Remove every grant and assignment matching the filters
    ///
    /// An unbounded filter removes nothing from its set. Returns the number
    /// of tuples removed.
    pub async fn remove_filtered(
        &self,
        grants: &GrantFilter,
        assignments: &AssignmentFilter,
    ) -> GateResult<usize> {
        self.mutate("remove_filtered", |relations| {
            let mut removed = 0;
            if !grants.is_unbounded() {
                removed += relations.grants_mut().retain(|grant| !grants.matches(grant));
            }
            if !assignments.is_unbounded() {
                removed += relations
                    .assignments_mut()
                    .retain(|assignment| !assignments.matches(assignment));
            }
            removed
        })
        .await
    }

    /// Remove every grant matching the filter
    pub async fn remove_grants_matching(&self, filter: &GrantFilter) -> GateResult<usize> {
        self.remove_filtered(filter, &AssignmentFilter::default()).await
    }

    /// Remove every assignment matching the filter
    pub async fn remove_assignments_matching(&self, filter: &AssignmentFilter) -> GateResult<usize> {
        self.remove_filtered(&GrantFilter::default(), filter).await
    }

    /// Grants matching the filter, in store order
    pub async fn filter_grants(&self, filter: &GrantFilter) -> Vec<Grant> {
        let relations = self.relations.read().await;
        relations.filter_grants(filter).cloned().collect()
    }

    /// Assignments matching the filter, in store order
    pub async fn filter_assignments(&self, filter: &AssignmentFilter) -> Vec<Assignment> {
        let relations = self.relations.read().await;
        relations.filter_assignments(filter).cloned().collect()
    }

    /// Owned copy of the current relation sets
    pub async fn snapshot(&self) -> Relations {
        self.relations.read().await.clone()
    }

    /// Shared access to the current relation sets for the duration of one call
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Relations> {
        self.relations.read().await
    }

    /// Discard in-memory state and repopulate from the adapter
    ///
    /// On failure the in-memory state is left untouched.
    pub async fn load(&self) -> GateResult<()> {
        let mut relations = self.relations.write().await;
        let snapshot = self.adapter.load_all().await?;
        *relations = Relations::from_tuples(snapshot.grants, snapshot.assignments);

        info!(
            adapter = self.adapter.name(),
            grants = relations.grants().len(),
            assignments = relations.assignments().len(),
            "Loaded policy"
        );
        Ok(())
    }

    /// Flush in-memory state to the adapter
    pub async fn save(&self) -> GateResult<()> {
        let relations = self.relations.read().await;
        self.persist(&relations).await
    }

    async fn persist(&self, relations: &Relations) -> GateResult<()> {
        self.adapter
            .save_all(relations.grants().as_slice(), relations.assignments().as_slice())
            .await?;

        debug!(
            adapter = self.adapter.name(),
            grants = relations.grants().len(),
            assignments = relations.assignments().len(),
            "Saved policy"
        );
        Ok(())
    }

    /// Apply a mutation under the write lock, then autosave if it changed anything
    ///
    /// A failed flush keeps the mutation in memory and reports the error.
    async fn mutate<F>(&self, operation: &'static str, apply: F) -> GateResult<usize>
    where
        F: FnOnce(&mut Relations) -> usize,
    {
        let mut relations = self.relations.write().await;
        let changed = apply(&mut relations);
        debug!(operation, changed, "Applied relation mutation");

        if changed == 0 || !self.autosave() {
            return Ok(changed);
        }

        let relations = relations.downgrade();
        if let Err(err) = self.persist(&relations).await {
            warn!(
                operation,
                adapter = self.adapter.name(),
                error = %err,
                "Autosave failed, in-memory state is ahead of storage"
            );
            return Err(err);
        }
        Ok(changed)
    }
}
