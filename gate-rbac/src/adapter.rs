//! Storage adapter contract and the in-memory adapter

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{AdapterError, AdapterResult};
use crate::models::{Assignment, Grant};

/// Everything a backing store holds, in the order it holds it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySnapshot {
    pub grants: Vec<Grant>,
    pub assignments: Vec<Assignment>,
}

impl PolicySnapshot {
    pub fn new(grants: Vec<Grant>, assignments: Vec<Assignment>) -> Self {
        Self { grants, assignments }
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.assignments.is_empty()
    }
}

/// Durable backing for the relation store
///
/// Implementations replace their whole contents on `save_all`; the store
/// never asks for incremental writes.
#[async_trait]
pub trait PolicyAdapter: Send + Sync {
    /// Read every grant and assignment
    async fn load_all(&self) -> AdapterResult<PolicySnapshot>;

    /// Replace stored contents with the given relations
    async fn save_all(&self, grants: &[Grant], assignments: &[Assignment]) -> AdapterResult<()>;

    /// Short backend name for log output
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Adapter keeping relations in process memory
///
/// Used when durability is not wanted and as a test fixture: loads and
/// saves can be made to fail on demand, and saves are counted.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    snapshot: Mutex<PolicySnapshot>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryAdapter {
    /// Create an empty adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter pre-populated with relations
    pub fn with_snapshot(snapshot: PolicySnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    /// Currently persisted relations
    pub fn snapshot(&self) -> PolicySnapshot {
        self.lock().clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, PolicySnapshot> {
        // A panic while holding the lock cannot leave a half-written snapshot
        self.snapshot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PolicyAdapter for MemoryAdapter {
    async fn load_all(&self) -> AdapterResult<PolicySnapshot> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AdapterError::new("memory adapter: load failure injected"));
        }
        Ok(self.snapshot())
    }

    async fn save_all(&self, grants: &[Grant], assignments: &[Assignment]) -> AdapterResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AdapterError::new("memory adapter: save failure injected"));
        }
        *self.lock() = PolicySnapshot::new(grants.to_vec(), assignments.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
