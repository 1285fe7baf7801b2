//! Domain-scoped role-based access control
//!
//! Answers "may user U perform action A on module M within domain D?" from
//! two relation sets:
//! - Grants `(role, domain, module, action)`, where the action may be the
//!   wildcard
//! - Assignments `(user, role, domain)`
//!
//! Holding the reserved admin role in a domain allows everything in that
//! domain. Relations are held by a [`RelationStore`] and persisted through a
//! [`PolicyAdapter`]; [`Gate`] is the facade most callers want.

pub mod adapter;
pub mod enforcer;
pub mod error;
pub mod gate;
pub mod matcher;
pub mod models;
pub mod query;
pub mod relations;
pub mod sentinel;
pub mod store;

pub use adapter::{MemoryAdapter, PolicyAdapter, PolicySnapshot};
pub use enforcer::Enforcer;
pub use error::{AdapterError, AdapterResult, GateError, GateResult};
pub use gate::Gate;
pub use models::{AccessRequest, Assignment, Grant, UserRole};
pub use relations::{AssignmentFilter, GrantFilter, OrderedSet, Relations};
pub use sentinel::{Sentinels, ADMIN_ROLE, WILDCARD_ACTION};
pub use store::RelationStore;

/// Re-export the settings the gate is built from
pub use gate_config::RbacSettings;
