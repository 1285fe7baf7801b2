//! In-memory relation sets and partial-match filters

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{Assignment, Grant};

/// Insertion-ordered set
///
/// Iteration follows insertion order and removal keeps the relative order
/// of the remaining items, so projections built by walking the set are
/// deterministic for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    index: HashSet<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if absent. Returns whether the set changed.
    pub fn insert(&mut self, item: T) -> bool {
        if self.index.contains(&item) {
            return false;
        }
        self.index.insert(item.clone());
        self.items.push(item);
        true
    }

    /// Remove if present. Returns whether the set changed.
    pub fn remove(&mut self, item: &T) -> bool {
        if !self.index.remove(item) {
            return false;
        }
        self.items.retain(|existing| existing != item);
        true
    }

    /// Keep only items matching the predicate. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        let index = &mut self.index;
        self.items.retain(|item| {
            if keep(item) {
                true
            } else {
                index.remove(item);
                false
            }
        });
        before - self.items.len()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains(item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for OrderedSet<T> {}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The two relation sets the engine decides from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    grants: OrderedSet<Grant>,
    assignments: OrderedSet<Assignment>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tuple sequences; repeated tuples keep their first position
    pub fn from_tuples(
        grants: impl IntoIterator<Item = Grant>,
        assignments: impl IntoIterator<Item = Assignment>,
    ) -> Self {
        Self {
            grants: grants.into_iter().collect(),
            assignments: assignments.into_iter().collect(),
        }
    }

    pub fn grants(&self) -> &OrderedSet<Grant> {
        &self.grants
    }

    pub fn assignments(&self) -> &OrderedSet<Assignment> {
        &self.assignments
    }

    pub fn grants_mut(&mut self) -> &mut OrderedSet<Grant> {
        &mut self.grants
    }

    pub fn assignments_mut(&mut self) -> &mut OrderedSet<Assignment> {
        &mut self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.assignments.is_empty()
    }

    /// Grants matching the filter, in store order
    pub fn filter_grants<'a>(&'a self, filter: &'a GrantFilter) -> impl Iterator<Item = &'a Grant> + 'a {
        self.grants.iter().filter(move |grant| filter.matches(grant))
    }

    /// Assignments matching the filter, in store order
    pub fn filter_assignments<'a>(
        &'a self,
        filter: &'a AssignmentFilter,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments.iter().filter(move |assignment| filter.matches(assignment))
    }
}

fn field_matches(filter: &Option<String>, value: &str) -> bool {
    filter.as_deref().map_or(true, |expected| expected == value)
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|v| !v.is_empty())
}

/// Partial-match predicate over grants; an unset or empty field matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    pub role: Option<String>,
    pub domain: Option<String>,
    pub module: Option<String>,
    pub action: Option<String>,
}

impl GrantFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = non_empty(role);
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = non_empty(domain);
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = non_empty(module);
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = non_empty(action);
        self
    }

    /// True when no field is constrained
    pub fn is_unbounded(&self) -> bool {
        self.role.is_none() && self.domain.is_none() && self.module.is_none() && self.action.is_none()
    }

    pub fn matches(&self, grant: &Grant) -> bool {
        field_matches(&self.role, &grant.role)
            && field_matches(&self.domain, &grant.domain)
            && field_matches(&self.module, &grant.module)
            && field_matches(&self.action, &grant.action)
    }
}

/// Partial-match predicate over assignments; an unset or empty field matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub user: Option<String>,
    pub role: Option<String>,
    pub domain: Option<String>,
}

impl AssignmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = non_empty(user);
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = non_empty(role);
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = non_empty(domain);
        self
    }

    /// True when no field is constrained
    pub fn is_unbounded(&self) -> bool {
        self.user.is_none() && self.role.is_none() && self.domain.is_none()
    }

    pub fn matches(&self, assignment: &Assignment) -> bool {
        field_matches(&self.user, &assignment.user)
            && field_matches(&self.role, &assignment.role)
            && field_matches(&self.domain, &assignment.domain)
    }
}
