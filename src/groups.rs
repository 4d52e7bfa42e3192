use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::actor::Actor;

pub type Predicate = dyn Fn(&dyn Actor) -> bool + Send + Sync;

/// A named predicate over actors.
pub struct Group {
    name: String,
    predicate: Arc<Predicate>,
}

impl Group {
    pub fn new(name: impl Into<String>, predicate: impl Fn(&dyn Actor) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, actor: &dyn Actor) -> bool {
        (self.predicate)(actor)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group").field("name", &self.name).finish()
    }
}

/// Name to predicate mapping consulted by the group gate.
///
/// Registrations are expected at startup, lookups on every evaluation. The
/// lock is released before any predicate runs, so a panicking predicate can
/// never poison it; a poisoned lock is recovered all the same.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

static GLOBAL: OnceLock<Arc<GroupRegistry>> = OnceLock::new();

/// The process-wide registry, created on first use.
pub fn global() -> Arc<GroupRegistry> {
    GLOBAL
        .get_or_init(|| Arc::new(GroupRegistry::new()))
        .clone()
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group, replacing any previous group with the same name.
    pub fn register(
        &self,
        name: impl Into<String>,
        predicate: impl Fn(&dyn Actor) -> bool + Send + Sync + 'static,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name, predicate));
        tracing::debug!(group = group.name(), "registered group");
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group.name().to_string(), group.clone());
        group
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<Group>> {
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn unregister_all(&self) {
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the named group exists and its predicate accepts `actor`.
    /// Unknown names never match.
    pub fn matches(&self, name: &str, actor: &dyn Actor) -> bool {
        match self.get(name) {
            Some(group) => group.matches(actor),
            None => false,
        }
    }
}
