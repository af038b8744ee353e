//! # Grouped store registry
//!
//! Entries that declare the same group share one store. The store is built
//! lazily when the first member acquires it and disposed as soon as the last
//! member releases it:
//!
//! ```rust
//! use navscope_core::*;
//! use std::sync::Arc;
//!
//! let registry = GroupedStoreRegistry::new(|_group: &&'static str| ViewModelStore::new());
//!
//! let list = registry.acquire(1u64, "second-list").unwrap();
//! let detail = registry.acquire(2u64, "second-list").unwrap();
//! assert!(Arc::ptr_eq(&list, &detail));
//!
//! registry.release(&2);
//! assert_eq!(registry.member_count(&"second-list"), 1);
//! registry.release(&1);
//! assert!(registry.store_for(&"second-list").is_none());
//! ```
//!
//! The registry lives as long as its owning [`Scope`]: call
//! [`GroupedStoreRegistry::attach_to`] so that disposing the scope tears it
//! down. Dropping the registry tears it down as well.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Disposable, Dispose, RegistryError, Scope};

pub trait EntryKey: Eq + Hash + Clone + Debug + Send + 'static {}
impl<T> EntryKey for T where T: Eq + Hash + Clone + Debug + Send + 'static {}

pub trait GroupKey: Eq + Hash + Clone + Debug + Send + 'static {}
impl<T> GroupKey for T where T: Eq + Hash + Clone + Debug + Send + 'static {}

type Factory<G, S> = Box<dyn Fn(&G) -> S + Send + Sync>;

struct Group<E, S> {
    members: HashSet<E>,
    store: Arc<S>,
}

struct RegistryState<E, G, S> {
    entry_groups: HashMap<E, G>,
    groups: HashMap<G, Group<E, S>>,
    torn_down: bool,
}

impl<E, G, S> Default for RegistryState<E, G, S> {
    fn default() -> Self {
        Self {
            entry_groups: HashMap::new(),
            groups: HashMap::new(),
            torn_down: false,
        }
    }
}

impl<E: EntryKey, G: GroupKey, S> RegistryState<E, G, S> {
    /// Drops `entry` from its group; returns the store if the group emptied.
    fn detach(&mut self, entry: &E) -> Option<(G, Arc<S>)> {
        let group_key = self.entry_groups.remove(entry)?;
        let group = self.groups.get_mut(&group_key)?;
        group.members.remove(entry);
        if !group.members.is_empty() {
            return None;
        }
        self.groups
            .remove(&group_key)
            .map(|group| (group_key, group.store))
    }
}

/// Reference-counted owner of one store per group of entries.
///
/// All operations take a single internal lock, so the registry can be shared
/// across threads. The store factory runs under that lock and must not call
/// back into the registry. Stores are disposed after the lock is released.
pub struct GroupedStoreRegistry<E: EntryKey, G: GroupKey, S: Disposable> {
    state: Mutex<RegistryState<E, G, S>>,
    factory: Factory<G, S>,
}

impl<E: EntryKey, G: GroupKey, S: Disposable> GroupedStoreRegistry<E, G, S> {
    pub fn new(factory: impl Fn(&G) -> S + Send + Sync + 'static) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            factory: Box::new(factory),
        }
    }

    /// Creates a registry torn down together with `scope`.
    pub fn scoped(scope: &Scope, factory: impl Fn(&G) -> S + Send + Sync + 'static) -> Arc<Self> {
        let registry = Arc::new(Self::new(factory));
        registry.attach_to(scope);
        registry
    }

    /// Ties this registry's teardown to `scope`.
    ///
    /// The scope only holds a weak handle; dropping every `Arc` tears the
    /// registry down early through `Drop`.
    pub fn attach_to(self: &Arc<Self>, scope: &Scope) -> Dispose {
        let weak = Arc::downgrade(self);
        scope.add_disposer(move || {
            if let Some(registry) = weak.upgrade() {
                registry.teardown();
            }
        })
    }

    /// Joins `entry` to `group` and returns the group's shared store.
    pub fn acquire(&self, entry: E, group: G) -> Result<Arc<S>, RegistryError> {
        let (store, evicted) = {
            let mut state = self.state.lock();
            if state.torn_down {
                return Err(RegistryError::TornDown);
            }

            let mut evicted = None;
            match state.entry_groups.get(&entry).cloned() {
                Some(current) if current == group => {}
                Some(current) => {
                    log::debug!(
                        "store registry: entry {entry:?} moves from {current:?} to {group:?}"
                    );
                    evicted = state.detach(&entry);
                    state.entry_groups.insert(entry.clone(), group.clone());
                }
                None => {
                    state.entry_groups.insert(entry.clone(), group.clone());
                }
            }

            let factory = &self.factory;
            let record = state.groups.entry(group.clone()).or_insert_with(|| {
                log::debug!("store registry: creating store for group {group:?}");
                Group {
                    members: HashSet::new(),
                    store: Arc::new(factory(&group)),
                }
            });
            record.members.insert(entry);
            (record.store.clone(), evicted)
        };

        if let Some((group, store)) = evicted {
            dispose_store(&group, &store);
        }
        Ok(store)
    }

    /// Removes `entry` from its group, disposing the store if it was the last
    /// member. Unknown entries are ignored.
    pub fn release(&self, entry: &E) {
        let emptied = {
            let mut state = self.state.lock();
            if !state.entry_groups.contains_key(entry) {
                log::trace!("store registry: release of unknown entry {entry:?} ignored");
                return;
            }
            state.detach(entry)
        };

        if let Some((group, store)) = emptied {
            dispose_store(&group, &store);
        }
    }

    /// Disposes every live store and forgets all entries. Idempotent.
    pub fn teardown(&self) {
        let groups: Vec<(G, Group<E, S>)> = {
            let mut state = self.state.lock();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.entry_groups.clear();
            state.groups.drain().collect()
        };

        log::debug!("store registry: teardown disposing {} stores", groups.len());
        for (group, record) in groups {
            dispose_store(&group, &record.store);
        }
    }

    pub fn store_for(&self, group: &G) -> Option<Arc<S>> {
        self.state.lock().groups.get(group).map(|g| g.store.clone())
    }

    pub fn group_of(&self, entry: &E) -> Option<G> {
        self.state.lock().entry_groups.get(entry).cloned()
    }

    pub fn member_count(&self, group: &G) -> usize {
        self.state
            .lock()
            .groups
            .get(group)
            .map_or(0, |g| g.members.len())
    }

    pub fn group_count(&self) -> usize {
        self.state.lock().groups.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.lock().torn_down
    }
}

fn dispose_store<G: Debug, S: Disposable>(group: &G, store: &Arc<S>) {
    log::debug!("store registry: disposing store for group {group:?}");
    if let Err(e) = store.dispose() {
        log::warn!("store registry: disposing store for group {group:?} failed: {e}");
    }
}

impl<E: EntryKey, G: GroupKey, S: Disposable> Drop for GroupedStoreRegistry<E, G, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<E: EntryKey, G: GroupKey, S: Disposable> Debug for GroupedStoreRegistry<E, G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("GroupedStoreRegistry")
            .field("entries", &state.entry_groups)
            .field("groups", &state.groups.keys().collect::<Vec<_>>())
            .field("torn_down", &state.torn_down)
            .finish()
    }
}
