//! Navigation (Nav3-like) back stack with entry decorators.
//!
//! Entries are pushed with a key; the host's entry provider maps each key to
//! its [`Metadata`] and content. Decorators run for every rendered entry and
//! fill in its [`EntryContext`]: saved state, a per-entry store, and a store
//! shared with every other entry naming the same group in its metadata.

use std::{any::Any, cell::RefCell, collections::BTreeMap, fmt::Debug, rc::Rc};

use navscope_core::{Dispose, Scope};

pub mod config;
pub mod decorators;
pub mod error;
pub mod host;
pub mod owner;
pub mod tests;

pub use config::*;
pub use decorators::*;
pub use error::*;
pub use host::*;
pub use owner::*;

pub trait NavKey: Clone + Debug + 'static {}
impl<T> NavKey for T where T: Clone + Debug + 'static {}

/// Unique per pushed entry; never reused within one back stack.
pub type EntryId = u64;

#[derive(Default)]
pub struct SavedState {
    map: RefCell<std::collections::HashMap<&'static str, Box<dyn Any>>>,
    results: RefCell<std::collections::HashMap<&'static str, Box<dyn Any>>>,
}
impl SavedState {
    pub fn remember<T: 'static + Clone>(
        &self,
        key: &'static str,
        init: impl FnOnce() -> T,
    ) -> Rc<RefCell<T>> {
        if let Some(b) = self.map.borrow().get(key)
            && let Some(rc) = b.downcast_ref::<Rc<RefCell<T>>>()
        {
            return rc.clone();
        }
        let rc = Rc::new(RefCell::new(init()));
        self.map.borrow_mut().insert(key, Box::new(rc.clone()));
        rc
    }
    pub fn contains(&self, key: &'static str) -> bool {
        self.map.borrow().contains_key(key)
    }
    pub fn set_result<T: 'static>(&self, key: &'static str, val: T) {
        self.results.borrow_mut().insert(key, Box::new(val));
    }
    pub fn take_result<T: 'static>(&self, key: &'static str) -> Option<T> {
        self.results
            .borrow_mut()
            .remove(key)?
            .downcast::<T>()
            .ok()
            .map(|b| *b)
    }
}

impl Debug for SavedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedState")
            .field("slots", &self.map.borrow().keys().collect::<Vec<_>>())
            .field("results", &self.results.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// String metadata attached to an entry by the entry provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
    /// Entries from `other` win on conflicts.
    pub fn merge(mut self, other: Metadata) -> Self {
        self.0.extend(other.0);
        self
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Snapshot of one back-stack entry.
#[derive(Clone, Debug)]
pub struct NavEntry<K: NavKey> {
    pub id: EntryId,
    pub key: K,
    pub saved: Rc<SavedState>,
    /// Disposed when the entry is popped.
    pub scope: Scope,
}

type PopListener = Rc<dyn Fn(EntryId)>;

struct BackState<K: NavKey> {
    entries: Vec<NavEntry<K>>,
    next_id: EntryId,
    listeners: Vec<(u64, PopListener)>,
    next_listener: u64,
}

#[derive(Clone)]
pub struct NavBackStack<K: NavKey> {
    inner: Rc<RefCell<BackState<K>>>,
}
impl<K: NavKey> NavBackStack<K> {
    pub fn new(start: K) -> Self {
        let stack = Self {
            inner: Rc::new(RefCell::new(BackState {
                entries: Vec::new(),
                next_id: 1,
                listeners: Vec::new(),
                next_listener: 0,
            })),
        };
        stack.push_inner(start);
        stack
    }

    pub fn top(&self) -> Option<NavEntry<K>> {
        self.inner.borrow().entries.last().cloned()
    }
    pub fn entries(&self) -> Vec<NavEntry<K>> {
        self.inner.borrow().entries.clone()
    }
    pub fn keys(&self) -> Vec<K> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.key.clone())
            .collect()
    }
    pub fn size(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Calls `f` with the id of every entry removed from the stack, after the
    /// entry's scope is disposed. Running the returned handle unsubscribes.
    pub fn on_pop(&self, f: impl Fn(EntryId) + 'static) -> Dispose {
        let id = {
            let mut s = self.inner.borrow_mut();
            let id = s.next_listener;
            s.next_listener += 1;
            s.listeners.push((id, Rc::new(f)));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(l, _)| *l != id);
            }
        })
    }

    fn push_inner(&self, key: K) -> EntryId {
        let mut s = self.inner.borrow_mut();
        let id = s.next_id;
        s.next_id += 1;
        s.entries.push(NavEntry {
            id,
            key,
            saved: Rc::new(SavedState::default()),
            scope: Scope::new(),
        });
        id
    }

    /// Pop the top entry (if any), dispose its scope and notify listeners.
    fn pop_inner(&self) -> bool {
        let (entry, listeners) = {
            let mut s = self.inner.borrow_mut();
            let listeners: Vec<PopListener> = s.listeners.iter().map(|(_, l)| l.clone()).collect();
            (s.entries.pop(), listeners)
        };

        match entry {
            Some(e) => {
                log::debug!("nav: popped entry {} ({:?})", e.id, e.key);
                e.scope.dispose();
                for l in listeners {
                    l(e.id);
                }
                true
            }
            None => false,
        }
    }

    /// Replacing drops the old entry entirely; the new key gets a fresh id.
    fn replace_inner(&self, key: K) {
        if self.size() > 0 {
            self.pop_inner();
        }
        self.push_inner(key);
    }
}

impl<K: NavKey> Debug for NavBackStack<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.inner.borrow();
        f.debug_struct("NavBackStack")
            .field(
                "entries",
                &s.entries.iter().map(|e| (e.id, &e.key)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Clone)]
pub struct Navigator<K: NavKey> {
    pub stack: NavBackStack<K>,
}
impl<K: NavKey> Navigator<K> {
    pub fn push(&self, k: K) -> EntryId {
        self.stack.push_inner(k)
    }
    pub fn replace(&self, k: K) {
        self.stack.replace_inner(k);
    }
    pub fn pop(&self) -> bool {
        // Don't pop if only one entry is present
        if self.stack.size() <= 1 {
            return false;
        }
        self.stack.pop_inner()
    }
    pub fn clear_and_push(&self, k: K) {
        while self.stack.pop_inner() {}
        self.stack.push_inner(k);
    }
    pub fn pop_to<F: Fn(&K) -> bool>(&self, pred: F, inclusive: bool) {
        let count = {
            let s = self.stack.inner.borrow();
            if let Some(idx) = s.entries.iter().rposition(|e| pred(&e.key)) {
                s.entries.len() - idx - (if inclusive { 0 } else { 1 })
            } else {
                0
            }
        };
        for _ in 0..count {
            let _ = self.stack.pop_inner();
        }
    }
}
