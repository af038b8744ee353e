//! # Stores
//!
//! A store is whatever resource a group of entries shares. The registry only
//! needs to know how to dispose one, which is what [`Disposable`] describes.
//!
//! [`ViewModelStore`] is the store the navigation layer hands out: a keyed bag
//! of view models that are told when they are cleared.
//!
//! ```rust
//! use navscope_core::*;
//!
//! struct Counter(std::sync::atomic::AtomicUsize);
//! impl ViewModel for Counter {}
//!
//! let store = ViewModelStore::new();
//! let a = store
//!     .get_or_insert_with("counter", || Counter(Default::default()))
//!     .unwrap();
//! let b = store
//!     .get_or_insert_with("counter", || Counter(Default::default()))
//!     .unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::StoreError;

/// A resource owned by exactly one group for its lifetime.
pub trait Disposable: Send + Sync + 'static {
    /// Releases held resources. Called at most once by the registry.
    fn dispose(&self) -> Result<(), StoreError>;
}

/// State holder living in a [`ViewModelStore`].
pub trait ViewModel: Send + Sync + 'static {
    fn on_cleared(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct Slot {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    clear: Box<dyn Fn() -> Result<(), StoreError> + Send + Sync>,
}

#[derive(Default)]
pub struct ViewModelStore {
    slots: Mutex<BTreeMap<String, Slot>>,
}

impl ViewModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the model under `key`, creating it with `init` if absent.
    ///
    /// `init` runs under the store lock and must not touch this store.
    pub fn get_or_insert_with<T: ViewModel>(
        &self,
        key: impl Into<String>,
        init: impl FnOnce() -> T,
    ) -> Result<Arc<T>, StoreError> {
        let key = key.into();
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(&key) {
            return downcast_slot(&key, slot);
        }

        let model = Arc::new(init());
        let for_clear = model.clone();
        slots.insert(
            key.clone(),
            Slot {
                value: model.clone(),
                type_name: type_name::<T>(),
                clear: Box::new(move || for_clear.on_cleared()),
            },
        );
        log::trace!("view model store: created `{key}` ({})", type_name::<T>());
        Ok(model)
    }

    pub fn get<T: ViewModel>(&self, key: &str) -> Result<Option<Arc<T>>, StoreError> {
        let slots = self.slots.lock();
        slots.get(key).map(|s| downcast_slot(key, s)).transpose()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.slots.lock().keys().cloned().collect()
    }

    /// Removes every model and calls `on_cleared` on each, in key order.
    ///
    /// A failing model does not stop the others from being cleared. The store
    /// is empty afterwards either way and may be reused.
    pub fn clear(&self) -> Result<(), StoreError> {
        let drained = std::mem::take(&mut *self.slots.lock());
        let total = drained.len();
        let failures: Vec<StoreError> = drained
            .into_iter()
            .filter_map(|(key, slot)| match (slot.clear)() {
                Ok(()) => None,
                Err(StoreError::ViewModel { reason, .. }) => {
                    Some(StoreError::ViewModel { key, reason })
                }
                Err(e) => Some(StoreError::view_model(key, e.to_string())),
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StoreError::ClearFailed { total, failures })
        }
    }
}

fn downcast_slot<T: ViewModel>(key: &str, slot: &Slot) -> Result<Arc<T>, StoreError> {
    slot.value
        .clone()
        .downcast::<T>()
        .map_err(|_| StoreError::TypeMismatch {
            key: key.to_string(),
            found: slot.type_name,
            requested: type_name::<T>(),
        })
}

impl Disposable for ViewModelStore {
    fn dispose(&self) -> Result<(), StoreError> {
        self.clear()
    }
}

impl std::fmt::Debug for ViewModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModelStore")
            .field("keys", &self.keys())
            .finish()
    }
}
