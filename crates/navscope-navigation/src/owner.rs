use std::rc::Rc;
use std::sync::Arc;

use navscope_core::{ViewModel, ViewModelStore};

use crate::{EntryId, NavError, SavedState};

/// Something content can create view models from.
pub trait StoreOwner {
    fn store(&self) -> &Arc<ViewModelStore>;

    /// Saved state handed to view model initializers.
    fn saved_state(&self) -> &Rc<SavedState>;

    /// Returns the view model under `key`, creating it on first use.
    fn view_model<T: ViewModel>(
        &self,
        key: &str,
        init: impl FnOnce(&SavedState) -> T,
    ) -> Result<Arc<T>, NavError>
    where
        Self: Sized,
    {
        let saved = self.saved_state();
        Ok(self.store().get_or_insert_with(key, || init(saved))?)
    }
}

/// Owner of the store shared by every entry in `group`.
///
/// Saved state comes from the entry being decorated, so models created here
/// see the state of whichever member created them first.
#[derive(Clone, Debug)]
pub struct SharedStoreOwner {
    group: String,
    store: Arc<ViewModelStore>,
    saved: Rc<SavedState>,
}

impl SharedStoreOwner {
    pub fn new(group: impl Into<String>, store: Arc<ViewModelStore>, saved: Rc<SavedState>) -> Self {
        Self {
            group: group.into(),
            store,
            saved,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

impl StoreOwner for SharedStoreOwner {
    fn store(&self) -> &Arc<ViewModelStore> {
        &self.store
    }
    fn saved_state(&self) -> &Rc<SavedState> {
        &self.saved
    }
}

/// Owner of a store private to one entry.
#[derive(Clone, Debug)]
pub struct EntryStoreOwner {
    entry: EntryId,
    store: Arc<ViewModelStore>,
    saved: Rc<SavedState>,
}

impl EntryStoreOwner {
    pub fn new(entry: EntryId, store: Arc<ViewModelStore>, saved: Rc<SavedState>) -> Self {
        Self { entry, store, saved }
    }

    pub fn entry(&self) -> EntryId {
        self.entry
    }
}

impl StoreOwner for EntryStoreOwner {
    fn store(&self) -> &Arc<ViewModelStore> {
        &self.store
    }
    fn saved_state(&self) -> &Rc<SavedState> {
        &self.saved
    }
}
