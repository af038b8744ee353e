use std::cell::RefCell;
use std::rc::Rc;

use navscope_core::{Dispose, Scope};

use crate::{
    EntryContext, EntryDecorator, EntryId, EntryStoreOwner, Metadata, NavBackStack, NavEntry,
    NavError, NavKey, Navigator, SavedState, SharedStoreOwner,
};

/// What the entry provider returns for a key.
pub struct EntryContent<K: NavKey, R> {
    pub metadata: Metadata,
    pub content: EntryRenderer<K, R>,
}

pub type EntryRenderer<K, R> = Rc<dyn Fn(&EntryScope<K>) -> R>;
pub type EntryProvider<K, R> = Rc<dyn Fn(&K) -> EntryContent<K, R>>;

pub fn entry<K: NavKey, R>(
    metadata: Metadata,
    f: impl Fn(&EntryScope<K>) -> R + 'static,
) -> EntryContent<K, R> {
    EntryContent {
        metadata,
        content: Rc::new(f),
    }
}

/// Context passed to entry content; replaces any ambient lookup.
pub struct EntryScope<K: NavKey> {
    entry: NavEntry<K>,
    metadata: Metadata,
    ctx: EntryContext,
    nav: Navigator<K>,
}
impl<K: NavKey> EntryScope<K> {
    pub fn id(&self) -> EntryId {
        self.entry.id
    }
    pub fn key(&self) -> &K {
        &self.entry.key
    }
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    pub fn navigator(&self) -> Navigator<K> {
        self.nav.clone()
    }
    /// Disposed when this entry is popped.
    pub fn scope(&self) -> &Scope {
        &self.entry.scope
    }
    pub fn saved_state(&self) -> &Rc<SavedState> {
        &self.entry.saved
    }
    pub fn context(&self) -> &EntryContext {
        &self.ctx
    }
    pub fn shared_owner(&self) -> Result<&SharedStoreOwner, NavError> {
        self.ctx
            .shared_owner
            .as_ref()
            .ok_or(NavError::MissingSharedOwner)
    }
    pub fn entry_owner(&self) -> Result<&EntryStoreOwner, NavError> {
        self.ctx
            .entry_owner
            .as_ref()
            .ok_or(NavError::MissingEntryOwner)
    }
    pub fn remember_saveable<T: 'static + Clone>(
        &self,
        slot: &'static str,
        init: impl FnOnce() -> T,
    ) -> Rc<RefCell<T>> {
        self.entry.saved.remember(slot, init)
    }
    pub fn set_result<T: 'static>(&self, slot: &'static str, v: T) {
        self.entry.saved.set_result(slot, v)
    }
    pub fn take_result<T: 'static>(&self, slot: &'static str) -> Option<T> {
        self.entry.saved.take_result(slot)
    }
}

/// Renders back-stack entries through a decorator chain.
///
/// Every decorator hears about every pop for as long as the host's scope is
/// alive.
pub struct NavHost<K: NavKey, R> {
    stack: NavBackStack<K>,
    decorators: Rc<Vec<Rc<dyn EntryDecorator<K>>>>,
    provider: EntryProvider<K, R>,
    pop_subscription: Dispose,
}

impl<K: NavKey, R> NavHost<K, R> {
    pub fn new(
        scope: &Scope,
        stack: NavBackStack<K>,
        decorators: Vec<Rc<dyn EntryDecorator<K>>>,
        provider: impl Fn(&K) -> EntryContent<K, R> + 'static,
    ) -> Self {
        let decorators = Rc::new(decorators);
        let pop_subscription = {
            let decorators = Rc::downgrade(&decorators);
            stack.on_pop(move |id| {
                if let Some(decorators) = decorators.upgrade() {
                    for d in decorators.iter().rev() {
                        d.on_pop(id);
                    }
                }
            })
        };
        let unsubscribe = pop_subscription.clone();
        scope.add_disposer(move || unsubscribe.run());

        Self {
            stack,
            decorators,
            provider: Rc::new(provider),
            pop_subscription,
        }
    }

    pub fn navigator(&self) -> Navigator<K> {
        Navigator {
            stack: self.stack.clone(),
        }
    }

    pub fn stack(&self) -> &NavBackStack<K> {
        &self.stack
    }

    /// Renders the top entry; `None` on an empty stack.
    pub fn render(&self) -> Result<Option<R>, NavError> {
        self.stack
            .top()
            .map(|entry| self.render_entry(&entry))
            .transpose()
    }

    /// Runs the decorator chain for `entry`, then its content.
    pub fn render_entry(&self, entry: &NavEntry<K>) -> Result<R, NavError> {
        let EntryContent { metadata, content } = (self.provider)(&entry.key);
        let mut ctx = EntryContext::default();
        for d in self.decorators.iter() {
            d.decorate(entry, &metadata, &mut ctx)?;
        }
        let scope = EntryScope {
            entry: entry.clone(),
            metadata,
            ctx,
            nav: self.navigator(),
        };
        Ok(content(&scope))
    }
}

impl<K: NavKey, R> Drop for NavHost<K, R> {
    fn drop(&mut self) {
        self.pop_subscription.run();
    }
}
