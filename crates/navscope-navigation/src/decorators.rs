//! # Entry decorators
//!
//! A decorator runs every time an entry is rendered and may add to the
//! entry's [`EntryContext`]. It is told through [`EntryDecorator::on_pop`]
//! when the entry leaves the back stack.
//!
//! The usual chain is:
//!
//! 1. [`SavedStateDecorator`]: hands the entry's saved state to the others.
//! 2. [`EntryStoreDecorator`]: one view model store per entry.
//! 3. [`SharedStoreDecorator`]: one store per group named in entry metadata,
//!    alive until the last entry of the group is popped.
//!
//! Store decorators release on pop only when their [`RemovalPolicy`] agrees.
//! A host that rebuilds its entries without really leaving them (say, while
//! recreating its window) returns `false` from the policy for that period.

use std::rc::Rc;
use std::sync::Arc;

use navscope_core::{GroupedStoreRegistry, Scope, ViewModelStore};

use crate::{
    EntryId, EntryStoreOwner, Metadata, NavEntry, NavError, NavKey, SavedState, SharedStoreConfig,
    SharedStoreOwner,
};

/// Everything the decorator chain resolved for one entry.
#[derive(Clone, Debug, Default)]
pub struct EntryContext {
    pub saved: Option<Rc<SavedState>>,
    pub entry_owner: Option<EntryStoreOwner>,
    pub shared_owner: Option<SharedStoreOwner>,
}

pub trait EntryDecorator<K: NavKey> {
    fn decorate(
        &self,
        entry: &NavEntry<K>,
        metadata: &Metadata,
        ctx: &mut EntryContext,
    ) -> Result<(), NavError>;

    fn on_pop(&self, _entry: EntryId) {}
}

/// Decides whether a popped entry's store membership is dropped.
#[derive(Clone)]
pub struct RemovalPolicy(Rc<dyn Fn() -> bool>);

impl RemovalPolicy {
    pub fn always() -> Self {
        Self(Rc::new(|| true))
    }
    pub fn from_fn(f: impl Fn() -> bool + 'static) -> Self {
        Self(Rc::new(f))
    }
    pub fn should_remove(&self) -> bool {
        (self.0)()
    }
}

impl Default for RemovalPolicy {
    fn default() -> Self {
        Self::always()
    }
}

impl std::fmt::Debug for RemovalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RemovalPolicy(..)")
    }
}

fn require_saved(ctx: &EntryContext, decorator: &'static str) -> Result<Rc<SavedState>, NavError> {
    ctx.saved
        .clone()
        .ok_or(NavError::MissingSavedState { decorator })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SavedStateDecorator;

impl<K: NavKey> EntryDecorator<K> for SavedStateDecorator {
    fn decorate(
        &self,
        entry: &NavEntry<K>,
        _metadata: &Metadata,
        ctx: &mut EntryContext,
    ) -> Result<(), NavError> {
        ctx.saved = Some(entry.saved.clone());
        Ok(())
    }
}

pub type EntryStoreRegistry = GroupedStoreRegistry<EntryId, EntryId, ViewModelStore>;
pub type SharedStoreRegistry = GroupedStoreRegistry<EntryId, String, ViewModelStore>;

/// Gives every entry a store of its own, cleared when the entry is popped.
pub struct EntryStoreDecorator {
    registry: Arc<EntryStoreRegistry>,
    policy: RemovalPolicy,
}

impl EntryStoreDecorator {
    /// Stores live no longer than `scope`.
    pub fn new(scope: &Scope, policy: RemovalPolicy) -> Self {
        Self {
            registry: GroupedStoreRegistry::scoped(scope, |_: &EntryId| ViewModelStore::new()),
            policy,
        }
    }

    pub fn registry(&self) -> &Arc<EntryStoreRegistry> {
        &self.registry
    }
}

impl<K: NavKey> EntryDecorator<K> for EntryStoreDecorator {
    fn decorate(
        &self,
        entry: &NavEntry<K>,
        _metadata: &Metadata,
        ctx: &mut EntryContext,
    ) -> Result<(), NavError> {
        let saved = require_saved(ctx, "EntryStoreDecorator")?;
        let store = self.registry.acquire(entry.id, entry.id)?;
        ctx.entry_owner = Some(EntryStoreOwner::new(entry.id, store, saved));
        Ok(())
    }

    fn on_pop(&self, entry: EntryId) {
        if self.policy.should_remove() {
            self.registry.release(&entry);
        }
    }
}

/// Shares one store between all entries whose metadata names the same group.
///
/// Entries without the configured metadata key get no shared owner.
pub struct SharedStoreDecorator {
    config: SharedStoreConfig,
    registry: Arc<SharedStoreRegistry>,
    policy: RemovalPolicy,
}

impl SharedStoreDecorator {
    /// Stores live no longer than `scope`.
    pub fn new(scope: &Scope, config: SharedStoreConfig, policy: RemovalPolicy) -> Self {
        Self::with_registry(
            GroupedStoreRegistry::scoped(scope, |_: &String| ViewModelStore::new()),
            config,
            policy,
        )
    }

    pub fn with_registry(
        registry: Arc<SharedStoreRegistry>,
        config: SharedStoreConfig,
        policy: RemovalPolicy,
    ) -> Self {
        Self {
            config,
            registry,
            policy,
        }
    }

    pub fn config(&self) -> &SharedStoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SharedStoreRegistry> {
        &self.registry
    }
}

impl<K: NavKey> EntryDecorator<K> for SharedStoreDecorator {
    fn decorate(
        &self,
        entry: &NavEntry<K>,
        metadata: &Metadata,
        ctx: &mut EntryContext,
    ) -> Result<(), NavError> {
        let Some(group) = metadata.get(&self.config.metadata_key) else {
            ctx.shared_owner = None;
            return Ok(());
        };
        let saved = require_saved(ctx, "SharedStoreDecorator")?;
        let store = self.registry.acquire(entry.id, group.to_string())?;
        ctx.shared_owner = Some(SharedStoreOwner::new(group, store, saved));
        Ok(())
    }

    fn on_pop(&self, entry: EntryId) {
        if self.policy.should_remove() {
            self.registry.release(&entry);
        } else {
            log::debug!("nav: keeping shared store membership of entry {entry}");
        }
    }
}
