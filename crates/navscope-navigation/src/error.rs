use navscope_core::{RegistryError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// A store decorator ran before `SavedStateDecorator` filled in the entry's saved state.
    #[error("{decorator} requires SavedStateDecorator earlier in the decorator chain")]
    MissingSavedState { decorator: &'static str },

    #[error("no shared store owner for this entry; add SharedStoreDecorator and set the group under its metadata key")]
    MissingSharedOwner,

    #[error("no entry store owner for this entry; add EntryStoreDecorator")]
    MissingEntryOwner,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid shared store config: {0}")]
    Config(#[from] serde_json::Error),
}
