pub use crate::effects::Dispose;
pub use crate::error::{RegistryError, StoreError};
pub use crate::registry::{EntryKey, GroupKey, GroupedStoreRegistry};
pub use crate::scope::Scope;
pub use crate::store::{Disposable, ViewModel, ViewModelStore};
