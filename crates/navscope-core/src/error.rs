use thiserror::Error;

/// Errors raised by [`GroupedStoreRegistry`](crate::registry::GroupedStoreRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `acquire` was called after the owning scope tore the registry down.
    #[error("store registry has been torn down; no new groups can be acquired")]
    TornDown,
}

/// Errors raised by stores and the view models they hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("view model `{key}` holds a `{found}`, requested `{requested}`")]
    TypeMismatch {
        key: String,
        found: &'static str,
        requested: &'static str,
    },

    /// A single view model failed while being cleared.
    #[error("view model `{key}` failed to clear: {reason}")]
    ViewModel { key: String, reason: String },

    /// One or more view models failed during `clear`; the rest were still cleared.
    #[error("{} of {total} view models failed to clear", .failures.len())]
    ClearFailed {
        total: usize,
        failures: Vec<StoreError>,
    },
}

impl StoreError {
    pub fn view_model(key: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::ViewModel {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
