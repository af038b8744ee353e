//! # Shared stores for navigation entries
//!
//! `navscope-core` owns the bookkeeping behind "nested graph" state sharing:
//! several navigation entries name the same group, and all of them see one
//! store until the last of them is gone.
//!
//! - [`GroupedStoreRegistry`] maps entries to groups and reference-counts one
//!   store per group.
//! - [`Disposable`] is how a store is released; [`ViewModelStore`] is the
//!   store the navigation layer uses.
//! - [`Scope`] bounds the registry's lifetime. Disposing the scope tears the
//!   registry down and disposes every store still alive.
//!
//! ```rust
//! use navscope_core::*;
//!
//! let host = Scope::new();
//! let registry = GroupedStoreRegistry::scoped(&host, |_: &String| ViewModelStore::new());
//!
//! registry.acquire(1u64, "nested".to_string()).unwrap();
//! host.dispose();
//! assert!(registry.is_torn_down());
//! ```

pub mod effects;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod scope;
pub mod store;

pub use effects::*;
pub use error::*;
pub use registry::*;
pub use scope::*;
pub use store::*;
