//! Owning scopes.
//!
//! A [`Scope`] bounds the lifetime of things that must be torn down together:
//! a navigation entry's resources, or a whole host and the store registries it
//! owns. Ownership is explicit; there is no ambient "current scope".

use std::cell::RefCell;
use std::rc::Rc;

use crate::Dispose;

pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposers: RefCell<Vec<Dispose>>,
    disposed: RefCell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(Vec::new()),
                disposed: RefCell::new(false),
            }),
        }
    }

    /// Registers a cleanup. On an already disposed scope it runs immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) -> Dispose {
        let d = Dispose::new(disposer);
        if self.is_disposed() {
            log::debug!("scope already disposed; running disposer now");
            d.run();
        } else {
            self.inner.disposers.borrow_mut().push(d.clone());
        }
        d
    }

    pub fn is_disposed(&self) -> bool {
        *self.inner.disposed.borrow()
    }

    /// Runs disposers in registration order.
    pub fn dispose(&self) {
        *self.inner.disposed.borrow_mut() = true;
        self.inner.run_all();
    }
}

impl ScopeInner {
    fn run_all(&self) {
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer.run();
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.is_disposed())
            .field("pending", &self.inner.disposers.borrow().len())
            .finish()
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.run_all();
    }
}
