use crate::catalog::Catalog;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to the live catalog.
///
/// Readers take an `Arc` snapshot and keep using it for the whole request;
/// `replace` swaps in a fully built catalog, so nobody observes a partial one.
#[derive(Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Arc<Catalog>>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(catalog))) }
    }

    pub fn current(&self) -> Arc<Catalog> {
        self.inner.read().clone()
    }

    /// Returns the catalog that was replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        std::mem::replace(&mut *self.inner.write(), next)
    }
}
