//! Scoped access to a cart store.
//!
//! A [`CartScope`] is created empty at application start and receives its
//! [`CartStore`] once the store has been initialized. Consumers ask the
//! scope for a [`CartHandle`]; asking before a store was provided fails
//! with [`CartError::Uninitialized`].

use std::sync::{Arc, OnceLock};

use cart_types::{CartSnapshot, ProductDescriptor};
use tokio::sync::watch;

use crate::error::{CartError, CartResult};
use crate::store::{CartStore, MutationOutcome};

/// Holder of the application's single cart store.
#[derive(Debug, Default)]
pub struct CartScope {
    store: OnceLock<Arc<CartStore>>,
}

impl CartScope {
    /// A scope with no store yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that already holds `store`.
    pub fn with_store(store: CartStore) -> Self {
        let scope = Self::new();
        let _ = scope.store.set(Arc::new(store));
        scope
    }

    /// Install the initialized store. Only the first call succeeds.
    pub fn provide(&self, store: CartStore) -> CartResult<CartHandle> {
        self.store
            .set(Arc::new(store))
            .map_err(|_| CartError::AlreadyProvided)?;
        self.cart()
    }

    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }

    /// The capability bundle for the provided store.
    pub fn cart(&self) -> CartResult<CartHandle> {
        self.store
            .get()
            .cloned()
            .map(|store| CartHandle { store })
            .ok_or(CartError::Uninitialized)
    }
}

/// The consumer-facing surface of the cart: read the lines, add a product,
/// change a quantity. Cheap to clone; all clones share one store.
#[derive(Clone, Debug)]
pub struct CartHandle {
    store: Arc<CartStore>,
}

impl CartHandle {
    /// Current lines, in cart order.
    pub fn products(&self) -> CartSnapshot {
        self.store.snapshot()
    }

    pub fn add_to_cart(&self, product: ProductDescriptor) -> MutationOutcome {
        self.store.add_to_cart(product)
    }

    pub fn increment(&self, id: &str) -> MutationOutcome {
        self.store.increment(id)
    }

    pub fn decrement(&self, id: &str) -> MutationOutcome {
        self.store.decrement(id)
    }

    /// See [`CartStore::flush`].
    pub async fn flush(&self) -> CartResult<()> {
        self.store.flush().await
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.store.subscribe()
    }

    /// The underlying store.
    pub fn store(&self) -> &CartStore {
        &self.store
    }
}
