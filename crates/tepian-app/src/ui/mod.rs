//! UI-facing facade for tepian-app.
//!
//! Frontends hold a [`UiCart`] rather than a bare [`CartCore`]. It is built
//! once at startup and cloned into every component that needs the cart;
//! clones share the same container.
//!
//! Mutations run under the write lock; observer callbacks run after it is
//! released, so an observer holding a clone may read or mutate the cart.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

use crate::core::{CartCore, CartOutcome, CartSnapshot};
use crate::observer::CartObserver;
use crate::views::{ItemId, Product};

/// Shared handle to a [`CartCore`].
#[derive(Clone, Debug)]
pub struct UiCart {
    inner: Arc<RwLock<CartCore>>,
}

impl UiCart {
    /// Wrap a freshly loaded cart.
    pub fn new(core: CartCore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(core)),
        }
    }

    /// Read access to the container.
    pub fn read(&self) -> RwLockReadGuard<'_, CartCore> {
        self.inner.read()
    }

    /// Write access to the container.
    ///
    /// Observers are notified as soon as a mutation made through the guard
    /// returns, while the guard is still held. Use the handle's own mutation
    /// methods when observers read the cart back.
    pub fn write(&self) -> RwLockWriteGuard<'_, CartCore> {
        self.inner.write()
    }

    /// See [`CartCore::add_item`].
    pub fn add_item(&self, product: Product) -> CartOutcome {
        self.apply(|core| core.stage_add_item(product))
    }

    /// See [`CartCore::remove_item`].
    pub fn remove_item(&self, id: &ItemId) -> CartOutcome {
        self.apply(|core| core.stage_remove_item(id))
    }

    /// See [`CartCore::update_quantity`].
    pub fn update_quantity(&self, id: &ItemId, quantity: i64) -> CartOutcome {
        self.apply(|core| core.stage_update_quantity(id, quantity))
    }

    /// See [`CartCore::clear_cart`].
    pub fn clear_cart(&self) -> CartOutcome {
        self.apply(CartCore::stage_clear_cart)
    }

    /// See [`CartCore::set_revision_mode`].
    pub fn set_revision_mode(&self, revision: bool) -> CartOutcome {
        self.apply(|core| core.stage_set_revision_mode(revision))
    }

    fn apply(&self, stage: impl FnOnce(&mut CartCore) -> CartOutcome) -> CartOutcome {
        let (outcome, pending) = {
            let mut core = self.inner.write();
            let outcome = stage(&mut core);
            (outcome, core.take_notifications())
        };
        pending.dispatch();
        outcome
    }

    /// See [`CartCore::add_observer`].
    pub fn add_observer(&self, observer: Arc<dyn CartObserver>) {
        self.inner.write().add_observer(observer);
    }

    /// See [`CartCore::count`].
    pub fn count(&self) -> u64 {
        self.inner.read().count()
    }

    /// See [`CartCore::revision_mode`].
    pub fn revision_mode(&self) -> bool {
        self.inner.read().revision_mode()
    }

    /// See [`CartCore::snapshot`].
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.read().snapshot()
    }
}

impl From<CartCore> for UiCart {
    fn from(core: CartCore) -> Self {
        Self::new(core)
    }
}
