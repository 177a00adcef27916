//! # Cart State Container
//!
//! [`CartCore`] owns the line items and the revision-mode flag. Every
//! operation follows the same shape:
//!
//! ```text
//! guard (mode) → mutate (CartItems) → persist? (mode) → notify
//! ```
//!
//! The persist step is an explicit branch on [`CartMode::persists`], so a
//! mutation made during revision mode changes memory only and the stored
//! snapshot is left as it was.
//!
//! Notifications are staged while the mutation runs and delivered when it
//! returns. The `stage_*` forms leave them queued for
//! [`CartCore::take_notifications`], which is how [`crate::UiCart`] delivers
//! them outside its lock.

use crate::core::error::CartError;
use crate::core::mode::{CartMode, ModeTransition};
use crate::core::snapshot::{decode_items, encode_items, visible_count, CartSnapshot};
use crate::observer::{CartObserver, CartWarning, Notification, PendingNotifications};
use crate::views::{CartItems, ItemId, LineItem, Product};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tepian_core::{CartConfig, StorageEffects};
use tracing::{debug, error, info, warn};

/// Public cart operations, used to label warnings and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    /// `add_item`
    AddItem,
    /// `remove_item`
    RemoveItem,
    /// `update_quantity`
    UpdateQuantity,
    /// `clear_cart`
    ClearCart,
    /// `set_revision_mode`
    SetRevisionMode,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddItem => "add_item",
            Self::RemoveItem => "remove_item",
            Self::UpdateQuantity => "update_quantity",
            Self::ClearCart => "clear_cart",
            Self::SetRevisionMode => "set_revision_mode",
        };
        f.write_str(name)
    }
}

/// What an operation did. None of these is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// Items or mode changed
    Applied,
    /// Accepted, but nothing changed (unknown id, empty cart, same mode)
    Unchanged,
    /// Ignored because revision mode is on
    Suppressed,
}

/// The cart state container.
///
/// Construct it once at startup with [`CartCore::load`] and pass it (or a
/// [`crate::UiCart`] wrapping it) to whatever needs the cart.
pub struct CartCore {
    items: CartItems,
    mode: CartMode,
    storage: Arc<dyn StorageEffects>,
    storage_key: String,
    observers: Vec<Arc<dyn CartObserver>>,
    pending: Vec<Notification>,
}

impl CartCore {
    /// Load the cart from `storage`.
    ///
    /// A missing entry gives an empty cart. An unreadable or malformed entry
    /// also gives an empty cart and is logged; it is not overwritten until the
    /// next persisted mutation.
    pub fn load(storage: Arc<dyn StorageEffects>, config: &CartConfig) -> Self {
        let items = match read_items(storage.as_ref(), &config.storage_key) {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    key = %config.storage_key,
                    backend = storage.backend_type(),
                    "Ignoring stored cart: {e}"
                );
                CartItems::new()
            }
        };

        info!(
            key = %config.storage_key,
            backend = storage.backend_type(),
            items = items.len(),
            "Loaded cart"
        );

        Self::with_items(storage, config, items)
    }

    /// Empty cart bound to `storage` without reading it first.
    pub fn empty(storage: Arc<dyn StorageEffects>, config: &CartConfig) -> Self {
        Self::with_items(storage, config, CartItems::new())
    }

    fn with_items(
        storage: Arc<dyn StorageEffects>,
        config: &CartConfig,
        items: CartItems,
    ) -> Self {
        Self {
            items,
            mode: CartMode::Normal,
            storage,
            storage_key: config.storage_key.clone(),
            observers: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Register an observer.
    pub fn add_observer(&mut self, observer: Arc<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// Builder form of [`CartCore::add_observer`].
    pub fn with_observer(mut self, observer: Arc<dyn CartObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        self.items.as_slice()
    }

    /// Item with the given id.
    pub fn item(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.get(id)
    }

    /// Sum of all quantities; always 0 in revision mode.
    pub fn count(&self) -> u64 {
        visible_count(&self.items, self.mode)
    }

    /// Whether revision mode is on.
    pub fn revision_mode(&self) -> bool {
        self.mode.is_revision()
    }

    /// Current mode.
    pub fn mode(&self) -> CartMode {
        self.mode
    }

    /// Storage key the cart is mirrored to.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::capture(&self.items, self.mode)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`: bump the quantity of an existing item with
    /// the same id, or append it with quantity 1.
    pub fn add_item(&mut self, product: Product) -> CartOutcome {
        let outcome = self.stage_add_item(product);
        self.deliver(outcome)
    }

    /// Remove the item with `id`. Unknown ids are a no-op.
    pub fn remove_item(&mut self, id: &ItemId) -> CartOutcome {
        let outcome = self.stage_remove_item(id);
        self.deliver(outcome)
    }

    /// Set the quantity of an existing item. Quantities below 1 remove it;
    /// values beyond `u32::MAX` are clamped. Unknown ids are a no-op.
    pub fn update_quantity(&mut self, id: &ItemId, quantity: i64) -> CartOutcome {
        let outcome = self.stage_update_quantity(id, quantity);
        self.deliver(outcome)
    }

    /// Remove every item. Allowed in any mode.
    pub fn clear_cart(&mut self) -> CartOutcome {
        let outcome = self.stage_clear_cart();
        self.deliver(outcome)
    }

    /// Turn revision mode on or off.
    ///
    /// Entering revision mode clears the in-memory items and does not touch
    /// storage, so the stored snapshot still holds the pre-revision cart.
    /// Leaving it restores nothing and writes nothing.
    pub fn set_revision_mode(&mut self, revision: bool) -> CartOutcome {
        let outcome = self.stage_set_revision_mode(revision);
        self.deliver(outcome)
    }

    /// Drain the notifications staged since the last drain.
    pub fn take_notifications(&mut self) -> PendingNotifications {
        PendingNotifications::new(self.observers.clone(), std::mem::take(&mut self.pending))
    }

    // =========================================================================
    // Staged mutations
    // =========================================================================

    pub(crate) fn stage_add_item(&mut self, product: Product) -> CartOutcome {
        if let Some(outcome) = self.guard(CartOperation::AddItem) {
            return outcome;
        }

        let id = product.id.clone();
        let quantity = self.items.add(product);
        debug!(%id, quantity, "Added item");

        self.commit(CartOutcome::Applied)
    }

    pub(crate) fn stage_remove_item(&mut self, id: &ItemId) -> CartOutcome {
        if let Some(outcome) = self.guard(CartOperation::RemoveItem) {
            return outcome;
        }

        let outcome = self.remove_unguarded(id);
        self.commit(outcome)
    }

    pub(crate) fn stage_update_quantity(&mut self, id: &ItemId, quantity: i64) -> CartOutcome {
        if let Some(outcome) = self.guard(CartOperation::UpdateQuantity) {
            return outcome;
        }

        let outcome = match NonZeroU32::new(clamp_quantity(quantity)) {
            None => self.remove_unguarded(id),
            Some(quantity) => {
                if self.items.set_quantity(id, quantity) {
                    debug!(%id, quantity = quantity.get(), "Updated quantity");
                    CartOutcome::Applied
                } else {
                    debug!(%id, "Quantity update for unknown item");
                    CartOutcome::Unchanged
                }
            }
        };

        self.commit(outcome)
    }

    pub(crate) fn stage_clear_cart(&mut self) -> CartOutcome {
        let removed = self.items.clear();
        debug!(removed, mode = %self.mode, "Cleared cart");

        let outcome = if removed > 0 {
            CartOutcome::Applied
        } else {
            CartOutcome::Unchanged
        };
        self.commit(outcome)
    }

    pub(crate) fn stage_set_revision_mode(&mut self, revision: bool) -> CartOutcome {
        let next = CartMode::from_revision_flag(revision);

        match self.mode.transition_to(next) {
            ModeTransition::Stay => CartOutcome::Unchanged,
            ModeTransition::EnterRevision => {
                self.mode = next;
                let removed = self.items.clear();
                info!(removed, "Entered revision mode; in-memory cart cleared");
                self.notify_changed();
                CartOutcome::Applied
            }
            ModeTransition::ExitRevision => {
                self.mode = next;
                info!("Left revision mode");
                self.notify_changed();
                CartOutcome::Applied
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn deliver(&mut self, outcome: CartOutcome) -> CartOutcome {
        self.take_notifications().dispatch();
        outcome
    }

    fn guard(&mut self, operation: CartOperation) -> Option<CartOutcome> {
        if self.mode.allows_editing() {
            return None;
        }
        self.emit_warning(CartWarning::EditingSuspended { operation });
        Some(CartOutcome::Suppressed)
    }

    fn remove_unguarded(&mut self, id: &ItemId) -> CartOutcome {
        match self.items.remove(id) {
            Some(_) => {
                debug!(%id, "Removed item");
                CartOutcome::Applied
            }
            None => CartOutcome::Unchanged,
        }
    }

    /// Finish an accepted mutation: write storage unless revision mode is on,
    /// then notify observers if anything changed.
    fn commit(&mut self, outcome: CartOutcome) -> CartOutcome {
        if self.mode.persists() {
            if let Err(e) = self.persist() {
                error!(key = %self.storage_key, "Failed to persist cart: {e}");
                self.emit_warning(CartWarning::PersistFailed {
                    reason: e.to_string(),
                });
            }
        } else {
            debug!(key = %self.storage_key, "Revision mode: stored cart left unchanged");
        }

        if outcome == CartOutcome::Applied {
            self.notify_changed();
        }
        outcome
    }

    fn persist(&self) -> Result<(), CartError> {
        let bytes = encode_items(self.items.as_slice())?;
        let len = bytes.len();
        self.storage.store(&self.storage_key, bytes)?;
        debug!(key = %self.storage_key, bytes = len, "Persisted cart");
        Ok(())
    }

    fn notify_changed(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.pending.push(Notification::Changed(snapshot));
    }

    fn emit_warning(&mut self, warning: CartWarning) {
        warn!("{warning}");
        if !self.observers.is_empty() {
            self.pending.push(Notification::Warning(warning));
        }
    }
}

impl fmt::Debug for CartCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartCore")
            .field("items", &self.items)
            .field("mode", &self.mode)
            .field("storage_key", &self.storage_key)
            .field("backend", &self.storage.backend_type())
            .field("observers", &self.observers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

fn read_items(storage: &dyn StorageEffects, key: &str) -> Result<CartItems, CartError> {
    match storage.retrieve(key)? {
        Some(bytes) => Ok(decode_items(&bytes)?),
        None => Ok(CartItems::new()),
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    if quantity < 1 {
        0
    } else {
        u32::try_from(quantity).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parking_lot::Mutex;
    use tepian_core::StorageError;
    use tepian_effects::MemoryStorageHandler;

    fn config() -> CartConfig {
        CartConfig::default()
    }

    fn cart_with(storage: &MemoryStorageHandler) -> CartCore {
        CartCore::load(Arc::new(storage.clone()), &config())
    }

    fn stored(storage: &MemoryStorageHandler) -> Option<String> {
        storage
            .retrieve("cart")
            .unwrap()
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[derive(Default)]
    struct Recorder {
        changes: Mutex<Vec<CartSnapshot>>,
        warnings: Mutex<Vec<CartWarning>>,
    }

    impl CartObserver for Recorder {
        fn on_cart_changed(&self, snapshot: &CartSnapshot) {
            self.changes.lock().push(snapshot.clone());
        }

        fn on_warning(&self, warning: &CartWarning) {
            self.warnings.lock().push(warning.clone());
        }
    }

    struct BrokenStorage;

    impl StorageEffects for BrokenStorage {
        fn store(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed("disk full".to_string()))
        }

        fn retrieve(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::ReadFailed("unreadable".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<bool, StorageError> {
            Ok(false)
        }

        fn backend_type(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn example_walkthrough() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);

        cart.add_item(Product::new(1));
        assert_eq!(cart.count(), 1);

        cart.add_item(Product::new(1));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 2);

        cart.add_item(Product::new(2));
        assert_eq!(cart.count(), 3);
        assert_eq!(
            stored(&storage).unwrap(),
            r#"[{"id":1,"quantity":2},{"id":2,"quantity":1}]"#
        );

        assert_eq!(cart.set_revision_mode(true), CartOutcome::Applied);
        assert!(cart.items().is_empty());
        assert_eq!(cart.count(), 0);

        assert_eq!(cart.add_item(Product::new(3)), CartOutcome::Suppressed);
        assert!(cart.items().is_empty());

        assert_eq!(cart.set_revision_mode(false), CartOutcome::Applied);
        assert!(cart.items().is_empty());
        assert!(!cart.revision_mode());
    }

    #[test]
    fn entering_revision_mode_leaves_storage_untouched() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        cart.add_item(Product::new(1));
        let before = stored(&storage);

        cart.set_revision_mode(true);
        cart.clear_cart();
        cart.set_revision_mode(false);

        assert_eq!(stored(&storage), before);

        cart.add_item(Product::new(5));
        assert_eq!(stored(&storage).unwrap(), r#"[{"id":5,"quantity":1}]"#);
    }

    #[test]
    fn update_quantity_below_one_removes() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        cart.add_item(Product::new(1));
        cart.add_item(Product::new(2));

        assert_eq!(cart.update_quantity(&ItemId::Number(1), 0), CartOutcome::Applied);
        assert_eq!(cart.update_quantity(&ItemId::Number(2), -1), CartOutcome::Applied);
        assert!(cart.items().is_empty());
        assert_eq!(stored(&storage).unwrap(), "[]");
    }

    #[test]
    fn update_quantity_sets_and_clamps() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        cart.add_item(Product::new(1));

        assert_eq!(cart.update_quantity(&ItemId::Number(1), 7), CartOutcome::Applied);
        assert_eq!(cart.count(), 7);

        cart.update_quantity(&ItemId::Number(1), i64::MAX);
        assert_eq!(cart.item(&ItemId::Number(1)).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        cart.add_item(Product::new(1));

        assert_eq!(cart.remove_item(&ItemId::Number(9)), CartOutcome::Unchanged);
        assert_eq!(cart.update_quantity(&ItemId::Number(9), 4), CartOutcome::Unchanged);
        assert_eq!(cart.update_quantity(&ItemId::Number(9), 0), CartOutcome::Unchanged);
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn guarded_operations_warn_in_revision_mode() {
        let recorder = Arc::new(Recorder::default());
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage).with_observer(recorder.clone());

        cart.set_revision_mode(true);
        assert_eq!(cart.add_item(Product::new(1)), CartOutcome::Suppressed);
        assert_eq!(cart.remove_item(&ItemId::Number(1)), CartOutcome::Suppressed);
        assert_eq!(
            cart.update_quantity(&ItemId::Number(1), 3),
            CartOutcome::Suppressed
        );

        let warnings = recorder.warnings.lock();
        assert_eq!(
            *warnings,
            vec![
                CartWarning::EditingSuspended {
                    operation: CartOperation::AddItem
                },
                CartWarning::EditingSuspended {
                    operation: CartOperation::RemoveItem
                },
                CartWarning::EditingSuspended {
                    operation: CartOperation::UpdateQuantity
                },
            ]
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn clear_cart_works_in_both_modes() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        cart.add_item(Product::new(1));
        assert_eq!(cart.clear_cart(), CartOutcome::Applied);
        assert_eq!(stored(&storage).unwrap(), "[]");

        cart.set_revision_mode(true);
        assert_eq!(cart.clear_cart(), CartOutcome::Unchanged);
    }

    #[test]
    fn setting_same_mode_is_unchanged() {
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        assert_eq!(cart.set_revision_mode(false), CartOutcome::Unchanged);
        cart.set_revision_mode(true);
        assert_eq!(cart.set_revision_mode(true), CartOutcome::Unchanged);
    }

    #[test]
    fn observers_see_every_change() {
        let recorder = Arc::new(Recorder::default());
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage);
        cart.add_observer(recorder.clone());

        cart.add_item(Product::new(1));
        cart.add_item(Product::new(1));
        cart.remove_item(&ItemId::Number(42));
        cart.set_revision_mode(true);

        let changes = recorder.changes.lock();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[1].count, 2);
        assert!(changes[2].revision_mode);
        assert_eq!(changes[2].count, 0);
    }

    #[test]
    fn staged_mutations_hold_notifications_until_drained() {
        let recorder = Arc::new(Recorder::default());
        let storage = MemoryStorageHandler::new();
        let mut cart = cart_with(&storage).with_observer(recorder.clone());

        cart.stage_add_item(Product::new(1));
        cart.stage_set_revision_mode(true);
        cart.stage_remove_item(&ItemId::Number(1));
        assert!(recorder.changes.lock().is_empty());
        assert!(recorder.warnings.lock().is_empty());

        let pending = cart.take_notifications();
        assert!(!pending.is_empty());
        pending.dispatch();
        assert_eq!(recorder.changes.lock().len(), 2);
        assert_eq!(recorder.warnings.lock().len(), 1);

        assert!(cart.take_notifications().is_empty());
    }

    #[test]
    fn malformed_storage_loads_empty() {
        let storage = MemoryStorageHandler::with_entries([(
            "cart".to_string(),
            br#"[{"id":1,"quantity":0}]"#.to_vec(),
        )]);
        let cart = cart_with(&storage);
        assert!(cart.items().is_empty());
        assert!(stored(&storage).is_some());
    }

    #[test]
    fn storage_failures_are_reported_not_raised() {
        let recorder = Arc::new(Recorder::default());
        let mut cart = CartCore::load(Arc::new(BrokenStorage), &config())
            .with_observer(recorder.clone());
        assert!(cart.items().is_empty());

        assert_eq!(cart.add_item(Product::new(1)), CartOutcome::Applied);
        assert_eq!(cart.count(), 1);

        let warnings = recorder.warnings.lock();
        assert_eq!(warnings.len(), 1);
        assert_matches!(
            &warnings[0],
            CartWarning::PersistFailed { reason } if reason.contains("disk full")
        );
    }

    #[test]
    fn custom_storage_key_is_used() {
        let storage = MemoryStorageHandler::new();
        let config = CartConfig {
            storage_key: "keranjang".to_string(),
        };
        let mut cart = CartCore::load(Arc::new(storage.clone()), &config);
        cart.add_item(Product::new(1));

        assert_eq!(cart.storage_key(), "keranjang");
        assert!(storage.retrieve("keranjang").unwrap().is_some());
        assert!(storage.retrieve("cart").unwrap().is_none());
    }
}
