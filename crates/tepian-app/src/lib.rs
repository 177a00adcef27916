//! # Tepian App
//!
//! Portable headless cart core for Tepian K3. The cart collects equipment
//! and personnel records, tracks quantities, and mirrors itself to durable
//! storage except while revision mode suspends editing.
//!
//! ## Layout
//!
//! - [`views`]: line items, identifiers, catalog records
//! - [`core`]: [`CartCore`], the mode state machine, snapshot codec
//! - [`observer`]: callbacks for change and warning notifications
//! - [`ui`]: [`UiCart`], the shared handle frontends hold
//!
//! ## Usage
//!
//! ```rust,ignore
//! let storage = tepian_effects::storage_from_config(&config.storage)?;
//! let cart = UiCart::new(CartCore::load(storage, &config.cart));
//!
//! cart.add_item(Product::new(1).with_field("nama", "Mikroskop"));
//! assert_eq!(cart.count(), 1);
//! ```

pub mod core;
pub mod observer;
pub mod ui;
pub mod views;

pub use crate::core::{
    CartCore, CartError, CartMode, CartOperation, CartOutcome, CartSnapshot, SnapshotError,
};
pub use crate::observer::{CartObserver, CartWarning, PendingNotifications};
pub use crate::ui::UiCart;
pub use crate::views::{
    CartItems, CatalogRecord, ItemId, LineItem, Pegawai, Peralatan, Product, ProductError,
};
