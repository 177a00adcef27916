//! # Core Application Module
//!
//! - [`CartCore`]: the cart state container
//! - [`CartMode`]: the `Normal` / `Revision` state machine
//! - [`CartSnapshot`]: owned, serializable view of the cart
//! - [`CartError`] / [`SnapshotError`]: persistence-path errors

mod cart;
mod error;
mod mode;
mod snapshot;

pub use cart::{CartCore, CartOperation, CartOutcome};
pub use error::CartError;
pub use mode::{CartMode, ModeTransition};
pub use snapshot::{decode_items, encode_items, CartSnapshot, SnapshotError};
