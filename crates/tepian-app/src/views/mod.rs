//! # View State Module
//!
//! Plain data types that represent cart contents. These types are
//! serializable and can be:
//!
//! - Written to durable storage verbatim
//! - Handed to observers and frontends as owned snapshots
//! - Built from catalog rows supplied by the table pages

pub mod cart;
pub mod catalog;

pub use cart::{CartItems, ItemId, LineItem, Product, ProductFields, RESERVED_FIELDS};
pub use catalog::{CatalogRecord, Pegawai, Peralatan, ProductError};
