//! # Cart View State
//!
//! Line items and the ordered list that holds them. Everything here is pure
//! data manipulation; mode gating and persistence live in
//! [`crate::core::CartCore`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Open set of product fields carried alongside `id` and `quantity`.
pub type ProductFields = Map<String, Value>;

/// Keys owned by the line item itself; never kept inside [`ProductFields`].
pub const RESERVED_FIELDS: [&str; 2] = ["id", "quantity"];

// =============================================================================
// Identifiers
// =============================================================================

/// Line item identifier.
///
/// Records coming from the equipment and personnel tables use numeric ids,
/// but nothing stops a caller from using string ids, so both are accepted and
/// written back in the form they arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Integer id, serialized as a JSON number
    Number(i64),
    /// Free-form id, serialized as a JSON string
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for ItemId {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    /// Integers become [`ItemId::Number`]; anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Number))
    }
}

// =============================================================================
// Product / LineItem
// =============================================================================

/// A record offered to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier used to merge repeated additions
    pub id: ItemId,
    /// Remaining product fields
    #[serde(flatten)]
    pub fields: ProductFields,
}

impl Product {
    /// Product with no fields besides its id.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            fields: ProductFields::new(),
        }
    }

    /// Attach a field. Reserved keys are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !RESERVED_FIELDS.contains(&key.as_str()) {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// Look up a field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// One product/quantity entry in the cart.
///
/// Serialized flat: `{"id": .., "quantity": .., ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier, unique within a cart
    pub id: ItemId,
    /// Always at least 1
    pub quantity: u32,
    /// Product fields copied from the first addition
    #[serde(flatten)]
    pub fields: ProductFields,
}

impl LineItem {
    /// New line item for `product` with quantity 1.
    pub fn from_product(product: Product) -> Self {
        let Product { id, mut fields } = product;
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }
        Self {
            id,
            quantity: 1,
            fields,
        }
    }

    /// Look up a product field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

// =============================================================================
// CartItems
// =============================================================================

/// Ordered line items with unique ids.
///
/// Insertion order is preserved and is the order written to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItems {
    items: Vec<LineItem>,
}

impl CartItems {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap items that are already known to satisfy the list invariants
    /// (unique ids, quantities >= 1).
    pub(crate) fn from_validated(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    // ─── Queries ─────────────────────────────────────────────

    /// Items in insertion order.
    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    /// Item with the given id.
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether an item with `id` is present.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    // ─── Mutations ───────────────────────────────────────────

    /// Increment the quantity of an existing item or append a new one with
    /// quantity 1. Returns the resulting quantity.
    pub fn add(&mut self, product: Product) -> u32 {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return existing.quantity;
        }
        self.items.push(LineItem::from_product(product));
        1
    }

    /// Remove the item with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Overwrite the quantity of an existing item. Returns `false` when no
    /// item has `id`.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: NonZeroU32) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.quantity = quantity.get();
                true
            }
            None => false,
        }
    }

    /// Drop every item, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }
}

impl<'a> IntoIterator for &'a CartItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<CartItems> for Vec<LineItem> {
    fn from(items: CartItems) -> Self {
        items.items
    }
}
