//! Cart snapshots and the stored line-item codec.
//!
//! The stored form is a JSON array of `{id, quantity, ...fields}` objects in
//! insertion order. Decoding never trusts the stored bytes: anything that does
//! not satisfy the cart invariants is rejected as a whole.

use crate::core::CartMode;
use crate::views::{CartItems, ItemId, LineItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Stored snapshot encode/decode failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Not a JSON array of line item objects.
    #[error("Malformed cart snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    /// An entry had quantity 0.
    #[error("Cart snapshot holds item {id} with quantity 0")]
    ZeroQuantity {
        /// Offending item
        id: ItemId,
    },

    /// Two entries shared an id.
    #[error("Cart snapshot holds item {id} more than once")]
    DuplicateId {
        /// Repeated id
        id: ItemId,
    },

    /// Serializing the items failed.
    #[error("Failed to encode cart snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Serialize items to their stored form.
pub fn encode_items(items: &[LineItem]) -> Result<Vec<u8>, SnapshotError> {
    serde_json::to_vec(items).map_err(SnapshotError::Encode)
}

/// Parse and validate a stored snapshot.
pub fn decode_items(bytes: &[u8]) -> Result<CartItems, SnapshotError> {
    let items: Vec<LineItem> = serde_json::from_slice(bytes).map_err(SnapshotError::Malformed)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if item.quantity == 0 {
            return Err(SnapshotError::ZeroQuantity {
                id: item.id.clone(),
            });
        }
        if !seen.insert(&item.id) {
            return Err(SnapshotError::DuplicateId {
                id: item.id.clone(),
            });
        }
    }

    Ok(CartItems::from_validated(items))
}

/// Owned view of the cart handed to observers and frontends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Items in insertion order
    pub items: Vec<LineItem>,
    /// Derived quantity total; 0 while in revision mode
    pub count: u64,
    /// Whether revision mode is on
    pub revision_mode: bool,
}

impl CartSnapshot {
    pub(crate) fn capture(items: &CartItems, mode: CartMode) -> Self {
        Self {
            items: items.as_slice().to_vec(),
            count: visible_count(items, mode),
            revision_mode: mode.is_revision(),
        }
    }
}

/// Quantity total as consumers see it.
pub(crate) fn visible_count(items: &CartItems, mode: CartMode) -> u64 {
    if mode.is_revision() {
        0
    } else {
        items.total_quantity()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::views::Product;
    use assert_matches::assert_matches;

    #[test]
    fn encode_writes_flat_array_in_order() {
        let mut items = CartItems::new();
        items.add(Product::new(2).with_field("nama", "Autoklaf"));
        items.add(Product::new(1));
        items.add(Product::new(2));

        let bytes = encode_items(items.as_slice()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"[{"id":2,"quantity":2,"nama":"Autoklaf"},{"id":1,"quantity":1}]"#
        );
    }

    #[test]
    fn decode_accepts_mixed_id_kinds() {
        let items =
            decode_items(br#"[{"id":1,"quantity":3},{"id":"x","quantity":1,"lokasi":"Lab A"}]"#)
                .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.total_quantity(), 4);
        assert!(items.contains(&ItemId::from("x")));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_matches!(decode_items(b"not json"), Err(SnapshotError::Malformed(_)));
        assert_matches!(decode_items(b"null"), Err(SnapshotError::Malformed(_)));
        assert_matches!(decode_items(br#"{"id":1}"#), Err(SnapshotError::Malformed(_)));
        assert_matches!(decode_items(br#"[{"id":1}]"#), Err(SnapshotError::Malformed(_)));
        assert_matches!(
            decode_items(br#"[{"id":1,"quantity":-2}]"#),
            Err(SnapshotError::Malformed(_))
        );
        assert_matches!(
            decode_items(br#"[{"id":true,"quantity":1}]"#),
            Err(SnapshotError::Malformed(_))
        );
    }

    #[test]
    fn decode_rejects_invariant_violations() {
        assert_matches!(
            decode_items(br#"[{"id":1,"quantity":0}]"#),
            Err(SnapshotError::ZeroQuantity { .. })
        );
        assert_matches!(
            decode_items(br#"[{"id":1,"quantity":1},{"id":1,"quantity":2}]"#),
            Err(SnapshotError::DuplicateId { .. })
        );
    }

    #[test]
    fn count_is_zero_in_revision_mode() {
        let mut items = CartItems::new();
        items.add(Product::new(1));
        assert_eq!(visible_count(&items, CartMode::Normal), 1);
        assert_eq!(visible_count(&items, CartMode::Revision), 0);

        let snapshot = CartSnapshot::capture(&items, CartMode::Revision);
        assert!(snapshot.revision_mode);
        assert_eq!(snapshot.count, 0);
    }
}
