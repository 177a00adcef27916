//! # Catalog Records
//!
//! Equipment (`peralatan`) and personnel (`pegawai`) rows as the table pages
//! hand them to the cart. Any record that serializes to a JSON object can be
//! turned into a [`Product`] through [`CatalogRecord`].

use crate::views::cart::{ItemId, Product, ProductFields, RESERVED_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Conversion failures from catalog records to products.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The record has no integer or string id.
    #[error("Record has no usable id")]
    MissingId,

    /// The record did not serialize at all.
    #[error("Failed to serialize record {id}: {source}")]
    Serialize {
        /// Id of the offending record
        id: ItemId,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The record serialized to something other than a JSON object.
    #[error("Record {id} is not a JSON object")]
    NotAnObject {
        /// Id of the offending record
        id: ItemId,
    },
}

/// A catalog row that can be added to the cart.
pub trait CatalogRecord: Serialize {
    /// Cart identifier for this row, or `None` when the row has none.
    fn item_id(&self) -> Option<ItemId>;
}

impl Product {
    /// Build a product from a catalog record, keeping every serialized field
    /// except the reserved `id`/`quantity` keys.
    pub fn from_record<R: CatalogRecord + ?Sized>(record: &R) -> Result<Self, ProductError> {
        let id = record.item_id().ok_or(ProductError::MissingId)?;
        let value = serde_json::to_value(record).map_err(|source| ProductError::Serialize {
            id: id.clone(),
            source,
        })?;

        let Value::Object(mut fields) = value else {
            return Err(ProductError::NotAnObject { id });
        };
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }

        Ok(Self { id, fields })
    }
}

/// Laboratory equipment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peralatan {
    /// Row id
    pub id: i64,
    /// Equipment name
    pub nama: String,
    /// Brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merek: Option<String>,
    /// Room or lab where it is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lokasi: Option<String>,
    /// Condition, e.g. "baik" or "rusak"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kondisi: Option<String>,
}

impl CatalogRecord for Peralatan {
    fn item_id(&self) -> Option<ItemId> {
        Some(ItemId::Number(self.id))
    }
}

/// Personnel row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pegawai {
    /// Row id
    pub id: i64,
    /// Full name
    pub nama: String,
    /// Employee registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip: Option<String>,
    /// Position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jabatan: Option<String>,
}

impl CatalogRecord for Pegawai {
    fn item_id(&self) -> Option<ItemId> {
        Some(ItemId::Number(self.id))
    }
}

// Integer and string ids only; null, bool, float, array and object ids are
// treated as missing.
impl CatalogRecord for ProductFields {
    fn item_id(&self) -> Option<ItemId> {
        match self.get("id")? {
            Value::Number(n) => n.as_i64().map(ItemId::Number),
            Value::String(s) => Some(ItemId::Text(s.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    struct Scalar;

    impl Serialize for Scalar {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_u8(3)
        }
    }

    impl CatalogRecord for Scalar {
        fn item_id(&self) -> Option<ItemId> {
            Some(ItemId::Number(3))
        }
    }

    #[test]
    fn peralatan_becomes_product_without_id_field() {
        let oven = Peralatan {
            id: 12,
            nama: "Oven Laboratorium".to_string(),
            merek: Some("Memmert".to_string()),
            lokasi: None,
            kondisi: Some("baik".to_string()),
        };

        let product = Product::from_record(&oven).unwrap();
        assert_eq!(product.id, ItemId::Number(12));
        assert!(product.field("id").is_none());
        assert_eq!(product.field("nama"), Some(&json!("Oven Laboratorium")));
        assert_eq!(product.field("merek"), Some(&json!("Memmert")));
        assert!(product.field("lokasi").is_none());
    }

    #[test]
    fn pegawai_becomes_product() {
        let staff = Pegawai {
            id: 4,
            nama: "Siti".to_string(),
            nip: Some("19800101".to_string()),
            jabatan: None,
        };
        let product = Product::from_record(&staff).unwrap();
        assert_eq!(product.id, ItemId::Number(4));
        assert_eq!(product.fields.len(), 2);
    }

    #[test]
    fn raw_json_rows_are_records() {
        let Value::Object(row) = json!({"id": "K3-01", "nama": "APAR", "quantity": 5}) else {
            unreachable!()
        };
        let product = Product::from_record(&row).unwrap();
        assert_eq!(product.id, ItemId::from("K3-01"));
        assert_eq!(product.fields.len(), 1);
    }

    #[test]
    fn non_object_record_is_rejected() {
        assert_matches!(
            Product::from_record(&Scalar),
            Err(ProductError::NotAnObject { .. })
        );
    }

    #[test]
    fn rows_without_usable_id_are_rejected() {
        for row in [
            json!({"nama": "APAR"}),
            json!({"id": null, "nama": "APAR"}),
            json!({"id": 1.5, "nama": "APAR"}),
            json!({"id": [1], "nama": "APAR"}),
        ] {
            let Value::Object(row) = row else {
                unreachable!()
            };
            assert_matches!(Product::from_record(&row), Err(ProductError::MissingId));
        }
    }
}
