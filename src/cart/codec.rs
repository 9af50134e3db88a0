//! Serialized form of the cart collection.
//!
//! The collection is stored as a JSON array of objects with the fields
//! `id`, `title`, `image_url`, `price` and `quantity`. Array order is the
//! collection order at write time.

use thiserror::Error;

use super::item::CartItem;

/// Errors raised while encoding or decoding the stored collection.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode cart collection: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Price for '{id}' is not a finite number")]
    NonFinitePrice { id: String },

    #[error("Malformed cart collection: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize the full collection.
///
/// JSON would write a NaN or infinite price as `null`, which no longer
/// decodes, so such a collection is refused instead.
pub fn encode(items: &[CartItem]) -> Result<String, CodecError> {
    if let Some(item) = items.iter().find(|item| !item.price.is_finite()) {
        return Err(CodecError::NonFinitePrice {
            id: item.id.clone(),
        });
    }
    serde_json::to_string(items).map_err(CodecError::Encode)
}

/// Parse a stored collection and restore the collection invariants.
///
/// See [`normalize`] for what happens to entries that break them.
pub fn decode(raw: &str) -> Result<Vec<CartItem>, CodecError> {
    let items: Vec<CartItem> = serde_json::from_str(raw).map_err(CodecError::Decode)?;
    Ok(normalize(items))
}

/// Drop zero-quantity entries and collapse duplicate ids.
///
/// A duplicate keeps the position of its first occurrence and the fields
/// and quantity of its last one.
pub fn normalize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut out: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            tracing::warn!(id = %item.id, "Dropping stored cart item with zero quantity");
            continue;
        }
        match out.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                tracing::warn!(id = %item.id, "Collapsing duplicate stored cart item");
                *existing = item;
            }
            None => out.push(item),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            title: title.to_string(),
            image_url: "u".to_string(),
            price: 10.0,
            quantity,
        }
    }

    #[test]
    fn encodes_snake_case_field_names() {
        let raw = encode(&[item("p1", "Shirt", 2)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let object = value[0].as_object().unwrap();
        for field in ["id", "title", "image_url", "price", "quantity"] {
            assert!(object.contains_key(field), "missing field {field}");
        }
    }

    #[test]
    fn decode_accepts_any_field_order() {
        let raw = r#"[{"quantity":3,"price":9.5,"image_url":"i","title":"Mug","id":"m"}]"#;
        let items = decode(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "m");
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn encode_refuses_non_finite_price() {
        let mut bad = item("b", "Mug", 1);
        bad.price = f64::NAN;
        assert!(matches!(
            encode(&[item("a", "Shirt", 1), bad]),
            Err(CodecError::NonFinitePrice { id }) if id == "b"
        ));

        let mut huge = item("c", "Lamp", 1);
        huge.price = f64::INFINITY;
        assert!(encode(&[huge]).is_err());
    }

    #[test]
    fn decode_rejects_malformed_text() {
        assert!(matches!(decode("not json"), Err(CodecError::Decode(_))));
        assert!(matches!(
            decode(r#"[{"id":"p1"}]"#),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(
            decode(r#"[{"id":"p1","title":"t","image_url":"u","price":1,"quantity":-1}]"#),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn normalize_drops_zero_and_collapses_duplicates() {
        let items = normalize(vec![
            item("a", "first", 1),
            item("b", "zero", 0),
            item("c", "other", 4),
            item("a", "second", 5),
        ]);
        assert_eq!(items, vec![item("a", "second", 5), item("c", "other", 4)]);
    }
}
