//! Stored Document Codec
//!
//! Converts between the untyped JSON documents the store holds and the
//! typed `Item`. All read-side defaulting lives here: label/title
//! fallbacks, placeholder text, non-numeric positions ignored. Unknown
//! kind tags are rejected here rather than defaulted deeper in.

use serde_json::{json, Map, Value};

use crate::domain::{DecorKind, DomainError, DomainResult, Item, ItemKind, Placement, ShelfIndex};

/// One stored document: a flat JSON object
pub type Doc = Map<String, Value>;

/// Encode an item into its stored document shape.
///
/// Absent optional fields are written as explicit nulls so a merge
/// write clears stale values.
pub fn item_to_doc(item: &Item) -> Doc {
    let mut doc = Map::new();
    doc.insert("id".into(), json!(item.id));
    doc.insert("kind".into(), json!(item.kind.tag()));
    doc.insert("label".into(), json!(item.label));
    doc.insert("title".into(), json!(item.title));
    doc.insert("color".into(), json!(item.color));

    match &item.kind {
        ItemKind::Book {
            thumbnail_url,
            page_count,
            authors,
            external_id,
        } => {
            doc.insert("thumbnailUrl".into(), json!(thumbnail_url));
            doc.insert("pageCount".into(), json!(page_count));
            doc.insert("authors".into(), json!(authors));
            doc.insert("externalId".into(), json!(external_id));
        }
        ItemKind::Decor { kind, variant } => {
            doc.insert("decorKind".into(), json!(kind.as_str()));
            doc.insert("decorVariant".into(), json!(variant));
        }
    }

    match item.placement {
        Placement::Unplaced => {
            doc.insert("shelfIndex".into(), Value::Null);
            doc.insert("shelfPos".into(), Value::Null);
        }
        Placement::Placed { shelf, position } => {
            doc.insert("shelfIndex".into(), json!(shelf.get()));
            doc.insert("shelfPos".into(), json!(position));
        }
    }

    doc.insert("createdAt".into(), json!(item.created_at));
    doc.insert("updatedAt".into(), json!(item.updated_at));
    doc
}

/// Decode a stored document into an `Item`.
///
/// The document key wins over any embedded `id` field. Documents from
/// before decor existed carry no `kind` tag and decode as books.
pub fn doc_to_item(id: &str, doc: &Doc) -> DomainResult<Item> {
    let kind = match doc.get("kind").and_then(Value::as_str) {
        None | Some("book") => ItemKind::Book {
            thumbnail_url: get_string(doc, "thumbnailUrl"),
            page_count: get_page_count(doc),
            authors: get_authors(doc),
            external_id: get_string(doc, "externalId"),
        },
        Some("decor") => {
            let tag = doc
                .get("decorKind")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let decor_kind = DecorKind::parse(tag)
                .ok_or_else(|| DomainError::Internal(format!("unknown decor kind: {:?}", tag)))?;
            let variant = decor_kind.clamp_variant(doc.get("decorVariant").and_then(Value::as_i64));
            ItemKind::Decor {
                kind: decor_kind,
                variant,
            }
        }
        Some(other) => {
            return Err(DomainError::Internal(format!(
                "unknown item kind: {:?}",
                other
            )))
        }
    };

    // Label and title fall back to each other, then to a placeholder
    let raw_label = get_string(doc, "label");
    let raw_title = get_string(doc, "title");
    let placeholder = match &kind {
        ItemKind::Book { .. } => "Book".to_string(),
        ItemKind::Decor { kind, .. } => kind.as_str().to_string(),
    };
    let label = raw_label
        .clone()
        .or_else(|| raw_title.clone())
        .unwrap_or_else(|| placeholder.clone());
    let title = raw_title.or(raw_label).unwrap_or(placeholder);

    let placement = match doc.get("shelfIndex").and_then(Value::as_u64) {
        Some(index) => match u8::try_from(index).ok().and_then(ShelfIndex::new) {
            Some(shelf) => Placement::Placed {
                shelf,
                position: doc.get("shelfPos").and_then(Value::as_f64),
            },
            // A shelf index outside the fixed set would render nowhere;
            // surface the item in the tray instead.
            None => Placement::Unplaced,
        },
        None => Placement::Unplaced,
    };

    Ok(Item {
        id: id.to_string(),
        kind,
        label,
        title,
        color: get_string(doc, "color").unwrap_or_else(|| "#ffffff".to_string()),
        placement,
        created_at: doc.get("createdAt").and_then(Value::as_i64),
        updated_at: doc.get("updatedAt").and_then(Value::as_i64),
    })
}

fn get_string(doc: &Doc, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn get_page_count(doc: &Doc) -> Option<u32> {
    doc.get("pageCount")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}

fn get_authors(doc: &Doc) -> Vec<String> {
    doc.get("authors")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Doc {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn round_trips_a_placed_book() {
        let item = Item {
            id: "b1".into(),
            kind: ItemKind::Book {
                thumbnail_url: Some("https://img/x.png".into()),
                page_count: Some(320),
                authors: vec!["A. Author".into()],
                external_id: Some("vol-9".into()),
            },
            label: "Book 1".into(),
            title: "Book One".into(),
            color: "#f97316".into(),
            placement: Placement::Placed {
                shelf: ShelfIndex::new(1).unwrap(),
                position: Some(0.25),
            },
            created_at: Some(1_700_000_000_000),
            updated_at: Some(1_700_000_000_500),
        };
        let decoded = doc_to_item("b1", &item_to_doc(&item)).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn round_trips_a_decor_piece() {
        let item = Item::decor(DecorKind::Plant, 3);
        let decoded = doc_to_item("d1", &item_to_doc(&item)).unwrap();
        assert_eq!(decoded.kind, item.kind);
        assert!(decoded.placement.is_unplaced());
    }

    #[test]
    fn missing_kind_decodes_as_book() {
        let d = doc(json!({ "label": "Old Doc" }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(item.kind.tag(), "book");
        assert_eq!(item.label, "Old Doc");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let d = doc(json!({ "kind": "gnome" }));
        assert!(doc_to_item("x", &d).is_err());
    }

    #[test]
    fn unknown_decor_kind_is_rejected() {
        let d = doc(json!({ "kind": "decor", "decorKind": "lava-lamp" }));
        assert!(doc_to_item("x", &d).is_err());
    }

    #[test]
    fn label_and_title_fall_back_to_each_other() {
        let d = doc(json!({ "title": "Only Title" }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(item.label, "Only Title");
        assert_eq!(item.title, "Only Title");

        let d = doc(json!({ "label": "Only Label" }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(item.title, "Only Label");
    }

    #[test]
    fn empty_text_gets_a_placeholder() {
        let d = doc(json!({ "label": "", "title": null }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(item.label, "Book");
        assert_eq!(item.title, "Book");

        let d = doc(json!({ "kind": "decor", "decorKind": "candle" }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(item.label, "candle");
    }

    #[test]
    fn out_of_range_shelf_index_decodes_unplaced() {
        let d = doc(json!({ "label": "B", "shelfIndex": 7, "shelfPos": 0.4 }));
        let item = doc_to_item("x", &d).unwrap();
        assert!(item.placement.is_unplaced());
    }

    #[test]
    fn non_numeric_position_is_ignored() {
        let d = doc(json!({ "label": "B", "shelfIndex": 1, "shelfPos": "left" }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(
            item.placement,
            Placement::Placed {
                shelf: ShelfIndex::new(1).unwrap(),
                position: None
            }
        );
    }

    #[test]
    fn zero_page_count_reads_as_none() {
        let d = doc(json!({ "label": "B", "pageCount": 0 }));
        let item = doc_to_item("x", &d).unwrap();
        assert_eq!(
            item.kind,
            ItemKind::Book {
                thumbnail_url: None,
                page_count: None,
                authors: vec![],
                external_id: None
            }
        );
    }
}
