//! Record representation and conversions between BSON, JSON and typed documents.
//!
//! Every stored record is a [`Record`] (an ordered BSON document). The record's
//! identifier lives in its [`ID_FIELD`] and is compared by its string form, so a
//! seeded numeric id `1` and a path parameter `"1"` address the same record.

use bson::{Bson, Document as BsonDocument, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A single stored record: field name to tagged value.
pub type Record = BsonDocument;

/// Name of the identifier field carried by every stored record.
pub const ID_FIELD: &str = "id";

/// Doubles at or beyond this magnitude do not fit an `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Returns the string form of an identifier value, if the value can act as one.
pub fn id_string(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) if n.fract() == 0.0 && n.abs() < I64_LIMIT => Some((*n as i64).to_string()),
        Bson::Double(n) => Some(n.to_string()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

/// Converts a JSON value into a record.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidDocument`] if the value is not a JSON object.
pub fn record_from_json(value: Value) -> DocumentStoreResult<Record> {
    match serialize_to_bson(&value)? {
        Bson::Document(doc) => Ok(doc),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected an object, found {:?}",
            other.element_type()
        ))),
    }
}

/// Accessors shared by every stored record.
pub trait RecordExt {
    /// Returns the record identifier as a string, if present.
    fn record_id(&self) -> Option<String>;

    /// Converts the record to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value has no JSON representation.
    fn to_json(&self) -> DocumentStoreResult<Value>;
}

impl RecordExt for Record {
    fn record_id(&self) -> Option<String> {
        self.get(ID_FIELD).and_then(id_string)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }
}

/// Trait implemented by strongly typed records.
///
/// # Example
///
/// ```ignore
/// use docroute::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Post {
///     pub id: String,
///     pub title: String,
/// }
///
/// impl Document for Post {
///     fn collection_name() -> &'static str {
///         "posts"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing conversions between typed documents and records.
///
/// Automatically implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document into a record for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the document is not a map.
    fn to_record(&self) -> DocumentStoreResult<Record>;

    /// Creates a document from a stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_record(record: Record) -> DocumentStoreResult<Self>;

    /// Converts this document to a JSON value.
    fn to_json(&self) -> DocumentStoreResult<Value>;

    /// Creates a document from a JSON value.
    fn from_json(value: Value) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_record(&self) -> DocumentStoreResult<Record> {
        match serialize_to_bson(self)? {
            Bson::Document(doc) => Ok(doc),
            _ => Err(DocumentStoreError::InvalidDocument(format!(
                "{} does not serialize to a map",
                D::collection_name()
            ))),
        }
    }

    fn from_record(record: Record) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(record))?)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> DocumentStoreResult<Self> {
        Ok(from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    #[test]
    fn id_string_normalizes_numbers() {
        assert_eq!(id_string(&Bson::Int32(7)), Some("7".to_string()));
        assert_eq!(id_string(&Bson::Int64(42)), Some("42".to_string()));
        assert_eq!(id_string(&Bson::Double(3.0)), Some("3".to_string()));
        assert_eq!(id_string(&Bson::String("abc".into())), Some("abc".to_string()));
        assert_eq!(id_string(&Bson::Boolean(true)), None);
    }

    #[test]
    fn large_whole_doubles_keep_distinct_ids() {
        let small = id_string(&Bson::Double(1e20)).unwrap();
        let large = id_string(&Bson::Double(1e21)).unwrap();

        assert_ne!(small, large);
        assert_eq!(small, "100000000000000000000");
        assert_eq!(id_string(&Bson::Double(-2.0)), Some("-2".to_string()));
    }

    #[test]
    fn record_from_json_rejects_non_objects() {
        assert!(record_from_json(json!([1, 2])).is_err());

        let record = record_from_json(json!({ "id": "p1", "title": "Hello" })).unwrap();
        assert_eq!(record.record_id().as_deref(), Some("p1"));
        assert_eq!(record.get_str("title").unwrap(), "Hello");
    }

    #[test]
    fn record_to_json_keeps_fields() {
        let record = doc! { "id": 1, "title": "Hello", "tags": ["a", "b"] };
        let value = record.to_json().unwrap();

        assert_eq!(value, json!({ "id": 1, "title": "Hello", "tags": ["a", "b"] }));
    }
}
