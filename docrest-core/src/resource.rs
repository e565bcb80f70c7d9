//! Core trait for records managed by a resource client.
//!
//! A resource is any serializable record that may carry a storage-assigned identifier.
//! The identifier lives under the `_id` field and is absent until the record has been
//! persisted.
//!
//! # Example
//!
//! ```ignore
//! use docrest::resource::Resource;
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Pony {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//!
//! impl Resource for Pony {
//!     fn id(&self) -> Option<&ObjectId> {
//!         self.id.as_ref()
//!     }
//! }
//! ```

use bson::{Bson, Document, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, to_value};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Trait that every record type handled by a resource client must implement.
///
/// The bounds mirror what the repository needs: the record is serialized for validation
/// and storage, deserialized on every read, and moved across async tasks.
pub trait Resource: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the storage-assigned identifier, if the resource has been persisted.
    fn id(&self) -> Option<&ObjectId>;
}

/// Converts a serializable value into the JSON form the schema validator inspects.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Value> {
    Ok(to_value(value)?)
}

/// Converts a serializable value into a BSON document ready to be written.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidDocument`] if the value does not serialize to a
/// document (e.g. a bare string or an array).
pub fn to_document<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Document> {
    match serialize_to_bson(value)? {
        Bson::Document(document) => Ok(document),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected a document, got {:?}",
            other.element_type()
        ))),
    }
}

/// Reads a stored document back into a resource.
pub fn from_document<R: Resource>(document: Document) -> DocumentStoreResult<R> {
    Ok(deserialize_from_bson(Bson::Document(document))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pony {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        name: String,
    }

    impl Resource for Pony {
        fn id(&self) -> Option<&ObjectId> {
            self.id.as_ref()
        }
    }

    #[test]
    fn unsaved_resource_has_no_id_field() {
        let pony = Pony { id: None, name: "Bolt".into() };

        assert_eq!(to_document(&pony).unwrap(), doc! { "name": "Bolt" });
        assert_eq!(to_json(&pony).unwrap(), json!({ "name": "Bolt" }));
    }

    #[test]
    fn reads_stored_document() {
        let id = ObjectId::new();
        let pony: Pony = from_document(doc! { "_id": id, "name": "Bolt" }).unwrap();

        assert_eq!(pony.id(), Some(&id));
        assert_eq!(pony.name, "Bolt");
    }

    #[test]
    fn rejects_non_document_values() {
        assert!(matches!(
            to_document(&vec![1, 2, 3]),
            Err(DocumentStoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn surfaces_shape_mismatch_as_serialization_error() {
        let result = from_document::<Pony>(doc! { "nickname": "Bolt" });

        assert!(matches!(result, Err(DocumentStoreError::Serialization(_))));
    }
}
