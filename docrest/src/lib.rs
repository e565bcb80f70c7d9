//! Main docrest crate providing schema-validated resource clients over document stores.
//!
//! This crate is the primary entry point for users of docrest. It re-exports the core
//! types from the sub-crates and gives access to the available storage engines.
//!
//! # Features
//!
//! - **Typed resources** - Define records with Serde and read them back as typed values
//! - **Closed-world schemas** - Every create and update is validated before it is written
//! - **Scoped sessions** - Each operation opens, uses and closes its own connection
//! - **Pluggable engines** - In-memory and MongoDB engines behind one set of traits
//!
//! # Quick Start
//!
//! ```ignore
//! use docrest::{prelude::*, memory::InMemoryStore};
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Pony {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//!
//! impl Resource for Pony {
//!     fn id(&self) -> Option<&ObjectId> { self.id.as_ref() }
//! }
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let schema = ResourceSchema::new(json!({
//!         "type": "object",
//!         "required": ["name"],
//!         "properties": { "name": { "type": "string" } },
//!     }))?;
//!
//!     let ponies = ResourceClient::<_, Pony>::new(
//!         SessionFactory::new(InMemoryStore::builder().build().await?, "stable"),
//!         ResourceConfig::new("ponies", 25, schema)?,
//!     );
//!
//!     // Validated, inserted, then read back with its generated identifier
//!     let bolt = ponies.create(&json!({ "name": "Bolt" })).await?;
//!
//!     // Only the given fields are overwritten
//!     let renamed = ponies
//!         .update(Filter::by_id(*bolt.id().unwrap()), &json!({ "name": "Blitz" }))
//!         .await?;
//!
//!     println!("Renamed pony: {:?}", renamed);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Engines
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB storage (requires `mongodb` feature)

pub mod prelude;

pub use docrest_core::{backend, client, error, query, repository, resource, schema, session};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage engine implementations.
pub mod memory {
    pub use docrest_memory::{InMemoryConnection, InMemoryDatabase, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage engine implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docrest_mongodb::{MongoDbConnection, MongoDbConnector, MongoDbConnectorBuilder, MongoDbDatabase};
}
