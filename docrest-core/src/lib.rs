//! Schema-validated resource clients over a JSON document store.
//!
//! This crate is the core of the docrest project and provides:
//!
//! - **Resource trait** ([`resource`]) - The record contract and BSON/JSON conversions
//! - **Storage engine abstraction** ([`backend`]) - Connector, connection and database traits
//! - **Filters and queries** ([`query`]) - Exact-field filters with an optional limit
//! - **Schema validation** ([`schema`]) - Closed-world validation with violation reports
//! - **Scoped sessions** ([`session`]) - One connection per operation, always closed
//! - **Repository** ([`repository`]) - Generic get/list/create/update primitives
//! - **Resource clients** ([`client`]) - Configuration bound to the four operations
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docrest::prelude::*;
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

#[allow(unused_extern_crates)]
extern crate self as docrest_core;

pub mod backend;
pub mod client;
pub mod error;
pub mod query;
pub mod repository;
pub mod resource;
pub mod schema;
pub mod session;
