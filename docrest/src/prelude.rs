//! Convenient re-exports of commonly used types from docrest.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docrest::prelude::*;
//! ```

pub use docrest_core::{
    backend::{StoreConnection, StoreConnector, StoreConnectorBuilder, StoreDatabase},
    client::{ResourceClient, ResourceConfig},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, FilterVisitor, Query, QueryBuilder},
    repository::ResourceRepository,
    resource::Resource,
    schema::{ResourceSchema, ValidationResult, Violation},
    session::{SessionFactory, with_db},
};
