//! In-memory storage engine for docrest.
//!
//! This crate provides a thread-safe, in-memory implementation of the storage engine
//! traits. It is the engine of choice for tests and local development: it needs no
//! server, it tracks every connection opened and closed, and it can simulate an outage.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Engine semantics** - `_id` assignment on insert, field-merge updates, natural
//!   insertion order, numeric and array-aware equality in filters
//! - **Connection accounting** - [`InMemoryStore::connections_opened`] and
//!   [`InMemoryStore::open_connections`]
//!
//! # Quick Start
//!
//! ```ignore
//! use docrest::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::builder().build().await?;
//!     let ponies = ResourceClient::<_, Pony>::new(
//!         SessionFactory::new(store.clone(), "stable"),
//!         pony_config()?,
//!     );
//!
//!     ponies.create(&Pony { id: None, name: "Bolt".into() }).await?;
//!     assert_eq!(store.open_connections(), 0);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrest_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryConnection, InMemoryDatabase, InMemoryStore, InMemoryStoreBuilder};
