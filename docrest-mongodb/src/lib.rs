//! MongoDB storage engine for docrest.
//!
//! This crate provides a MongoDB-based implementation of the storage engine traits.
//!
//! To use this engine, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docrest = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The connection string is parsed once by the builder. Every
//! [`connect`](docrest_core::backend::StoreConnector::connect) then creates a new driver
//! client from those options and pings the server; closing the connection shuts that
//! client down. Nothing is pooled across resource operations.
//!
//! # Example
//!
//! ```ignore
//! use docrest::{backend::StoreConnectorBuilder, mongodb::MongoDbConnector, session::SessionFactory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = MongoDbConnector::builder("mongodb://localhost:27017")
//!         .build()
//!         .await?;
//!     let sessions = SessionFactory::new(connector, "stable");
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrest_mongodb;

pub mod query;
pub mod store;

pub use store::{MongoDbConnection, MongoDbConnector, MongoDbConnectorBuilder, MongoDbDatabase};
