//! HTTP endpoint serving schema-validated unicorn records.
//!
//! The crate wires one docrest [`ResourceClient`](docrest::client::ResourceClient) for the
//! [`Unicorn`](unicorn::Unicorn) resource to a single axum route. The binary runs it over
//! MongoDB; tests run the same router over the in-memory engine.
//!
//! ```ignore
//! use docrest::{memory::InMemoryStore, prelude::*};
//! use unicorn_api::{app, unicorn::unicorn_config};
//!
//! let client = ResourceClient::new(
//!     SessionFactory::new(InMemoryStore::new(), "stable"),
//!     unicorn_config()?,
//! );
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app(client)).await?;
//! ```

pub mod config;
pub mod handler;
pub mod telemetry;
pub mod unicorn;

use axum::Router;
use docrest::backend::StoreConnector;

use crate::handler::{UNICORNS_PATH, UnicornClient, router};

/// Builds the application router with the unicorn collection on [`UNICORNS_PATH`].
pub fn app<C>(client: UnicornClient<C>) -> Router
where
    C: StoreConnector + 'static,
{
    router(client, UNICORNS_PATH)
}
