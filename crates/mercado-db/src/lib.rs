//! Mercado Database — SurrealDB connection management, schema
//! migrations, and repository implementations.
//!
//! The store is treated as an opaque document database: every
//! operation is a single-record find/insert/update/delete. Tests run
//! against the embedded in-memory engine (`mem://`).

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
