//! Mercado Core — domain models, shared error types, and repository
//! trait definitions.
//!
//! This crate has no I/O of its own; every other crate in the
//! workspace depends on it.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{MercadoError, MercadoResult};
