//! Domain models for Mercado.
//!
//! These are the core types shared across all crates.

pub mod chat;
pub mod product;
pub mod user;
