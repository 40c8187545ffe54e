//! Core types and pure logic for the PulgaShop client.
//!
//! This crate is deliberately free of HTTP and JSON-probing concerns. The
//! wire crate maps API payloads into the types defined here; the CLI drives
//! both.

pub mod error;
pub mod redirect;
pub mod role;
pub mod rut;
pub mod search;
pub mod session;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
