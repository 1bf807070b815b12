//! REST API client module for the read-only catalog.
//!
//! This module provides the `CatalogClient` for fetching entities, species,
//! evolution chains and lists, over a pluggable `Transport`. The default
//! transport is `HttpTransport`, backed by reqwest.

pub mod client;
pub mod error;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{CatalogClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use transport::{HttpTransport, Transport};
