//! Synchronous client core for a user's public key API.
//!
//! # Overview
//! Builds `HttpRequest` values against a versioned REST root and decodes
//! `HttpResponse` values into typed records. Network I/O sits behind the
//! [`Transport`] trait; callers either run requests themselves (host-does-IO)
//! or pass a transport into each operation.
//!
//! # Design
//! - `KeysClient` holds only read-only configuration and is safe to share.
//! - Each key operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), with a transport-driven method on top.
//! - Every result carries response metadata; so do errors raised after a
//!   response arrived.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod keys;
pub mod transport;
pub mod types;

pub use client::{KeysClient, Reply};
pub use config::ClientConfig;
pub use error::{Error, ErrorDetail, FieldError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Rate, Response};
pub use transport::{Transport, UreqTransport};
pub use types::KeyRecord;
