//! # odoorpc-common
//!
//! Shared connection types for the odoorpc Odoo JSON-RPC client.
//!
//! This crate holds the configuration value type consumed by
//! `odoorpc-client`: endpoint URL (normalized at construction), database,
//! credentials, and the optional intermediary proxy URL.
//!
//! ## Example
//!
//! ```
//! use odoorpc_common::ConnectionConfig;
//!
//! let config = ConnectionConfig::new(
//!     "mycompany.odoo.com/jsonrpc/",
//!     "mycompany",
//!     "admin@mycompany.com",
//!     "api-key",
//! );
//!
//! // The URL is normalized: scheme added, trailing slash and /jsonrpc
//! // suffix stripped.
//! assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
//! assert_eq!(config.jsonrpc_endpoint(), "https://mycompany.odoo.com/jsonrpc");
//! ```

/// Connection configuration for one Odoo backend.
pub mod connection;

pub use connection::ConnectionConfig;
