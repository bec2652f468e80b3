//! Odoo JSON-RPC wire types and client implementation.
//!
//! This module provides the request envelope types for Odoo's external
//! JSON-RPC API, the superset body used when routing through an
//! intermediary proxy, and the [`OdooClient`] that drives them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use odoorpc_common::ConnectionConfig;

pub mod client;
pub mod normalize;

pub use client::OdooClient;

/// JSON-RPC protocol revision sent in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Exclusive upper bound for request-correlation ids.
///
/// Kept at the wire-visible range of the original connector generation, so
/// ids stay short in backend logs.
pub const REQUEST_ID_BOUND: u64 = 1000;

/// Positional parameters of one JSON-RPC call.
#[derive(Debug, Clone, Serialize)]
pub struct RpcParams {
    /// Backend service: `"common"` for session-level operations,
    /// `"object"` for model operations.
    pub service: String,
    /// Service-level method name.
    pub method: String,
    /// Positional arguments, passed through verbatim.
    pub args: Vec<Value>,
}

/// The JSON-RPC 2.0 envelope POSTed to the backend.
///
/// In direct mode this is the entire HTTP body; in proxy mode it rides
/// inside a [`ProxyRequest`].
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: &'static str,
    /// Always `"call"` — Odoo's JSON-RPC dispatcher accepts nothing else.
    pub method: &'static str,
    /// The service call being dispatched.
    pub params: RpcParams,
    /// Request-correlation token in `[0, REQUEST_ID_BOUND)`.
    ///
    /// Nothing correlates replies out of order over HTTP, so collisions are
    /// harmless; the value mostly helps when reading backend logs.
    pub id: u64,
}

impl RpcRequest {
    /// Builds an envelope for one service call.
    pub fn new(
        service: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
        id: u64,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: "call",
            params: RpcParams {
                service: service.into(),
                method: method.into(),
                args,
            },
            id,
        }
    }
}

/// Superset envelope POSTed to an intermediary proxy.
///
/// Proxy implementations are not standardized: some forward `rpcData` to
/// the backend untouched, others expect a flattened shape with credentials
/// at the top level. The body carries both, paying a small payload-size
/// cost for compatibility with either kind.
#[derive(Clone, Serialize)]
pub struct ProxyRequest {
    /// The resolved direct endpoint, for proxies that relay to it.
    #[serde(rename = "odooUrl")]
    pub odoo_url: String,
    /// The full JSON-RPC envelope, for proxies that forward it untouched.
    #[serde(rename = "rpcData")]
    pub rpc_data: RpcRequest,
    /// Flattened fields for proxies that expect them instead of nested
    /// JSON-RPC.
    pub url: String,
    /// Target database name.
    pub db: String,
    /// Login of the acting user.
    pub username: String,
    /// The API key doubles as the password in the flattened shape.
    pub password: String,
    /// The API key again, under the name some proxies look for.
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

// Custom Debug implementation to avoid exposing credentials
impl fmt::Debug for ProxyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRequest")
            .field("odoo_url", &self.odoo_url)
            .field("rpc_data", &self.rpc_data)
            .field("url", &self.url)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ProxyRequest {
    /// Wraps an envelope in the dual-shape proxy body.
    #[must_use]
    pub fn new(config: &ConnectionConfig, rpc_data: RpcRequest) -> Self {
        Self {
            odoo_url: config.jsonrpc_endpoint(),
            rpc_data,
            url: config.endpoint_url.clone(),
            db: config.database.clone(),
            username: config.username.clone(),
            password: config.api_key.expose_secret().to_string(),
            api_key: config.api_key.expose_secret().to_string(),
        }
    }
}

/// Monotonic source of request-correlation ids.
///
/// The original connector drew ids at random; nothing correlates replies,
/// so a deterministic wrapping counter keeps the same wire range while
/// making request logs reproducible. One sequence lives on each client.
#[derive(Debug, Default)]
pub struct RequestIdSequence(AtomicU64);

impl RequestIdSequence {
    /// A sequence whose first id is `start` (modulo [`REQUEST_ID_BOUND`]).
    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self(AtomicU64::new(start))
    }

    /// The next id in `[0, REQUEST_ID_BOUND)`.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) % REQUEST_ID_BOUND
    }
}
