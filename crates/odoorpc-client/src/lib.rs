//! # odoorpc-client
//!
//! Client library for talking to Odoo backends over JSON-RPC, directly or
//! through an intermediary HTTP proxy with its own envelope.
//!
//! The crate provides one uniform call surface — the [`ErpClient`] trait,
//! implemented by [`OdooClient`] — over backends that disagree wildly about
//! reply shapes. Replies are reconciled by an ordered chain of unwrap rules
//! (see [`jsonrpc::normalize`]) into a single canonical
//! [`serde_json::Value`].
//!
//! ## Example
//!
//! ```no_run
//! use odoorpc_client::OdooClient;
//! use odoorpc_common::ConnectionConfig;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConnectionConfig::new(
//!     "https://mycompany.odoo.com",
//!     "mycompany",
//!     "admin@mycompany.com",
//!     "api-key",
//! );
//! let client = OdooClient::new(config)?;
//!
//! // Facade verbs are self-authenticating.
//! let partners = client
//!     .search_read(
//!         "res.partner",
//!         vec![json!(["is_company", "=", true])],
//!         vec!["name".to_string(), "email".to_string()],
//!     )
//!     .await?;
//!
//! let id = client.create("res.partner", json!({ "name": "New partner" })).await?;
//! client.write("res.partner", id.as_i64().unwrap_or_default(), json!({ "active": false })).await?;
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use odoorpc_common::ConnectionConfig;

pub mod error;
pub mod jsonrpc;

pub use error::ClientError;
pub use jsonrpc::OdooClient;

/// Uniform call surface over an ERP backend.
///
/// [`OdooClient`] is the JSON-RPC implementation; the trait is the seam for
/// tests and for callers that should not care which transport variant sits
/// underneath. Results are canonical [`serde_json::Value`]s — a scalar id,
/// a record, a sequence, or `Null` — already stripped of every envelope the
/// backend or proxy wrapped around them.
#[must_use = "ErpClient must be used to make requests"]
#[async_trait]
pub trait ErpClient: Send + Sync {
    /// The connection settings this client was built from.
    fn config(&self) -> &ConnectionConfig;

    /// Server version info; requires no session.
    ///
    /// # Errors
    ///
    /// Transport and backend errors; see [`ClientError`].
    async fn version(&self) -> Result<Value>;

    /// Obtains a session identifier and caches it for later operations.
    ///
    /// Calling again re-authenticates and overwrites the cached value.
    ///
    /// # Errors
    ///
    /// [`ClientError::AuthenticationError`] when the backend yields no
    /// usable session identifier, besides the usual transport errors.
    async fn authenticate(&self) -> Result<i64>;

    /// Reads records of `model` matching `domain`, projected onto `fields`.
    ///
    /// # Errors
    ///
    /// Transport, authentication, and backend errors.
    async fn search_read(
        &self,
        model: &str,
        domain: Vec<Value>,
        fields: Vec<String>,
    ) -> Result<Value>;

    /// Creates a record of `model`, returning its raw id.
    ///
    /// # Errors
    ///
    /// Transport, authentication, and backend errors.
    async fn create(&self, model: &str, values: Value) -> Result<Value>;

    /// Updates the record `id` of `model` with `values`.
    ///
    /// # Errors
    ///
    /// Transport, authentication, and backend errors.
    async fn write(&self, model: &str, id: i64, values: Value) -> Result<Value>;

    /// Generic dispatch for any model method — the universal entry point
    /// the named verbs funnel through.
    ///
    /// Implementations authenticate lazily when no session is cached, so
    /// callers never need to call [`authenticate`](Self::authenticate)
    /// explicitly. They are not self-retrying: an expired session is not
    /// detected or refreshed.
    ///
    /// # Errors
    ///
    /// Transport, authentication, and backend errors.
    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Value,
    ) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;
    use tokio::sync::Mutex;

    use super::*;

    // Mock implementation for testing
    struct MockErpClient {
        config: ConnectionConfig,
        uid: Mutex<Option<i64>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockErpClient {
        fn new() -> Self {
            Self {
                config: ConnectionConfig::new("mock.example.com", "mockdb", "mock@example.com", "k"),
                uid: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ErpClient for MockErpClient {
        fn config(&self) -> &ConnectionConfig {
            &self.config
        }

        async fn version(&self) -> Result<Value> {
            Ok(json!({ "server_version": "mock" }))
        }

        async fn authenticate(&self) -> Result<i64> {
            *self.uid.lock().await = Some(2);
            Ok(2)
        }

        async fn search_read(
            &self,
            model: &str,
            domain: Vec<Value>,
            fields: Vec<String>,
        ) -> Result<Value> {
            self.execute_kw(model, "search_read", vec![Value::Array(domain)], json!({ "fields": fields }))
                .await
        }

        async fn create(&self, model: &str, values: Value) -> Result<Value> {
            self.execute_kw(model, "create", vec![values], json!({})).await
        }

        async fn write(&self, model: &str, id: i64, values: Value) -> Result<Value> {
            self.execute_kw(model, "write", vec![json!([id]), values], json!({}))
                .await
        }

        async fn execute_kw(
            &self,
            model: &str,
            method: &str,
            _args: Vec<Value>,
            _kwargs: Value,
        ) -> Result<Value> {
            if self.uid.lock().await.is_none() {
                self.authenticate().await?;
            }
            self.calls.lock().await.push(format!("{model}.{method}"));
            Ok(match method {
                "create" => json!(42),
                "write" => json!(true),
                _ => json!([]),
            })
        }
    }

    #[tokio::test]
    async fn facade_verbs_funnel_through_execute_kw() {
        let client = MockErpClient::new();

        client.search_read("res.partner", vec![], vec![]).await.unwrap();
        assert_eq!(client.create("res.partner", json!({})).await.unwrap(), json!(42));
        assert_eq!(
            client.write("res.partner", 5, json!({})).await.unwrap(),
            json!(true)
        );

        let calls = client.calls.lock().await.clone();
        assert_eq!(
            calls,
            vec![
                "res.partner.search_read",
                "res.partner.create",
                "res.partner.write"
            ]
        );
    }

    #[tokio::test]
    async fn first_model_operation_authenticates() {
        let client = MockErpClient::new();
        assert_eq!(*client.uid.lock().await, None);

        client.search_read("res.partner", vec![], vec![]).await.unwrap();
        assert_eq!(*client.uid.lock().await, Some(2));
    }

    #[tokio::test]
    async fn trait_objects_expose_the_config() {
        let client: Box<dyn ErpClient> = Box::new(MockErpClient::new());
        assert_eq!(client.config().database, "mockdb");
        assert_eq!(client.config().endpoint_url, "https://mock.example.com");
    }
}
