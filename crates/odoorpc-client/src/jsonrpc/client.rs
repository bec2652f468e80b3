//! Odoo JSON-RPC client implementation.
//!
//! This module provides [`OdooClient`], the transport behind every
//! operation of the [`ErpClient`](crate::ErpClient) trait.
//!
//! # Routing
//!
//! Without a proxy, the JSON-RPC envelope is POSTed verbatim to
//! `{endpoint_url}/jsonrpc`. With a proxy, the
//! [`ProxyRequest`](super::ProxyRequest) superset body is POSTed to the
//! proxy URL instead; the proxy decides which of its two shapes to use.
//!
//! # Sessions
//!
//! Model operations authenticate lazily: the first `execute_kw` without a
//! cached session identifier performs the `common`/`authenticate` exchange
//! and caches the uid for the life of the client. The check is not
//! single-flight — concurrent first calls may each authenticate, last
//! writer wins — and an expired session is not detected or refreshed.
//!
//! # Examples
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
//! // Self-authenticating: no explicit authenticate() needed.
//! let companies = client
//!     .search_read(
//!         "res.partner",
//!         vec![json!(["is_company", "=", true])],
//!         vec!["name".to_string()],
//!     )
//!     .await?;
//! println!("{companies}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, warn};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use odoorpc_common::ConnectionConfig;

use crate::ErpClient;
use crate::error::ClientError;
use crate::jsonrpc::normalize::{normalize, session_uid};
use crate::jsonrpc::{ProxyRequest, RequestIdSequence, RpcRequest};

/// Client for one Odoo backend, direct or proxied.
///
/// Cloning is cheap; clones share the HTTP connection pool, the session
/// cache, and the request-id sequence.
#[derive(Debug, Clone)]
pub struct OdooClient {
    http: reqwest::Client,
    config: Arc<ConnectionConfig>,
    /// Cached session identifier; `None` until the first successful
    /// authentication.
    uid: Arc<Mutex<Option<i64>>>,
    request_ids: Arc<RequestIdSequence>,
}

impl OdooClient {
    /// Creates a client from a connection configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use odoorpc_client::OdooClient;
    /// use odoorpc_common::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::new(
    ///     "mycompany.odoo.com",
    ///     "mycompany",
    ///     "admin@mycompany.com",
    ///     "api-key",
    /// );
    /// let client = OdooClient::new(config)?;
    /// # Ok::<(), odoorpc_client::ClientError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`ClientError::ConfigurationError`] if the normalized endpoint URL
    /// does not parse, [`ClientError::NetworkError`] if the HTTP client
    /// cannot be constructed.
    pub fn new(config: ConnectionConfig) -> Result<Self, ClientError> {
        url::Url::parse(&config.jsonrpc_endpoint()).map_err(|e| {
            ClientError::ConfigurationError(format!(
                "invalid endpoint URL '{}': {e}",
                config.endpoint_url
            ))
        })?;

        // No timeout configuration here: the component relies entirely on
        // the HTTP client's defaults.
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            uid: Arc::new(Mutex::new(None)),
            request_ids: Arc::new(RequestIdSequence::default()),
        })
    }

    /// Replaces the request-id sequence.
    ///
    /// Ids are deterministic either way; this pins their starting point,
    /// e.g. to keep wire expectations stable across test setups.
    #[must_use]
    pub fn with_request_ids(mut self, request_ids: RequestIdSequence) -> Self {
        self.request_ids = Arc::new(request_ids);
        self
    }

    /// The connection settings this client was built from.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The cached session identifier, if authentication has succeeded.
    pub async fn session_id(&self) -> Option<i64> {
        *self.uid.lock().await
    }

    /// Performs one raw RPC call and normalizes the reply.
    ///
    /// This is the primitive every facade operation funnels through:
    /// envelope construction, direct-vs-proxy routing, the HTTP exchange,
    /// and the unwrap chain of
    /// [`normalize`](crate::jsonrpc::normalize::normalize).
    ///
    /// # Errors
    ///
    /// See [`ClientError`] for the taxonomy. No retries are performed;
    /// every failure propagates immediately.
    pub async fn call(
        &self,
        service: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, ClientError> {
        let envelope = RpcRequest::new(service, method, args, self.request_ids.next_id());

        let (endpoint, body) = match self.config.proxy_url.as_deref() {
            Some(proxy) => (
                proxy.to_string(),
                serde_json::to_string(&ProxyRequest::new(&self.config, envelope.clone()))?,
            ),
            None => (
                self.config.jsonrpc_endpoint(),
                serde_json::to_string(&envelope)?,
            ),
        };

        debug!(
            "calling {service}/{method} at {endpoint} (proxy: {})",
            self.config.proxy_url.is_some()
        );

        let response = self
            .http
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("network error calling {service}/{method} at {endpoint}: {e}");
                ClientError::NetworkError(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("{service}/{method} at {endpoint} failed with HTTP status {status}");
            return Err(ClientError::HttpError {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await.map_err(|e| {
            error!("failed to read response body from {endpoint}: {e}");
            ClientError::NetworkError(e)
        })?;

        if !content_type.contains("application/json") {
            warn!(
                "non-JSON response from {endpoint}: {}",
                text.chars().take(500).collect::<String>()
            );
            return Err(ClientError::ProtocolError {
                snippet: text.chars().take(100).collect(),
            });
        }

        let decoded: Value = serde_json::from_str(&text).map_err(|e| {
            error!("undecodable JSON from {endpoint}: {e}");
            ClientError::SerializationError(e)
        })?;
        debug!("reply for {service}/{method}: {decoded}");

        normalize(decoded, method, &envelope.params.args)
    }

    /// Authenticates against the backend and caches the session identifier.
    ///
    /// Tolerates both reply shapes in the wild: a bare integer uid (stock
    /// Odoo) and an object carrying a `uid` field (some proxies). Calling
    /// again re-authenticates and overwrites the cached uid.
    ///
    /// # Errors
    ///
    /// [`ClientError::AuthenticationError`] when the exchange succeeds at
    /// the transport level but yields no usable session identifier.
    pub async fn authenticate(&self) -> Result<i64, ClientError> {
        let args = vec![
            json!(self.config.database),
            json!(self.config.username),
            json!(self.config.api_key.expose_secret()),
            json!({}),
        ];
        let reply = self
            .call("common", "authenticate", args)
            .await
            .map_err(|e| {
                error!(
                    "authentication against {} failed: {e}",
                    self.config.endpoint_url
                );
                e
            })?;

        let Some(uid) = session_uid(&reply) else {
            error!("authentication reply carried no usable session identifier: {reply}");
            return Err(ClientError::AuthenticationError(
                "no valid session identifier received".to_string(),
            ));
        };

        *self.uid.lock().await = Some(uid);
        debug!("authenticated against {} as uid {uid}", self.config.database);
        Ok(uid)
    }

    /// Server version info; requires no session.
    pub async fn version(&self) -> Result<Value, ClientError> {
        self.call("common", "version", Vec::new()).await
    }

    /// Generic `execute_kw` dispatch, the universal model-operation entry
    /// point.
    ///
    /// Authenticates lazily when no session identifier is cached yet; see
    /// the module docs for the concurrency caveat.
    ///
    /// # Errors
    ///
    /// Everything [`call`](Self::call) can produce, plus authentication
    /// failures from the lazy login.
    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Value,
    ) -> Result<Value, ClientError> {
        // Read-then-maybe-write without holding the lock across the
        // authenticate exchange; concurrent first calls may each log in.
        let cached = *self.uid.lock().await;
        let uid = match cached {
            Some(uid) => uid,
            None => self.authenticate().await?,
        };

        self.call(
            "object",
            "execute_kw",
            vec![
                json!(self.config.database),
                json!(uid),
                json!(self.config.api_key.expose_secret()),
                json!(model),
                json!(method),
                Value::Array(args),
                kwargs,
            ],
        )
        .await
    }

    /// `search_read` on a model: positional domain, `fields` keyword.
    pub async fn search_read(
        &self,
        model: &str,
        domain: Vec<Value>,
        fields: Vec<String>,
    ) -> Result<Value, ClientError> {
        self.execute_kw(
            model,
            "search_read",
            vec![Value::Array(domain)],
            json!({ "fields": fields }),
        )
        .await
    }

    /// Creates one record, yielding its raw id.
    pub async fn create(&self, model: &str, values: Value) -> Result<Value, ClientError> {
        self.execute_kw(model, "create", vec![values], json!({})).await
    }

    /// Updates the record `id` with `values`; yields `true` on success.
    pub async fn write(&self, model: &str, id: i64, values: Value) -> Result<Value, ClientError> {
        self.execute_kw(model, "write", vec![json!([id]), values], json!({}))
            .await
    }
}

#[async_trait]
impl ErpClient for OdooClient {
    fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn version(&self) -> Result<Value> {
        Ok(OdooClient::version(self).await?)
    }

    async fn authenticate(&self) -> Result<i64> {
        Ok(OdooClient::authenticate(self).await?)
    }

    async fn search_read(
        &self,
        model: &str,
        domain: Vec<Value>,
        fields: Vec<String>,
    ) -> Result<Value> {
        Ok(OdooClient::search_read(self, model, domain, fields).await?)
    }

    async fn create(&self, model: &str, values: Value) -> Result<Value> {
        Ok(OdooClient::create(self, model, values).await?)
    }

    async fn write(&self, model: &str, id: i64, values: Value) -> Result<Value> {
        Ok(OdooClient::write(self, model, id, values).await?)
    }

    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Value,
    ) -> Result<Value> {
        Ok(OdooClient::execute_kw(self, model, method, args, kwargs).await?)
    }
}
