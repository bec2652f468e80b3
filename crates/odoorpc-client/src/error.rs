//! Error types for the client library.

use thiserror::Error;

/// Errors that can occur when talking to an Odoo backend or proxy.
///
/// Every failure propagates to the immediate caller; there is no retry or
/// local recovery anywhere in the client, with a single exception: a
/// backend error marking a void result that failed only at serialization
/// time is masked as a successful call (see
/// [`VOID_MARSHAL_MARKER`](crate::jsonrpc::normalize::VOID_MARSHAL_MARKER)).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network-level failure reaching the endpoint.
    ///
    /// DNS resolution, refused connections, or timeouts from the underlying
    /// HTTP client (which supplies the only timeouts this client has).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP request failed with status {status}")]
    HttpError {
        /// The status code of the response.
        status: u16,
    },

    /// The response body is not JSON.
    ///
    /// Typically an HTML error page from a load balancer or a misconfigured
    /// proxy.
    #[error("invalid response from server (not JSON): {snippet}")]
    ProtocolError {
        /// The first 100 characters of the raw body, for diagnostics.
        snippet: String,
    },

    /// JSON serialization or deserialization error.
    ///
    /// Occurs when the request body cannot be encoded or a JSON-labelled
    /// response body does not parse.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Application error reported by the backend or an intermediary proxy.
    ///
    /// Carries the best human-readable message the reply offered.
    #[error("rpc error: {0}")]
    RpcError(String),

    /// The authentication exchange completed at the transport level but
    /// produced no usable session identifier.
    #[error("authentication failed: {0}")]
    AuthenticationError(String),

    /// Client construction problem.
    ///
    /// The normalized endpoint URL does not parse, or the HTTP client could
    /// not be built.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl ClientError {
    /// Check if this error happened below the RPC layer.
    ///
    /// Returns `true` for network failures and non-success HTTP statuses.
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::HttpError { .. })
    }

    /// Check if this is an authentication error.
    #[must_use]
    pub const fn is_authentication_error(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }

    /// Check if this is an application error reported by the backend or
    /// proxy.
    #[must_use]
    pub const fn is_rpc_error(&self) -> bool {
        matches!(self, Self::RpcError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifiers_match_their_variants() {
        assert!(ClientError::HttpError { status: 502 }.is_transport_error());
        assert!(ClientError::RpcError("boom".to_string()).is_rpc_error());
        assert!(
            ClientError::AuthenticationError("no uid".to_string()).is_authentication_error()
        );
        assert!(!ClientError::RpcError("boom".to_string()).is_transport_error());
    }

    #[test]
    fn display_carries_the_diagnostic_payload() {
        let error = ClientError::ProtocolError {
            snippet: "<html>".to_string(),
        };
        assert!(error.to_string().contains("<html>"));

        let error = ClientError::HttpError { status: 500 };
        assert!(error.to_string().contains("500"));
    }
}
