use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Connection settings for one Odoo backend.
///
/// The endpoint URL is normalized once at construction so the transport can
/// append `/jsonrpc` uniformly; everything else is carried verbatim. Bad
/// database names or credentials are not validated here — they surface as
/// authentication failures on the first call.
///
/// # Security
///
/// The `api_key` field uses `SecretString` to prevent accidental logging or
/// display of the credential. It is never serialized.
///
/// # Examples
///
/// ```
/// use odoorpc_common::ConnectionConfig;
///
/// let config = ConnectionConfig::new(
///     "https://mycompany.odoo.com/",
///     "mycompany",
///     "admin@mycompany.com",
///     "api-key",
/// )
/// .with_proxy_url("https://relay.example.com/odoo");
///
/// assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Normalized base URL of the Odoo instance.
    ///
    /// Invariant: never ends in `/` or `/jsonrpc`.
    pub endpoint_url: String,
    /// Target database name.
    pub database: String,
    /// Login of the acting user.
    pub username: String,
    /// API key, sent in place of a password (stored securely).
    ///
    /// Will not be serialized to prevent accidental exposure.
    #[serde(skip_serializing, default = "empty_api_key")]
    pub api_key: SecretString,
    /// Optional intermediary proxy endpoint.
    ///
    /// When set, every request is POSTed here instead of the direct
    /// `/jsonrpc` endpoint.
    pub proxy_url: Option<String>,
}

fn empty_api_key() -> SecretString {
    SecretString::new(String::new().into())
}

impl ConnectionConfig {
    /// Creates a configuration from raw connection parameters.
    ///
    /// The URL is normalized: surrounding whitespace trimmed, one trailing
    /// `/` removed, a trailing `/jsonrpc` suffix removed, and `https://`
    /// prepended when no scheme is present.
    ///
    /// # Arguments
    ///
    /// * `url` - Base URL of the Odoo instance, in any of the common
    ///   hand-typed forms
    /// * `database` - Target database name
    /// * `username` - Login of the acting user
    /// * `api_key` - API key used in place of a password
    pub fn new(
        url: impl AsRef<str>,
        database: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_url: normalize_endpoint_url(url.as_ref()),
            database: database.into(),
            username: username.into(),
            api_key: SecretString::new(api_key.into().into()),
            proxy_url: None,
        }
    }

    /// Routes all requests through an intermediary proxy.
    ///
    /// # Arguments
    ///
    /// * `proxy_url` - Full URL of the proxy endpoint
    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// The direct JSON-RPC endpoint for this instance.
    #[must_use]
    pub fn jsonrpc_endpoint(&self) -> String {
        format!("{}/jsonrpc", self.endpoint_url)
    }
}

/// Cleans up the hand-typed URL forms users paste in.
///
/// A trailing `/jsonrpc` is stripped so the transport can append it
/// uniformly whether or not the user included it.
fn normalize_endpoint_url(raw: &str) -> String {
    let mut clean = raw.trim();
    clean = clean.strip_suffix('/').unwrap_or(clean);
    clean = clean.strip_suffix("/jsonrpc").unwrap_or(clean);
    if clean.starts_with("http") {
        clean.to_string()
    } else {
        format!("https://{clean}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn plain_url_passes_through() {
        let config = ConnectionConfig::new("https://mycompany.odoo.com", "db", "user", "key");
        assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ConnectionConfig::new("https://mycompany.odoo.com/", "db", "user", "key");
        assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
    }

    #[test]
    fn jsonrpc_suffix_is_stripped() {
        let config =
            ConnectionConfig::new("https://mycompany.odoo.com/jsonrpc", "db", "user", "key");
        assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
    }

    #[test]
    fn jsonrpc_suffix_with_trailing_slash_is_stripped() {
        let config =
            ConnectionConfig::new("https://mycompany.odoo.com/jsonrpc/", "db", "user", "key");
        assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
    }

    #[test]
    fn missing_scheme_defaults_to_https() {
        let config = ConnectionConfig::new("mycompany.odoo.com", "db", "user", "key");
        assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
    }

    #[test]
    fn http_scheme_is_preserved() {
        let config = ConnectionConfig::new("http://localhost:8069", "db", "user", "key");
        assert_eq!(config.endpoint_url, "http://localhost:8069");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let config = ConnectionConfig::new("  mycompany.odoo.com/jsonrpc/  ", "db", "user", "key");
        assert_eq!(config.endpoint_url, "https://mycompany.odoo.com");
    }

    #[test]
    fn jsonrpc_endpoint_appends_the_path() {
        let config = ConnectionConfig::new("mycompany.odoo.com", "db", "user", "key");
        assert_eq!(
            config.jsonrpc_endpoint(),
            "https://mycompany.odoo.com/jsonrpc"
        );
    }

    #[test]
    fn proxy_url_is_none_by_default() {
        let config = ConnectionConfig::new("mycompany.odoo.com", "db", "user", "key");
        assert!(config.proxy_url.is_none());

        let config = config.with_proxy_url("https://relay.example.com/odoo");
        assert_eq!(
            config.proxy_url.as_deref(),
            Some("https://relay.example.com/odoo")
        );
    }

    #[test]
    fn api_key_is_readable_but_not_serialized() {
        let config = ConnectionConfig::new("mycompany.odoo.com", "db", "user", "s3cret");
        assert_eq!(config.api_key.expose_secret(), "s3cret");

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let config = ConnectionConfig::new("mycompany.odoo.com", "db", "user", "s3cret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
    }
}
