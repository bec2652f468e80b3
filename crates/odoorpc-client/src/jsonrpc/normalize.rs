//! Response normalization for the many reply shapes Odoo backends and
//! intermediary proxies produce.
//!
//! Different Odoo versions and hand-written proxies disagree on how much of
//! the JSON-RPC envelope survives to the client. Rather than per-backend
//! configuration, replies pass through a fixed, ordered chain of structural
//! rules — trading a small risk of over-eager unwrapping for zero required
//! configuration:
//!
//! 1. backend/proxy `error` detection, with the void-result masking rule
//! 2. flattened-proxy `success` envelope unwrap
//! 3. double-wrapped `result` unwrap
//! 4. single-element array unwrap for `create`/`write`
//! 5. id extraction for `create`
//!
//! Each rule is independent and tested in isolation; [`normalize`] applies
//! them in order.

use log::{debug, warn};
use serde_json::Value;

use crate::error::ClientError;

/// Backend error text marking a void result that failed only while being
/// serialized.
///
/// Some Odoo actions execute correctly and then crash marshalling their
/// empty (`None`) return value. A reply whose error message contains this
/// marker is treated as a successful call with no result. Fragile by
/// nature: it depends on the backend's exact wording.
pub const VOID_MARSHAL_MARKER: &str = "cannot marshal None";

/// Reduces a decoded reply body to the single canonical result value.
///
/// `method` is the service-level method that was requested and `args` its
/// positional arguments; both feed the effective-method heuristics for the
/// later unwrap rules.
///
/// # Errors
///
/// [`ClientError::RpcError`] when the backend or an intermediary proxy
/// reports an application error — except the void-result marshalling quirk,
/// which yields `Ok(Value::Null)`.
pub fn normalize(body: Value, method: &str, args: &[Value]) -> Result<Value, ClientError> {
    if let Some(error) = backend_error(&body) {
        let message = error_message(error);
        if message.contains(VOID_MARSHAL_MARKER) {
            warn!(
                "backend failed to marshal a void result for {method}; \
                 treating the call as successful with no result"
            );
            return Ok(Value::Null);
        }
        return Err(ClientError::RpcError(message));
    }

    let mut result = match unwrap_proxy_envelope(body, method)? {
        ProxyEnvelope::PassThrough(body) => return Ok(body),
        ProxyEnvelope::Unwrapped(value) => value,
        ProxyEnvelope::NotProxy(body) => body.get("result").cloned().unwrap_or(Value::Null),
    };

    result = unwrap_double_wrapped(result);

    let effective = effective_method(method, args);
    result = unwrap_singleton_list(result, effective);
    result = extract_created_id(result, effective);

    Ok(result)
}

/// The session identifier carried by an authentication reply.
///
/// Stock Odoo answers with a bare integer uid; some proxies answer with an
/// object carrying a `uid` field. Odoo signals bad credentials with a
/// literal `false`, which lands in neither arm.
#[must_use]
pub fn session_uid(reply: &Value) -> Option<i64> {
    match reply {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => map
            .get("uid")
            .and_then(Value::as_i64)
            .filter(|uid| *uid != 0),
        _ => None,
    }
}

/// JavaScript-style truthiness for JSON values.
///
/// The proxies this client tolerates were written against truthiness-gated
/// connectors; lenient ones send `"error": null` alongside a success, or
/// `"success": 0` on failure.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The truthy `error` payload of a reply, if any.
fn backend_error(body: &Value) -> Option<&Value> {
    body.get("error").filter(|error| truthy(error))
}

/// Best human-readable message for an error payload.
///
/// Prefers `error.data.message`, then `error.message`, then a dump of the
/// whole payload. String errors are used verbatim.
fn error_message(error: &Value) -> String {
    if let Some(message) = error.as_str() {
        return message.to_string();
    }
    error
        .pointer("/data/message")
        .and_then(Value::as_str)
        .or_else(|| error.get("message").and_then(Value::as_str))
        .map_or_else(|| error.to_string(), ToString::to_string)
}

/// Outcome of the flattened-proxy envelope rule.
enum ProxyEnvelope {
    /// No `success` field: not the proxy shape, body handed back untouched.
    NotProxy(Value),
    /// Authentication reply: the whole body passes through so the caller
    /// can read `uid` from it.
    PassThrough(Value),
    /// The working result extracted from a successful proxy reply.
    Unwrapped(Value),
}

/// Unwraps the flattened-proxy shape `{success, data|result, error?,
/// mensaje?}`.
///
/// # Errors
///
/// [`ClientError::RpcError`] when the proxy reports failure.
fn unwrap_proxy_envelope(body: Value, method: &str) -> Result<ProxyEnvelope, ClientError> {
    let Some(success) = body.get("success") else {
        return Ok(ProxyEnvelope::NotProxy(body));
    };

    if !truthy(success) {
        return Err(ClientError::RpcError(proxy_error_message(&body)));
    }

    // Authentication replies keep their top-level uid field intact.
    if method == "login" || method == "authenticate" {
        return Ok(ProxyEnvelope::PassThrough(body));
    }

    let result = body
        .get("data")
        .or_else(|| body.get("result"))
        .cloned()
        .unwrap_or(Value::Null);
    debug!("unwrapped proxy envelope for {method}");
    Ok(ProxyEnvelope::Unwrapped(result))
}

/// Message preference for a failed proxy reply: `error.data.message`, then
/// `error.message`, then the stringified error, then `mensaje`, else a
/// generic fallback.
fn proxy_error_message(body: &Value) -> String {
    if let Some(error) = backend_error(body) {
        return error_message(error);
    }
    match body.get("mensaje").filter(|mensaje| truthy(mensaje)) {
        Some(Value::String(mensaje)) => mensaje.clone(),
        Some(other) => other.to_string(),
        None => "unknown proxy error".to_string(),
    }
}

/// Takes the inner value out of `{ "result": ... }`.
///
/// Proxies that forward a JSON-RPC reply inside another result wrapper
/// produce this shape. A body still carrying `jsonrpc` is a full envelope,
/// not a wrapper, and is left alone.
fn unwrap_double_wrapped(result: Value) -> Value {
    match result {
        Value::Object(mut map) if map.contains_key("result") && !map.contains_key("jsonrpc") => {
            debug!("unwrapping nested result field");
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// The domain-level operation name hidden inside a generic dispatch call.
///
/// `execute_kw` carries the real method (`create`, `write`, ...) as its
/// fifth positional argument; the unwrap rules below key on that, not on
/// the dispatch method itself.
fn effective_method<'a>(method: &'a str, args: &'a [Value]) -> &'a str {
    if method == "execute_kw"
        && let Some(inner) = args.get(4).and_then(Value::as_str)
    {
        return inner;
    }
    method
}

/// Unwraps the one-element list some backends put around the scalar result
/// of `create`/`write`.
fn unwrap_singleton_list(result: Value, effective: &str) -> Value {
    match result {
        Value::Array(mut items)
            if items.len() == 1 && (effective == "create" || effective == "write") =>
        {
            debug!("unwrapping single-element array result for {effective}");
            items.pop().unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Replaces a record-shaped `create` result with its raw `id`.
///
/// Callers of `create` expect an identifier, not the record some backends
/// return.
fn extract_created_id(result: Value, effective: &str) -> Value {
    match result {
        Value::Object(mut map) if effective == "create" && map.contains_key("id") => {
            debug!("extracting id from create result object");
            map.remove("id").unwrap_or(Value::Null)
        }
        other => other,
    }
}
