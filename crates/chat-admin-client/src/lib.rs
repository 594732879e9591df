use std::time::Duration;

use async_trait::async_trait;
use chat_admin_core::{AdminTransport, ApiRequest, HttpMethod, TransportError};
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const ENV_BASE_URL: &str = "CHAT_ADMIN_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "CHAT_ADMIN_TIMEOUT_MS";
pub const ENV_COOKIE: &str = "CHAT_ADMIN_COOKIE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Session cookie forwarded verbatim; login happens elsewhere.
    pub cookie: Option<String>,
}

impl AdminClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cookie: None,
        }
    }

    /// Reads the config from the environment, falling back to defaults for
    /// missing or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env_non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);
        if let Some(timeout_ms) = env_non_empty(ENV_TIMEOUT_MS).and_then(|raw| raw.parse().ok()) {
            config.timeout_ms = timeout_ms;
        }
        config.cookie = env_non_empty(ENV_COOKIE);
        config
    }
}

#[derive(Debug, Clone)]
pub struct HttpAdminTransport {
    base_url: String,
    timeout: Duration,
    cookie: Option<String>,
    http: reqwest::Client,
}

impl HttpAdminTransport {
    pub fn new(config: AdminClientConfig) -> Result<Self, TransportError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            cookie: config.cookie.and_then(non_empty_string),
            http: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}/{}", self.base_url, trimmed))
        }
    }
}

#[async_trait(?Send)]
impl AdminTransport for HttpAdminTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self
            .endpoint(&request.path)
            .ok_or(TransportError::InvalidPath)?;
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .http
            .request(method, url.as_str())
            .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()))
            .timeout(self.timeout);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = request.method.as_str(), url = %url, "admin http request");
        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::Request {
                message: error.to_string(),
            })?;
        decode_json_response(response).await
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> TransportError {
    let body = non_empty_string(String::from_utf8_lossy(body).to_string())
        .unwrap_or_else(|| "<empty>".to_string());
    TransportError::Http {
        status: status.as_u16(),
        body,
    }
}

/// Renames every object key from snake_case to camelCase, recursively.
#[must_use]
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (camelize(&key), camelize_keys(value)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

#[must_use]
pub fn camelize(key: &str) -> String {
    let mut camelized = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' && !camelized.is_empty() {
            upper_next = true;
        } else if upper_next {
            camelized.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            camelized.push(ch);
        }
    }
    camelized
}

async fn decode_json_response(response: reqwest::Response) -> Result<Value, TransportError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| TransportError::Read {
            message: error.to_string(),
        })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        if status.is_success() {
            return Ok(Value::Object(Map::new()));
        }
        return Err(format_http_error(status, &bytes));
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) if status.is_success() => Ok(camelize_keys(value)),
        // Rejections carry their messages in the body; let the caller see them.
        Ok(value) if value.get("errors").is_some() => Ok(camelize_keys(value)),
        Ok(_) => Err(format_http_error(status, &bytes)),
        Err(_) if !status.is_success() => Err(format_http_error(status, &bytes)),
        Err(error) => Err(TransportError::Decode {
            message: error.to_string(),
        }),
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, TransportError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(TransportError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(non_empty_string)
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoint_builder_normalizes_paths() {
        let transport =
            HttpAdminTransport::new(AdminClientConfig::new("https://bot.example.com/"))
                .expect("transport");

        assert_eq!(
            transport.endpoint("/admin/api/chats/1/scheme"),
            Some("https://bot.example.com/admin/api/chats/1/scheme".to_string())
        );
        assert_eq!(
            transport.endpoint("admin/api/chats/1/scheme"),
            Some("https://bot.example.com/admin/api/chats/1/scheme".to_string())
        );
        assert_eq!(transport.endpoint(""), None);
    }

    #[test]
    fn base_url_missing_is_rejected() {
        let result = HttpAdminTransport::new(AdminClientConfig::new("   "));
        assert!(matches!(result, Err(TransportError::BaseUrlMissing)));
    }

    #[test]
    fn http_error_mapping_preserves_shape() {
        let error = format_http_error(StatusCode::BAD_GATEWAY, b" gateway failed ");
        assert_eq!(error.to_string(), "admin_http_502:gateway failed");

        let empty_body = format_http_error(StatusCode::SERVICE_UNAVAILABLE, b" ");
        assert_eq!(empty_body.to_string(), "admin_http_503:<empty>");
    }

    #[test]
    fn camelize_handles_nested_keys_and_leaves_values() {
        assert_eq!(camelize("verification_mode"), "verificationMode");
        assert_eq!(camelize("first_name"), "firstName");
        assert_eq!(camelize("id"), "id");
        assert_eq!(camelize("_private"), "_private");

        let value = camelize_keys(json!({
            "chat": {"id": 1, "is_take_over": true},
            "permissions": [{"user": {"first_name": "a", "last_name": "b_c"}}]
        }));
        assert_eq!(
            value,
            json!({
                "chat": {"id": 1, "isTakeOver": true},
                "permissions": [{"user": {"firstName": "a", "lastName": "b_c"}}]
            })
        );
    }
}
