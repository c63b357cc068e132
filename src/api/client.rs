//! HTTP client with private-token header injection and error normalization.
//!
//! All requests go to `base_url + path`. When the session store holds a
//! private token it is sent in the `X-Private-Token` header (not a bearer
//! scheme). Non-2xx responses are turned into [`ApiError`]; a 401 also wipes
//! the stored session before the error is returned.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::{messages, ApiError, FieldErrors};
use super::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::session::SessionStore;

/// Header carrying the opaque private token.
pub const PRIVATE_TOKEN_HEADER: &str = "X-Private-Token";

const JSON_MIME: &str = "application/json";

/// Parsed body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON content type and parsed.
    Json(Value),
    /// Any other content type, decoded as UTF-8 (lossy).
    Text(String),
    /// JSON content type with an empty or unparseable body.
    Empty,
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(v) => v,
            ResponseBody::Text(_) | ResponseBody::Empty => Value::Null,
        }
    }
}

/// HTTP client wrapper for the AnonBox API.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client with the production `reqwest` transport.
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Self {
        let transport = ReqwestTransport::new(config.timeout, config.connect_timeout);
        Self::with_transport(&config.api_url, Arc::new(transport), session)
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ── JSON methods ─────────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.request_json(Method::Get, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ResponseBody, ApiError> {
        let bytes = encode_body(body)?;
        self.request_json(Method::Post, path, Some(bytes)).await
    }

    /// POST without a request body.
    pub async fn post_empty(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.request_json(Method::Post, path, None).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ResponseBody, ApiError> {
        let bytes = encode_body(body)?;
        self.request_json(Method::Patch, path, Some(bytes)).await
    }

    /// PATCH without a request body.
    pub async fn patch_empty(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.request_json(Method::Patch, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.request_json(Method::Delete, path, None).await
    }

    // ── Typed helpers ────────────────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.get(path).await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(self.post(path, body).await?)
    }

    pub async fn post_empty_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.post_empty(path).await?)
    }

    pub async fn patch_empty_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.patch_empty(path).await?)
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.delete(path).await?)
    }

    // ── Binary download ──────────────────────────────────────────────────

    /// Fetch a binary payload (generated card images).
    ///
    /// Sent without the JSON content-type header. On failure the message is
    /// taken from a JSON error body when there is one, otherwise the generic
    /// download-failure text is used.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let mut headers = Vec::new();
        self.push_token_header(&mut headers);

        let resp = self.send(Method::Get, path, headers, None).await?;
        if resp.is_success() {
            return Ok(resp.body);
        }

        let message = serde_json::from_slice::<Value>(&resp.body)
            .ok()
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| messages::DOWNLOAD_FAILED.to_string());

        let err = self.reject(resp.status, None, FieldErrors::new());
        Err(err.with_message(message))
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn push_token_header(&self, headers: &mut Vec<(String, String)>) {
        if let Some(token) = self.session.private_token() {
            headers.push((PRIVATE_TOKEN_HEADER.to_string(), token));
        }
    }

    fn json_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Content-Type".to_string(), JSON_MIME.to_string()),
            ("Accept".to_string(), JSON_MIME.to_string()),
        ];
        self.push_token_header(&mut headers);
        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, ApiError> {
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        };

        log::debug!("{} {}", method.as_str(), path);
        match self.transport.send(request).await {
            Ok(resp) => {
                log::debug!("{} {} -> {}", method.as_str(), path, resp.status);
                Ok(resp)
            }
            Err(e) => {
                log::warn!("{} {} failed without a response: {}", method.as_str(), path, e);
                Err(ApiError::network())
            }
        }
    }

    async fn request_json(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<ResponseBody, ApiError> {
        let resp = self.send(method, path, self.json_headers(), body).await?;
        self.handle_json_response(resp)
    }

    fn handle_json_response(&self, resp: HttpResponse) -> Result<ResponseBody, ApiError> {
        let data = if resp.is_json() {
            match serde_json::from_slice::<Value>(&resp.body) {
                Ok(v) => ResponseBody::Json(v),
                Err(_) => ResponseBody::Empty,
            }
        } else {
            ResponseBody::Text(String::from_utf8_lossy(&resp.body).into_owned())
        };

        if resp.is_success() {
            return Ok(data);
        }

        let (message, field_errors) = match data.as_json() {
            Some(v) => (body_message(v), body_field_errors(v)),
            None => (None, FieldErrors::new()),
        };
        Err(self.reject(resp.status, message, field_errors))
    }

    /// Classify a non-2xx status, applying the 401 side effect.
    fn reject(&self, status: u16, message: Option<String>, field_errors: FieldErrors) -> ApiError {
        let err = ApiError::from_status(status, message, field_errors);
        if err.is_unauthorized() {
            log::info!("Private token rejected (401), clearing stored session");
            if let Err(e) = self.session.clear_session() {
                log::warn!("Failed to clear session after 401: {}", e);
            }
        } else {
            log::warn!("Request rejected: {} ({})", err.code(), status);
        }
        err
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|e| ApiError::InvalidResponse {
        message: format!("Failed to encode request body: {}", e),
    })
}

fn decode<T: DeserializeOwned>(body: ResponseBody) -> Result<T, ApiError> {
    serde_json::from_value(body.into_value()).map_err(ApiError::invalid_response)
}

fn body_message(v: &Value) -> Option<String> {
    v.get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read `errors` from an error body.
///
/// Accepts both `{ field: ["msg", ...] }` and `{ field: "msg" }`.
fn body_field_errors(v: &Value) -> FieldErrors {
    let mut out = FieldErrors::new();
    let Some(obj) = v.get("errors").and_then(Value::as_object) else {
        return out;
    };
    for (field, msgs) in obj {
        let list = match msgs {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Value::String(s) => vec![s.clone()],
            _ => continue,
        };
        out.insert(field.clone(), list);
    }
    out
}
