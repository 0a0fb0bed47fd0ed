//! Request descriptors and normalized response payloads.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Request body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Serialized as JSON; `Content-Type: application/json` unless the
    /// request already carries a content type.
    Json(Value),
    /// Sent as-is. Set the content type with [`ApiRequest::header`].
    Raw(Vec<u8>),
}

/// A replayable description of one API call.
///
/// Kept by value so a request that hit an expired token can be reissued
/// with the refreshed one.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Body>,
}

impl ApiRequest {
    /// Create a request for a path relative to the client's base URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a single query parameter.
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add query parameters from a serializable struct.
    ///
    /// The value must serialize to a flat object; `null` fields are skipped.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        match serde_json::to_value(query)? {
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => self.query.push((key, s)),
                        other => self.query.push((key, other.to_string())),
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            _ => Err(Error::Config(
                "query parameters must serialize to an object".to_string(),
            )),
        }
    }

    /// Set a header. An explicit `Authorization` header disables token
    /// injection and refresh handling for this request.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a raw body.
    pub fn raw(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Raw(bytes.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// True when the caller supplied its own `Authorization` header.
    pub fn has_explicit_auth(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON body.
    Json(Value),
    /// The response had no body (204 or empty 2xx).
    NoContent,
}

impl Payload {
    pub fn is_no_content(&self) -> bool {
        matches!(self, Payload::NoContent)
    }

    /// The JSON body, if there was one.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::NoContent => None,
        }
    }

    /// Decode into a typed value. No content decodes as JSON `null`, which
    /// `()` and `Option<T>` accept.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.into_json().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

/// Normalize a response into a payload or an [`Error::Api`].
pub(crate) async fn read_payload(response: reqwest::Response) -> Result<Payload> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::NoContent);
        }
        return Ok(Payload::Json(serde_json::from_slice(&bytes)?));
    }

    Err(Error::Api {
        status: status.as_u16(),
        data: serde_json::from_slice(&bytes).ok(),
    })
}
