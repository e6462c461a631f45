use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use super::error::TransportError;

/// Signing context the transport applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedMode {
    Public,
    Private,
}

impl SeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedMode::Public => "public",
            SeedMode::Private => "private",
        }
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// A request relative to the configured server root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportRequest {
    pub path: String,
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub seed: Option<SeedMode>,
}

impl TransportRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            method: Method::Post,
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Delete,
            ..Default::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn seed(mut self, seed: Option<SeedMode>) -> Self {
        self.seed = seed;
        self
    }
}

/// Performs seeded HTTP calls against the wallet backend.
///
/// Resolves to the parsed JSON body (`Value::Null` when the body is empty)
/// and fails on network errors or non-2xx statuses.
#[async_trait]
pub trait CredentialTransport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> Result<Value, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let req = TransportRequest::post("v2/platform/attestation", json!({"id": "abc"}))
            .query("id", "device-1")
            .seed(Some(SeedMode::Private));

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.query, vec![("id".to_string(), "device-1".to_string())]);
        assert_eq!(req.seed, Some(SeedMode::Private));
        assert_eq!(req.body, Some(json!({"id": "abc"})));
    }

    #[test]
    fn test_get_defaults_to_unseeded() {
        let req = TransportRequest::get("v2/token/public/platform");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.seed, None);
        assert!(req.body.is_none());
    }
}
