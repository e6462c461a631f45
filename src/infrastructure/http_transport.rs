use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use super::keyring::SecretStore;
use crate::domain::{CredentialTransport, Method, SeedMode, TransportError, TransportRequest};

/// Ed25519 keys, one per seed mode, generated on first use.
pub struct SeedSigner {
    secrets: SecretStore,
}

impl SeedSigner {
    pub fn new(secrets: SecretStore) -> Self {
        Self { secrets }
    }

    fn key(&self, seed: SeedMode) -> Result<SigningKey, TransportError> {
        let name = format!("seed_{}", seed.as_str());
        let stored = self
            .secrets
            .load(&name)
            .map_err(|e| TransportError::Signing(e.to_string()))?;

        if let Some(encoded) = stored {
            let bytes = Zeroizing::new(
                BASE64
                    .decode(encoded)
                    .map_err(|e| TransportError::Signing(format!("stored {name} key: {e}")))?,
            );
            let secret: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| TransportError::Signing(format!("stored {name} key is not 32 bytes")))?;
            return Ok(SigningKey::from_bytes(&secret));
        }

        let key = SigningKey::generate(&mut OsRng);
        let encoded = Zeroizing::new(BASE64.encode(key.to_bytes()));
        self.secrets
            .save(&name, &encoded)
            .map_err(|e| TransportError::Signing(e.to_string()))?;
        debug!(seed = %seed, "Generated seed key");
        Ok(key)
    }

    /// Headers authenticating `method path_and_query` with the given body.
    pub fn headers(
        &self,
        seed: SeedMode,
        method: Method,
        path_and_query: &str,
        body: &str,
        timestamp: i64,
    ) -> Result<Vec<(&'static str, String)>, TransportError> {
        let key = self.key(seed)?;
        let message = signing_message(method, path_and_query, body, timestamp);
        let signature = key.sign(message.as_bytes());

        Ok(vec![
            ("X-Seed", seed.as_str().to_string()),
            ("X-Seed-Key", BASE64.encode(key.verifying_key().to_bytes())),
            ("X-Seed-Timestamp", timestamp.to_string()),
            ("X-Seed-Signature", BASE64.encode(signature.to_bytes())),
        ])
    }
}

fn signing_message(method: Method, path_and_query: &str, body: &str, timestamp: i64) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        method.as_str(),
        path_and_query,
        timestamp,
        body
    )
}

/// `reqwest` implementation of the credential transport.
pub struct HttpTransport {
    client: Client,
    url_root: Url,
    signer: SeedSigner,
}

impl HttpTransport {
    pub fn new(url_root: &str, timeout: Duration, signer: SeedSigner) -> Result<Self, TransportError> {
        let url_root = Url::parse(url_root)
            .map_err(|e| TransportError::InvalidUrl(format!("{url_root}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("touchid-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url_root,
            signer,
        })
    }

    fn url(&self, request: &TransportRequest) -> Result<Url, TransportError> {
        let mut url = self
            .url_root
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    async fn check_response(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Credential endpoint rejected request");
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CredentialTransport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(method = request.method.as_str(), path = %request.path))]
    async fn request(&self, request: TransportRequest) -> Result<Value, TransportError> {
        let url = self.url(&request)?;
        let body = match &request.body {
            Some(body) => serde_json::to_string(body)
                .map_err(|e| TransportError::Decode(format!("request body: {e}")))?,
            None => String::new(),
        };

        let mut builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
            Method::Delete => self.client.delete(url.clone()),
        };
        if request.body.is_some() {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        if let Some(seed) = request.seed {
            let path_and_query = match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            };
            let timestamp = chrono::Utc::now().timestamp();
            for (name, value) in
                self.signer
                    .headers(seed, request.method, &path_and_query, &body, timestamp)?
            {
                builder = builder.header(name, value);
            }
        }

        let response = Self::check_response(builder.send().await?).await?;
        let text = response.text().await?;
        debug!(bytes = text.len(), "Received response");

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
