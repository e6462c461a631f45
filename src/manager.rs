use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::endpoints::{TokenKind, ATTESTATION_PATH, PLATFORM_PATH};
use crate::domain::{
    CapabilityProvider, Ceremony, CeremonyError, CeremonyOutcome, CredentialTransport,
    LocalConfigStore, RuntimeMode, SeedMode, TouchIdError, TransportError, TransportRequest,
};

/// Platform credential manager for one device/account.
///
/// The availability probe runs once in [`PlatformCredentialManager::init`]
/// and the result is kept on the value; [`PlatformCredentialManager::reinit`]
/// is the only way to recompute it.
pub struct PlatformCredentialManager {
    provider: Arc<dyn CapabilityProvider>,
    transport: Arc<dyn CredentialTransport>,
    store: Arc<dyn LocalConfigStore>,
    available: bool,
}

impl PlatformCredentialManager {
    pub async fn init(
        provider: Arc<dyn CapabilityProvider>,
        transport: Arc<dyn CredentialTransport>,
        store: Arc<dyn LocalConfigStore>,
    ) -> Self {
        let available = probe(provider.as_ref()).await;
        Self {
            provider,
            transport,
            store,
            available,
        }
    }

    #[allow(dead_code)]
    pub async fn reinit(&mut self) {
        self.available = probe(self.provider.as_ref()).await;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_enabled(&self) -> bool {
        if !self.available {
            return false;
        }
        match self.provider.runtime() {
            RuntimeMode::Hybrid => self.store.pin().is_some_and(|pin| !pin.is_empty()),
            RuntimeMode::Web => self.store.is_fido_touch_id_enabled(),
        }
    }

    pub fn runtime(&self) -> RuntimeMode {
        self.provider.runtime()
    }

    /// Hybrid: biometric check, then the PIN becomes the enablement marker.
    /// Web: registers a new platform credential with the server.
    pub async fn enable(&self, pin: &str) -> Result<(), TouchIdError> {
        match self.provider.runtime() {
            RuntimeMode::Hybrid => {
                self.verify_user().await?;
                self.store.set_pin(Some(pin))?;
            }
            RuntimeMode::Web => {
                let options = self
                    .call(
                        TransportRequest::get(ATTESTATION_PATH),
                        Some(SeedMode::Private),
                    )
                    .await?;
                let attestation = self.credential(Ceremony::Attestation(options)).await?;
                self.call(
                    TransportRequest::post(ATTESTATION_PATH, attestation),
                    Some(SeedMode::Private),
                )
                .await?;
                self.store.set_fido_touch_id_enabled(true)?;
            }
        }
        info!(runtime = %self.provider.runtime(), "Platform authentication enabled");
        Ok(())
    }

    pub async fn disable(&self) -> Result<(), TouchIdError> {
        match self.provider.runtime() {
            RuntimeMode::Hybrid => self.store.set_pin(None)?,
            RuntimeMode::Web => {
                self.call(
                    TransportRequest::delete(PLATFORM_PATH),
                    Some(SeedMode::Private),
                )
                .await?;
                self.store.set_fido_touch_id_enabled(false)?;
            }
        }
        info!(runtime = %self.provider.runtime(), "Platform authentication disabled");
        Ok(())
    }

    pub async fn public_token(&self) -> Result<String, TouchIdError> {
        self.token(TokenKind::Public).await
    }

    pub async fn private_token(&self) -> Result<String, TouchIdError> {
        self.token(TokenKind::Private).await
    }

    /// Bare native biometric prompt, nothing persisted.
    pub async fn verify_user(&self) -> Result<(), TouchIdError> {
        match self.ceremony(Ceremony::Verify).await? {
            CeremonyOutcome::Verified => Ok(()),
            CeremonyOutcome::Credential(_) => {
                error!("Verification ceremony returned a credential");
                Err(TouchIdError::Ceremony)
            }
        }
    }

    async fn token(&self, kind: TokenKind) -> Result<String, TouchIdError> {
        let options = self
            .call(TransportRequest::get(kind.path()), kind.challenge_seed())
            .await?;
        let assertion = self.credential(Ceremony::Assertion(options)).await?;
        let response = self
            .call(
                TransportRequest::post(kind.path(), assertion),
                kind.submit_seed(),
            )
            .await?;

        let token = response
            .get(kind.field())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TransportError::Decode(format!("response has no '{}' field", kind.field()))
            })?;
        debug!(field = kind.field(), "Token issued");
        Ok(token.to_string())
    }

    async fn call(
        &self,
        request: TransportRequest,
        seed: Option<SeedMode>,
    ) -> Result<Value, TouchIdError> {
        let request = request.query("id", self.store.id()).seed(seed);
        debug!(method = request.method.as_str(), path = %request.path, "Calling credential endpoint");
        Ok(self.transport.request(request).await?)
    }

    async fn credential(&self, ceremony: Ceremony) -> Result<Value, TouchIdError> {
        match self.ceremony(ceremony).await? {
            CeremonyOutcome::Credential(value) => Ok(value),
            CeremonyOutcome::Verified => {
                error!("Credential ceremony completed without a credential");
                Err(TouchIdError::Ceremony)
            }
        }
    }

    async fn ceremony(&self, ceremony: Ceremony) -> Result<CeremonyOutcome, TouchIdError> {
        let name = ceremony.name();
        self.provider
            .prompt_ceremony(ceremony)
            .await
            .map_err(|e: CeremonyError| {
                error!(ceremony = name, error = %e, "Platform ceremony failed");
                TouchIdError::Ceremony
            })
    }
}

async fn probe(provider: &dyn CapabilityProvider) -> bool {
    match provider.probe_availability().await {
        Ok(available) => {
            info!(
                runtime = %provider.runtime(),
                platform = %provider.platform(),
                available,
                "Platform authenticator probed"
            );
            available
        }
        Err(e) => {
            warn!(error = %e, "Availability probe failed, treating as unavailable");
            false
        }
    }
}
