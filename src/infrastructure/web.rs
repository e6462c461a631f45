use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::webauthn::{
    AuthenticationCredential, CreationOptions, RegistrationCredential, RequestOptions,
};
use crate::domain::{
    CapabilityProvider, Ceremony, CeremonyError, CeremonyOutcome, Platform, RuntimeMode,
};

/// The `navigator.credentials` surface a web client relies on.
#[async_trait]
pub trait PlatformCredentials: Send + Sync {
    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, CeremonyError>;

    async fn create(&self, options: CreationOptions)
        -> Result<RegistrationCredential, CeremonyError>;

    async fn get(&self, options: RequestOptions) -> Result<AuthenticationCredential, CeremonyError>;
}

/// Web runtime: server options in, credential JSON out.
pub struct WebPlatformProvider {
    credentials: Arc<dyn PlatformCredentials>,
    platform: Platform,
}

impl WebPlatformProvider {
    pub fn new(credentials: Arc<dyn PlatformCredentials>, platform: Platform) -> Self {
        Self {
            credentials,
            platform,
        }
    }
}

#[async_trait]
impl CapabilityProvider for WebPlatformProvider {
    fn runtime(&self) -> RuntimeMode {
        RuntimeMode::Web
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn probe_availability(&self) -> Result<bool, CeremonyError> {
        self.credentials
            .is_user_verifying_platform_authenticator_available()
            .await
    }

    async fn prompt_ceremony(&self, ceremony: Ceremony) -> Result<CeremonyOutcome, CeremonyError> {
        let credential = match ceremony {
            Ceremony::Attestation(options) => {
                let registered = self.credentials.create(parse(options)?).await?;
                to_json(&registered)?
            }
            Ceremony::Assertion(options) => {
                let asserted = self.credentials.get(parse(options)?).await?;
                to_json(&asserted)?
            }
            Ceremony::Verify => {
                return Err(CeremonyError::NotSupported(
                    "bare biometric prompt in a web runtime".to_string(),
                ))
            }
        };
        Ok(CeremonyOutcome::Credential(credential))
    }
}

fn parse<T: DeserializeOwned>(options: Value) -> Result<T, CeremonyError> {
    serde_json::from_value(options).map_err(|e| CeremonyError::InvalidOptions(e.to_string()))
}

fn to_json<T: Serialize>(credential: &T) -> Result<Value, CeremonyError> {
    serde_json::to_value(credential).map_err(|e| CeremonyError::InvalidOptions(e.to_string()))
}
