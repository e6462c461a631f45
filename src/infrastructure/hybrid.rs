//! Providers for the native-shell runtime, where the only platform
//! capability is a biometric bridge. Credential ceremonies are not offered
//! there.

use async_trait::async_trait;
use std::sync::Arc;

use super::biometric::{BiometricPrompt, NativeBiometric};
use crate::domain::{
    CapabilityProvider, Ceremony, CeremonyError, CeremonyOutcome, Platform, RuntimeMode,
};

const SCAN_REASON: &str = "Scan your fingerprint please";
const PIN_FALLBACK_LABEL: &str = "Enter PIN";

/// Touch ID bridge with a PIN fallback button.
pub struct HybridIosProvider {
    bridge: Arc<dyn NativeBiometric>,
}

impl HybridIosProvider {
    pub fn new(bridge: Arc<dyn NativeBiometric>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl CapabilityProvider for HybridIosProvider {
    fn runtime(&self) -> RuntimeMode {
        RuntimeMode::Hybrid
    }

    fn platform(&self) -> Platform {
        Platform::Ios
    }

    async fn probe_availability(&self) -> Result<bool, CeremonyError> {
        probe(&self.bridge).await
    }

    async fn prompt_ceremony(&self, ceremony: Ceremony) -> Result<CeremonyOutcome, CeremonyError> {
        let prompt = BiometricPrompt::new(SCAN_REASON).with_fallback(PIN_FALLBACK_LABEL);
        verify_only(&self.bridge, prompt, ceremony).await
    }
}

/// Fingerprint bridge with the platform's default dialog.
pub struct HybridAndroidProvider {
    bridge: Arc<dyn NativeBiometric>,
}

impl HybridAndroidProvider {
    pub fn new(bridge: Arc<dyn NativeBiometric>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl CapabilityProvider for HybridAndroidProvider {
    fn runtime(&self) -> RuntimeMode {
        RuntimeMode::Hybrid
    }

    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn probe_availability(&self) -> Result<bool, CeremonyError> {
        probe(&self.bridge).await
    }

    async fn prompt_ceremony(&self, ceremony: Ceremony) -> Result<CeremonyOutcome, CeremonyError> {
        verify_only(&self.bridge, BiometricPrompt::new(SCAN_REASON), ceremony).await
    }
}

/// Native shell on a platform without a known biometric bridge.
pub struct HybridUnsupportedProvider;

#[async_trait]
impl CapabilityProvider for HybridUnsupportedProvider {
    fn runtime(&self) -> RuntimeMode {
        RuntimeMode::Hybrid
    }

    fn platform(&self) -> Platform {
        Platform::Other
    }

    async fn probe_availability(&self) -> Result<bool, CeremonyError> {
        Ok(false)
    }

    async fn prompt_ceremony(&self, ceremony: Ceremony) -> Result<CeremonyOutcome, CeremonyError> {
        Err(CeremonyError::NotSupported(format!(
            "{} on an unknown hybrid platform",
            ceremony.name()
        )))
    }
}

async fn probe(bridge: &Arc<dyn NativeBiometric>) -> Result<bool, CeremonyError> {
    let bridge = Arc::clone(bridge);
    tokio::task::spawn_blocking(move || bridge.is_available())
        .await
        .map_err(|e| CeremonyError::Bridge(e.to_string()))
}

async fn verify_only(
    bridge: &Arc<dyn NativeBiometric>,
    prompt: BiometricPrompt,
    ceremony: Ceremony,
) -> Result<CeremonyOutcome, CeremonyError> {
    if !matches!(ceremony, Ceremony::Verify) {
        return Err(CeremonyError::NotSupported(format!(
            "{} through the native biometric bridge",
            ceremony.name()
        )));
    }

    let bridge = Arc::clone(bridge);
    let verified = tokio::task::spawn_blocking(move || bridge.authenticate(&prompt))
        .await
        .map_err(|e| CeremonyError::Bridge(e.to_string()))??;

    if verified {
        Ok(CeremonyOutcome::Verified)
    } else {
        Err(CeremonyError::NotAllowed)
    }
}
