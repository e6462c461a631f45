use async_trait::async_trait;
use serde_json::Value;

use super::error::CeremonyError;
use super::runtime::{Platform, RuntimeMode};

/// A user-facing platform interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Ceremony {
    /// Native biometric check with no server challenge involved.
    Verify,
    /// Create a new credential from server registration options.
    Attestation(Value),
    /// Sign a server challenge with an existing credential.
    Assertion(Value),
}

impl Ceremony {
    pub fn name(&self) -> &'static str {
        match self {
            Ceremony::Verify => "verify",
            Ceremony::Attestation(_) => "attestation",
            Ceremony::Assertion(_) => "assertion",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CeremonyOutcome {
    Verified,
    /// JSON response ready to be posted back to the server.
    Credential(Value),
}

/// Platform capability strategy, selected once per process.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn runtime(&self) -> RuntimeMode;

    fn platform(&self) -> Platform;

    /// Whether a user-verifying authenticator is present.
    async fn probe_availability(&self) -> Result<bool, CeremonyError>;

    async fn prompt_ceremony(&self, ceremony: Ceremony) -> Result<CeremonyOutcome, CeremonyError>;
}
