use thiserror::Error;

/// Error surfaced to callers of the credential manager.
#[derive(Error, Debug)]
pub enum TouchIdError {
    /// The platform interaction (biometric prompt, attestation or assertion)
    /// failed. The cause is logged, never exposed.
    #[error("touch_id_error")]
    Ceremony,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),
}

/// Reasons a platform ceremony did not produce a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CeremonyError {
    #[error("User verification was denied or cancelled")]
    NotAllowed,

    #[error("Ceremony is not supported by this platform: {0}")]
    NotSupported(String),

    #[error("Authenticator already holds a credential for this account")]
    InvalidState,

    #[error("Malformed credential options: {0}")]
    InvalidOptions(String),

    #[error("Platform bridge failure: {0}")]
    Bridge(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {what}: {source}")]
    Read {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {what}: {source}")]
    Write {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted {what}: {reason}")]
    Corrupted { what: &'static str, reason: String },

    #[error("Keyring error: {0}")]
    Keyring(String),
}
