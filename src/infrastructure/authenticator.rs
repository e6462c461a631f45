//! Software platform authenticator.
//!
//! Holds Ed25519 credentials on disk and answers `create`/`get` the way a
//! browser's platform authenticator would: `none` attestation, CBOR
//! attestation object, signature counter in the authenticator data. User
//! verification is delegated to the native biometric bridge, so the
//! authenticator only reports itself as user-verifying when that bridge is
//! available.

use async_trait::async_trait;
use chrono::Utc;
use ciborium::value::Value as Cbor;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::biometric::{BiometricPrompt, NativeBiometric};
use super::credentials::{CredentialRecord, CredentialVault};
use super::web::PlatformCredentials;
use crate::domain::webauthn::{
    self, AssertionResponse, AttestationResponse, AuthenticationCredential, ClientData,
    CreationOptions, CredentialDescriptor, PublicKeyCredential, RegistrationCredential,
    RequestOptions, COSE_ALG_EDDSA, PUBLIC_KEY_TYPE,
};
use crate::domain::{CeremonyError, StoreError};

const FLAG_USER_PRESENT: u8 = 0x01;
const FLAG_USER_VERIFIED: u8 = 0x04;
const FLAG_ATTESTED_DATA: u8 = 0x40;

const CREDENTIAL_ID_LEN: usize = 32;

pub struct SoftwareAuthenticator {
    origin: String,
    vault: CredentialVault,
    bridge: Arc<dyn NativeBiometric>,
}

impl SoftwareAuthenticator {
    pub fn new(origin: &str, vault: CredentialVault, bridge: Arc<dyn NativeBiometric>) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            vault,
            bridge,
        }
    }

    /// Relying party id: the explicit one from the options, otherwise the
    /// origin's host.
    fn rp_id(&self, explicit: Option<&str>) -> Result<String, CeremonyError> {
        if let Some(id) = explicit.filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }
        Url::parse(&self.origin)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .ok_or_else(|| {
                CeremonyError::InvalidOptions(format!("origin '{}' has no host", self.origin))
            })
    }

    async fn verify_user(&self, reason: String) -> Result<(), CeremonyError> {
        let bridge = Arc::clone(&self.bridge);
        let verified =
            tokio::task::spawn_blocking(move || bridge.authenticate(&BiometricPrompt::new(&reason)))
                .await
                .map_err(|e| CeremonyError::Bridge(e.to_string()))??;
        if verified {
            Ok(())
        } else {
            Err(CeremonyError::NotAllowed)
        }
    }
}

#[async_trait]
impl PlatformCredentials for SoftwareAuthenticator {
    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, CeremonyError> {
        let bridge = Arc::clone(&self.bridge);
        tokio::task::spawn_blocking(move || bridge.is_available())
            .await
            .map_err(|e| CeremonyError::Bridge(e.to_string()))
    }

    async fn create(
        &self,
        options: CreationOptions,
    ) -> Result<RegistrationCredential, CeremonyError> {
        let rp_id = self.rp_id(options.rp.id.as_deref())?;

        let supports_eddsa = options
            .pub_key_cred_params
            .iter()
            .any(|param| param.kind == PUBLIC_KEY_TYPE && param.alg == COSE_ALG_EDDSA);
        if !supports_eddsa {
            return Err(CeremonyError::NotSupported(
                "relying party does not accept EdDSA credentials".to_string(),
            ));
        }

        let challenge = decode_field("challenge", &options.challenge)?;
        decode_field("user.id", &options.user.id)?;

        let existing = self.vault.for_rp(&rp_id).map_err(vault_error)?;
        if existing
            .iter()
            .any(|record| is_listed(&record.credential_id, &options.exclude_credentials))
        {
            return Err(CeremonyError::InvalidState);
        }

        self.verify_user(format!("Register a passkey for {}", options.rp.name))
            .await?;

        let signing_key = SigningKey::generate(&mut OsRng);
        let mut credential_id = [0u8; CREDENTIAL_ID_LEN];
        OsRng.fill_bytes(&mut credential_id);

        let cose_key = encode_cbor(&cose_ed25519_key(&signing_key))?;
        let auth_data = AuthenticatorData::new(&rp_id, 0)
            .with_flags(FLAG_USER_PRESENT | FLAG_USER_VERIFIED | FLAG_ATTESTED_DATA)
            .with_attested_credential(&credential_id, &cose_key)
            .into_bytes();
        let attestation_object = encode_cbor(&Cbor::Map(vec![
            (Cbor::Text("fmt".into()), Cbor::Text("none".into())),
            (Cbor::Text("attStmt".into()), Cbor::Map(Vec::new())),
            (Cbor::Text("authData".into()), Cbor::Bytes(auth_data)),
        ]))?;
        let client_data = client_data_json(&ClientData::create(&challenge, &self.origin))?;

        let secret = Zeroizing::new(signing_key.to_bytes());
        self.vault
            .insert(CredentialRecord {
                credential_id: webauthn::encode(&credential_id),
                rp_id: rp_id.clone(),
                user_id: options.user.id.clone(),
                user_name: options.user.name.clone(),
                secret_key: webauthn::encode(secret.as_slice()),
                sign_count: 0,
                created_at: Utc::now(),
            })
            .map_err(vault_error)?;
        info!(rp_id = %rp_id, "Created platform credential");

        Ok(PublicKeyCredential::platform(
            &credential_id,
            AttestationResponse {
                client_data_json: webauthn::encode(&client_data),
                attestation_object: webauthn::encode(&attestation_object),
                transports: vec!["internal".to_string()],
            },
        ))
    }

    async fn get(&self, options: RequestOptions) -> Result<AuthenticationCredential, CeremonyError> {
        let rp_id = self.rp_id(options.rp_id.as_deref())?;
        let challenge = decode_field("challenge", &options.challenge)?;

        let record = self
            .vault
            .for_rp(&rp_id)
            .map_err(vault_error)?
            .into_iter()
            .filter(|record| {
                options.allow_credentials.is_empty()
                    || is_listed(&record.credential_id, &options.allow_credentials)
            })
            .max_by_key(|record| record.created_at)
            .ok_or(CeremonyError::NotAllowed)?;
        debug!(rp_id = %rp_id, credential = %record.credential_id, "Selected credential");

        self.verify_user(format!("Sign in to {rp_id}")).await?;

        let secret = Zeroizing::new(decode_field("secret key", &record.secret_key)?);
        let secret: Zeroizing<[u8; 32]> =
            Zeroizing::new(secret.as_slice().try_into().map_err(|_| {
                vault_error(StoreError::Corrupted {
                    what: "credential vault",
                    reason: "secret key is not 32 bytes".to_string(),
                })
            })?);
        let signing_key = SigningKey::from_bytes(&secret);

        let sign_count = record.sign_count.wrapping_add(1);
        let auth_data = AuthenticatorData::new(&rp_id, sign_count)
            .with_flags(FLAG_USER_PRESENT | FLAG_USER_VERIFIED)
            .into_bytes();
        let client_data = client_data_json(&ClientData::get(&challenge, &self.origin))?;

        let mut signed = auth_data.clone();
        signed.extend_from_slice(&Sha256::digest(&client_data));
        let signature = signing_key.sign(&signed);

        self.vault
            .update_counter(&record.credential_id, sign_count)
            .map_err(vault_error)?;

        let raw_id = decode_field("credential id", &record.credential_id)?;
        Ok(PublicKeyCredential::platform(
            &raw_id,
            AssertionResponse {
                client_data_json: webauthn::encode(&client_data),
                authenticator_data: webauthn::encode(&auth_data),
                signature: webauthn::encode(&signature.to_bytes()),
                user_handle: Some(record.user_id.clone()),
            },
        ))
    }
}

/// Authenticator data in WebAuthn layout: rpIdHash, flags,
/// big-endian counter, then optional attested credential data.
struct AuthenticatorData {
    bytes: Vec<u8>,
}

impl AuthenticatorData {
    fn new(rp_id: &str, sign_count: u32) -> Self {
        let mut bytes = Vec::with_capacity(37);
        bytes.extend_from_slice(&Sha256::digest(rp_id.as_bytes()));
        bytes.push(0);
        bytes.extend_from_slice(&sign_count.to_be_bytes());
        Self { bytes }
    }

    fn with_flags(mut self, flags: u8) -> Self {
        self.bytes[32] = flags;
        self
    }

    fn with_attested_credential(mut self, credential_id: &[u8], cose_key: &[u8]) -> Self {
        self.bytes.extend_from_slice(&[0u8; 16]); // aaguid
        self.bytes
            .extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(credential_id);
        self.bytes.extend_from_slice(cose_key);
        self
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn cose_ed25519_key(key: &SigningKey) -> Cbor {
    Cbor::Map(vec![
        (int(1), int(1)),              // kty: OKP
        (int(3), int(COSE_ALG_EDDSA)), // alg
        (int(-1), int(6)),             // crv: Ed25519
        (int(-2), Cbor::Bytes(key.verifying_key().to_bytes().to_vec())),
    ])
}

fn int(value: i64) -> Cbor {
    Cbor::Integer(value.into())
}

fn encode_cbor(value: &Cbor) -> Result<Vec<u8>, CeremonyError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf)
        .map_err(|e| CeremonyError::Bridge(format!("CBOR encoding failed: {e}")))?;
    Ok(buf)
}

fn client_data_json(client_data: &ClientData) -> Result<Vec<u8>, CeremonyError> {
    serde_json::to_vec(client_data)
        .map_err(|e| CeremonyError::Bridge(format!("client data encoding failed: {e}")))
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, CeremonyError> {
    webauthn::decode(value)
        .map_err(|e| CeremonyError::InvalidOptions(format!("{name} is not base64url: {e}")))
}

fn is_listed(credential_id: &str, descriptors: &[CredentialDescriptor]) -> bool {
    let Ok(id) = webauthn::decode(credential_id) else {
        return false;
    };
    descriptors
        .iter()
        .filter(|descriptor| descriptor.kind == PUBLIC_KEY_TYPE)
        .any(|descriptor| webauthn::decode(&descriptor.id).is_ok_and(|other| other == id))
}

fn vault_error(e: StoreError) -> CeremonyError {
    CeremonyError::Bridge(format!("credential vault: {e}"))
}
