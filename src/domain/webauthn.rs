//! JSON shapes of WebAuthn options and responses as exchanged with the
//! wallet backend. Binary fields travel as unpadded base64url strings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PUBLIC_KEY_TYPE: &str = "public-key";

/// COSE algorithm identifier for EdDSA.
pub const COSE_ALG_EDDSA: i64 = -8;

pub fn encode(bytes: &[u8]) -> String {
    BASE64URL.encode(bytes)
}

/// Decodes base64url, tolerating padding some servers emit.
pub fn decode(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64URL.decode(value.trim_end_matches('='))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelyingParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialParameter {
    #[serde(rename = "type")]
    pub kind: String,
    pub alg: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_resident_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

/// Registration options, as passed to `navigator.credentials.create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptions {
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub challenge: String,
    #[serde(default)]
    pub pub_key_cred_params: Vec<CredentialParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub exclude_credentials: Vec<CredentialDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
}

/// Authentication options, as passed to `navigator.credentials.get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub challenge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    #[serde(default)]
    pub allow_credentials: Vec<CredentialDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub attestation_object: String,
    pub transports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Credential returned by a ceremony, generic over the response payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredential<R> {
    pub id: String,
    pub raw_id: String,
    pub response: R,
    pub authenticator_attachment: String,
    pub client_extension_results: Map<String, Value>,
    #[serde(rename = "type")]
    pub kind: String,
}

pub type RegistrationCredential = PublicKeyCredential<AttestationResponse>;
pub type AuthenticationCredential = PublicKeyCredential<AssertionResponse>;

impl<R> PublicKeyCredential<R> {
    pub fn platform(raw_id: &[u8], response: R) -> Self {
        let id = encode(raw_id);
        Self {
            id: id.clone(),
            raw_id: id,
            response,
            authenticator_attachment: "platform".to_string(),
            client_extension_results: Map::new(),
            kind: PUBLIC_KEY_TYPE.to_string(),
        }
    }
}

/// `CollectedClientData` serialized into `clientDataJSON`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    #[serde(rename = "type")]
    pub kind: String,
    pub challenge: String,
    pub origin: String,
    pub cross_origin: bool,
}

impl ClientData {
    pub fn create(challenge: &[u8], origin: &str) -> Self {
        Self::new("webauthn.create", challenge, origin)
    }

    pub fn get(challenge: &[u8], origin: &str) -> Self {
        Self::new("webauthn.get", challenge, origin)
    }

    fn new(kind: &str, challenge: &[u8], origin: &str) -> Self {
        Self {
            kind: kind.to_string(),
            challenge: encode(challenge),
            origin: origin.to_string(),
            cross_origin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_server_creation_options() {
        let options: CreationOptions = serde_json::from_value(json!({
            "rp": {"name": "Wallet", "id": "wallet.example"},
            "user": {"id": "dXNlcg", "name": "device-1", "displayName": "device-1"},
            "challenge": "Y2hhbGxlbmdl",
            "pubKeyCredParams": [{"type": "public-key", "alg": -8}, {"type": "public-key", "alg": -7}],
            "timeout": 60000,
            "excludeCredentials": [],
            "authenticatorSelection": {"authenticatorAttachment": "platform", "userVerification": "required"},
            "attestation": "none"
        }))
        .unwrap();

        assert_eq!(options.rp.id.as_deref(), Some("wallet.example"));
        assert_eq!(options.pub_key_cred_params.len(), 2);
        assert_eq!(
            options
                .authenticator_selection
                .unwrap()
                .authenticator_attachment
                .as_deref(),
            Some("platform")
        );
    }

    #[test]
    fn test_request_options_defaults() {
        let options: RequestOptions =
            serde_json::from_value(json!({"challenge": "abc"})).unwrap();
        assert!(options.allow_credentials.is_empty());
        assert!(options.rp_id.is_none());
    }

    #[test]
    fn test_credential_json_field_names() {
        let credential = PublicKeyCredential::platform(
            &[1, 2, 3],
            AssertionResponse {
                client_data_json: "cd".to_string(),
                authenticator_data: "ad".to_string(),
                signature: "sig".to_string(),
                user_handle: None,
            },
        );
        let value = serde_json::to_value(&credential).unwrap();

        assert_eq!(value["id"], "AQID");
        assert_eq!(value["rawId"], "AQID");
        assert_eq!(value["type"], "public-key");
        assert_eq!(value["response"]["clientDataJSON"], "cd");
        assert_eq!(value["response"]["authenticatorData"], "ad");
        assert!(value["response"].get("userHandle").is_none());
        assert_eq!(value["clientExtensionResults"], json!({}));
    }

    #[test]
    fn test_decode_tolerates_padding() {
        assert_eq!(decode("AQI=").unwrap(), vec![1, 2]);
        assert_eq!(decode("AQI").unwrap(), vec![1, 2]);
    }
}
