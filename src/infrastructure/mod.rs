pub mod authenticator;
pub mod biometric;
pub mod credentials;
pub mod http_transport;
pub mod hybrid;
pub mod keyring;
pub mod local_store;
pub mod web;

pub use authenticator::SoftwareAuthenticator;
pub use biometric::{native_biometric, NativeBiometric};
pub use credentials::CredentialVault;
pub use http_transport::{HttpTransport, SeedSigner};
pub use hybrid::{HybridAndroidProvider, HybridIosProvider, HybridUnsupportedProvider};
pub use keyring::SecretStore;
pub use local_store::FileConfigStore;
pub use web::{PlatformCredentials, WebPlatformProvider};
