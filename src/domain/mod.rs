pub mod endpoints;
pub mod error;
pub mod provider;
pub mod runtime;
pub mod store;
pub mod transport;
pub mod webauthn;

pub use error::{CeremonyError, StoreError, TouchIdError, TransportError};
pub use provider::{CapabilityProvider, Ceremony, CeremonyOutcome};
pub use runtime::{Platform, RuntimeMode};
pub use store::LocalConfigStore;
pub use transport::{CredentialTransport, Method, SeedMode, TransportRequest};
