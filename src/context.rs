use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::{CapabilityProvider, Platform, RuntimeMode};
use crate::infrastructure::{
    native_biometric, CredentialVault, FileConfigStore, HttpTransport, HybridAndroidProvider,
    HybridIosProvider, HybridUnsupportedProvider, NativeBiometric, SecretStore, SeedSigner,
    SoftwareAuthenticator, WebPlatformProvider,
};
use crate::manager::PlatformCredentialManager;

/// Everything a command needs, wired from the on-disk configuration.
pub struct TouchIdContext {
    pub manager: PlatformCredentialManager,
    pub config: Config,
    pub store: Arc<FileConfigStore>,
}

impl TouchIdContext {
    pub async fn load(config_dir: &Path) -> Result<Self> {
        let config = Config::load(config_dir)?;
        let bridge = native_biometric();
        let provider = capability_provider(&config, config_dir, bridge)?;

        let transport = HttpTransport::new(
            &config.url_root,
            config.timeout(),
            SeedSigner::new(SecretStore::new(config_dir, config.use_keyring)),
        )
        .context("Failed to set up HTTP transport")?;

        let store = Arc::new(
            FileConfigStore::open(
                config_dir,
                SecretStore::new(config_dir, config.use_keyring),
            )
            .context("Failed to open device state")?,
        );

        let manager =
            PlatformCredentialManager::init(provider, Arc::new(transport), store.clone()).await;

        Ok(Self {
            manager,
            config,
            store,
        })
    }
}

/// Picks the capability strategy for the configured runtime and platform.
pub fn capability_provider(
    config: &Config,
    config_dir: &Path,
    bridge: Arc<dyn NativeBiometric>,
) -> Result<Arc<dyn CapabilityProvider>> {
    let provider: Arc<dyn CapabilityProvider> = match (config.runtime, config.platform) {
        (RuntimeMode::Hybrid, Platform::Ios) => Arc::new(HybridIosProvider::new(bridge)),
        (RuntimeMode::Hybrid, Platform::Android) => Arc::new(HybridAndroidProvider::new(bridge)),
        (RuntimeMode::Hybrid, Platform::Other) => Arc::new(HybridUnsupportedProvider),
        (RuntimeMode::Web, platform) => {
            let origin = config.effective_origin()?;
            let authenticator =
                SoftwareAuthenticator::new(&origin, CredentialVault::new(config_dir), bridge);
            Arc::new(WebPlatformProvider::new(Arc::new(authenticator), platform))
        }
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocalConfigStore;
    use crate::infrastructure::biometric::UnavailableBiometric;
    use tempfile::TempDir;

    fn select(runtime: RuntimeMode, platform: Platform) -> Arc<dyn CapabilityProvider> {
        let dir = TempDir::new().unwrap();
        let config = Config {
            runtime,
            platform,
            ..Config::default()
        };
        capability_provider(&config, dir.path(), Arc::new(UnavailableBiometric)).unwrap()
    }

    #[test]
    fn test_provider_selection() {
        let cases = [
            (RuntimeMode::Hybrid, Platform::Ios),
            (RuntimeMode::Hybrid, Platform::Android),
            (RuntimeMode::Hybrid, Platform::Other),
            (RuntimeMode::Web, Platform::Android),
        ];
        for (runtime, platform) in cases {
            let provider = select(runtime, platform);
            assert_eq!(provider.runtime(), runtime);
            assert_eq!(provider.platform(), platform);
        }
    }

    #[tokio::test]
    async fn test_context_without_biometrics_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            use_keyring: false,
            ..Config::default()
        };
        config.save(dir.path()).unwrap();

        let bridge: Arc<dyn NativeBiometric> = Arc::new(UnavailableBiometric);
        let provider = capability_provider(&config, dir.path(), bridge).unwrap();
        let store = Arc::new(
            FileConfigStore::open(dir.path(), SecretStore::new(dir.path(), false)).unwrap(),
        );
        store.set_fido_touch_id_enabled(true).unwrap();
        let transport = HttpTransport::new(
            &config.url_root,
            config.timeout(),
            SeedSigner::new(SecretStore::new(dir.path(), false)),
        )
        .unwrap();

        let manager = PlatformCredentialManager::init(provider, Arc::new(transport), store).await;

        assert!(!manager.is_available());
        assert!(!manager.is_enabled());
    }
}
