use anyhow::Result;
use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::{normalize_url_root, Config};

pub fn handle_config(subcommand: Option<ConfigCommands>, config_dir: &Path) -> Result<()> {
    let mut config = Config::load(config_dir)?;

    match subcommand {
        None => {
            println!("\nCurrent Configuration:");
            println!("  URL Root: {}", config.url_root);
            println!("  Runtime: {}", config.runtime);
            println!("  Platform: {}", config.platform);
            println!("  Origin: {}", config.effective_origin()?);
            println!("  Request Timeout: {} seconds", config.request_timeout_secs);
            println!(
                "  Secret Storage: {}",
                if config.use_keyring { "keyring" } else { "file" }
            );
        }
        Some(ConfigCommands::UrlRoot { url }) => {
            config.url_root = normalize_url_root(&url)?;
            config.save(config_dir)?;
            println!("✓ URL root updated to: {}", config.url_root);
        }
        Some(ConfigCommands::Runtime { mode }) => {
            config.runtime = mode;
            config.save(config_dir)?;
            println!("✓ Runtime updated to: {}", mode);
        }
        Some(ConfigCommands::Platform { platform }) => {
            config.platform = platform;
            config.save(config_dir)?;
            println!("✓ Platform updated to: {}", platform);
        }
        Some(ConfigCommands::Origin { origin }) => {
            config.origin = if origin == "auto" { None } else { Some(origin) };
            config.save(config_dir)?;
            println!("✓ Origin updated to: {}", config.effective_origin()?);
        }
        Some(ConfigCommands::Timeout { secs }) => {
            if secs == 0 {
                return Err(anyhow::anyhow!("Timeout must be at least 1 second"));
            }
            config.request_timeout_secs = secs;
            config.save(config_dir)?;
            println!("✓ Request timeout updated to: {} seconds", secs);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuntimeMode;
    use tempfile::TempDir;

    #[test]
    fn test_set_url_root_normalizes() {
        let dir = TempDir::new().unwrap();
        handle_config(
            Some(ConfigCommands::UrlRoot {
                url: "https://wallet.example/api".to_string(),
            }),
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.url_root, "https://wallet.example/api/");
    }

    #[test]
    fn test_set_runtime_and_auto_origin() {
        let dir = TempDir::new().unwrap();
        handle_config(
            Some(ConfigCommands::Runtime {
                mode: RuntimeMode::Hybrid,
            }),
            dir.path(),
        )
        .unwrap();
        handle_config(
            Some(ConfigCommands::Origin {
                origin: "https://app.example".to_string(),
            }),
            dir.path(),
        )
        .unwrap();
        handle_config(
            Some(ConfigCommands::Origin {
                origin: "auto".to_string(),
            }),
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.runtime, RuntimeMode::Hybrid);
        assert_eq!(config.origin, None);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(handle_config(Some(ConfigCommands::Timeout { secs: 0 }), dir.path()).is_err());
    }
}
