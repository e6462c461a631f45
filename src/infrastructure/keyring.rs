use keyring::Entry;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::StoreError;

const SERVICE_NAME: &str = "touchid";

/// Small secrets (PIN, seed keys) in the OS keyring, falling back to
/// owner-only files under the config directory when no keyring is usable.
pub struct SecretStore {
    fallback_dir: PathBuf,
    use_keyring: bool,
}

impl SecretStore {
    pub fn new(config_dir: &Path, use_keyring: bool) -> Self {
        Self {
            fallback_dir: config_dir.join("secrets"),
            use_keyring,
        }
    }

    pub fn save(&self, name: &str, secret: &str) -> Result<(), StoreError> {
        if let Some(entry) = self.entry(name) {
            if entry.set_password(secret).is_ok() {
                return Ok(());
            }
        }

        fs::create_dir_all(&self.fallback_dir).map_err(|source| StoreError::Write {
            what: "secret directory",
            source,
        })?;
        let path = self.fallback_path(name);
        write_private(&path, secret).map_err(|source| StoreError::Write {
            what: "secret file",
            source,
        })
    }

    pub fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        let from_keyring = self
            .entry(name)
            .and_then(|entry| entry.get_password().ok())
            .map(|s| s.trim().to_string());

        if from_keyring.is_some() {
            return Ok(from_keyring);
        }

        let path = self.fallback_path(name);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(|s| Some(s.trim().to_string()))
            .map_err(|source| StoreError::Read {
                what: "secret file",
                source,
            })
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        if let Some(entry) = self.entry(name) {
            keyring_delete_result(entry.delete_password())?;
        }

        let path = self.fallback_path(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| StoreError::Write {
                what: "secret file",
                source,
            })?;
        }
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<Entry> {
        if !self.use_keyring {
            return None;
        }
        Entry::new(SERVICE_NAME, name).ok()
    }

    fn fallback_path(&self, name: &str) -> PathBuf {
        self.fallback_dir.join(name)
    }
}

/// A missing entry counts as deleted.
fn keyring_delete_result(result: keyring::Result<()>) -> Result<(), StoreError> {
    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(StoreError::Keyring(e.to_string())),
    }
}

/// Writes through a temp file created 0600 on unix, then renames.
pub(crate) fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");
    match fs::remove_file(&temp_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_fallback_roundtrip() {
        let dir = TempDir::new().unwrap();
        let secrets = SecretStore::new(dir.path(), false);

        assert_eq!(secrets.load("pin").unwrap(), None);

        secrets.save("pin", "4321").unwrap();
        assert_eq!(secrets.load("pin").unwrap().as_deref(), Some("4321"));

        secrets.delete("pin").unwrap();
        assert_eq!(secrets.load("pin").unwrap(), None);
        secrets.delete("pin").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_fallback_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let secrets = SecretStore::new(dir.path(), false);
        secrets.save("seed_private", "secret").unwrap();

        let mode = fs::metadata(dir.path().join("secrets").join("seed_private"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_keyring_delete_errors_are_reported() {
        assert!(keyring_delete_result(Ok(())).is_ok());
        assert!(keyring_delete_result(Err(keyring::Error::NoEntry)).is_ok());

        let failure = keyring::Error::PlatformFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "keychain locked",
        )));
        let err = keyring_delete_result(Err(failure)).unwrap_err();
        assert!(matches!(err, StoreError::Keyring(ref msg) if msg.contains("keychain locked")));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_replaces_with_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!path.with_extension("tmp").exists());
    }
}
