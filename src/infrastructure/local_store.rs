use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::keyring::{write_private, SecretStore};
use crate::domain::{LocalConfigStore, StoreError};

const PIN_SECRET: &str = "pin";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeviceState {
    id: String,
    #[serde(default)]
    fido_touch_id_enabled: bool,
}

/// `state.toml` for the device id and enabled flag, PIN in the secret store.
pub struct FileConfigStore {
    state_path: PathBuf,
    state: Mutex<DeviceState>,
    secrets: SecretStore,
}

impl FileConfigStore {
    /// Loads the device state, generating and persisting a device id on
    /// first use.
    pub fn open(config_dir: &Path, secrets: SecretStore) -> Result<Self, StoreError> {
        let state_path = config_dir.join("state.toml");

        let state = if state_path.exists() {
            let content = fs::read_to_string(&state_path).map_err(|source| StoreError::Read {
                what: "device state",
                source,
            })?;
            toml::from_str(&content).map_err(|e| StoreError::Corrupted {
                what: "device state",
                reason: e.to_string(),
            })?
        } else {
            let state = DeviceState {
                id: uuid::Uuid::new_v4().to_string(),
                fido_touch_id_enabled: false,
            };
            debug!(id = %state.id, "Generated new device id");
            save_state(&state_path, &state)?;
            state
        };

        Ok(Self {
            state_path,
            state: Mutex::new(state),
            secrets,
        })
    }

    fn update(&self, apply: impl FnOnce(&mut DeviceState)) -> Result<(), StoreError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = state.clone();
        apply(&mut next);
        save_state(&self.state_path, &next)?;
        *state = next;
        Ok(())
    }

    fn read(&self) -> DeviceState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LocalConfigStore for FileConfigStore {
    fn id(&self) -> String {
        self.read().id
    }

    fn pin(&self) -> Option<String> {
        match self.secrets.load(PIN_SECRET) {
            Ok(pin) => pin,
            Err(e) => {
                warn!(error = %e, "Failed to read stored PIN");
                None
            }
        }
    }

    fn set_pin(&self, pin: Option<&str>) -> Result<(), StoreError> {
        match pin {
            Some(pin) => self.secrets.save(PIN_SECRET, pin),
            None => self.secrets.delete(PIN_SECRET),
        }
    }

    fn is_fido_touch_id_enabled(&self) -> bool {
        self.read().fido_touch_id_enabled
    }

    fn set_fido_touch_id_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.update(|state| state.fido_touch_id_enabled = enabled)
    }
}

fn save_state(path: &Path, state: &DeviceState) -> Result<(), StoreError> {
    let content = toml::to_string_pretty(state).map_err(|e| StoreError::Corrupted {
        what: "device state",
        reason: e.to_string(),
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            what: "config directory",
            source,
        })?;
    }
    write_private(path, &content).map_err(|source| StoreError::Write {
        what: "device state",
        source,
    })
}
