use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

use super::keyring::write_private;
use crate::domain::StoreError;

/// A platform credential held by the software authenticator.
/// Binary fields are base64url.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub credential_id: String,
    pub rp_id: String,
    pub user_id: String,
    pub user_name: String,
    pub secret_key: String,
    pub sign_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Drop for CredentialRecord {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

/// `credentials.json`, owner-only.
pub struct CredentialVault {
    path: PathBuf,
}

impl CredentialVault {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join("credentials.json"),
        }
    }

    pub fn load(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            what: "credential vault",
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
            what: "credential vault",
            reason: e.to_string(),
        })
    }

    pub fn for_rp(&self, rp_id: &str) -> Result<Vec<CredentialRecord>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|record| record.rp_id == rp_id)
            .collect())
    }

    pub fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        let mut records = self.load()?;
        records.push(record);
        self.save(&records)
    }

    /// Stores the new signature counter of an existing credential.
    pub fn update_counter(&self, credential_id: &str, sign_count: u32) -> Result<(), StoreError> {
        let mut records = self.load()?;
        let record = records
            .iter_mut()
            .find(|record| record.credential_id == credential_id)
            .ok_or_else(|| StoreError::Corrupted {
                what: "credential vault",
                reason: format!("credential {credential_id} disappeared"),
            })?;
        record.sign_count = sign_count;
        self.save(&records)
    }

    fn save(&self, records: &[CredentialRecord]) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(records).map_err(|e| StoreError::Corrupted {
            what: "credential vault",
            reason: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                what: "config directory",
                source,
            })?;
        }
        let result = write_private(&self.path, &json).map_err(|source| StoreError::Write {
            what: "credential vault",
            source,
        });
        json.zeroize();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, rp_id: &str) -> CredentialRecord {
        CredentialRecord {
            credential_id: id.to_string(),
            rp_id: rp_id.to_string(),
            user_id: "dXNlcg".to_string(),
            user_name: "device-1".to_string(),
            secret_key: "c2VjcmV0".to_string(),
            sign_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_filter_by_rp() {
        let dir = TempDir::new().unwrap();
        let vault = CredentialVault::new(dir.path());

        vault.insert(record("a", "wallet.example")).unwrap();
        vault.insert(record("b", "other.example")).unwrap();

        let found = vault.for_rp("wallet.example").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].credential_id, "a");
    }

    #[test]
    fn test_update_counter() {
        let dir = TempDir::new().unwrap();
        let vault = CredentialVault::new(dir.path());
        vault.insert(record("a", "wallet.example")).unwrap();

        vault.update_counter("a", 7).unwrap();
        assert_eq!(vault.load().unwrap()[0].sign_count, 7);

        assert!(vault.update_counter("missing", 1).is_err());
    }
}
