//! Key lifecycle state machine.
//!
//! ```text
//! Active(v) --rotate--> Active(v+1)
//! Active(v) --revoke--> Revoked        (terminal)
//! ```
//!
//! Every write goes through [`KeyStore::save`] with the version and state
//! that were read, so concurrent rotations of one key cannot both land and a
//! rotation cannot undo a revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use keyward_crypto::{generate_key, open, seal, Algorithm, MasterKeyWrapper};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::EngineConfig;
use crate::error::{KmsError, Result};
use crate::store::{KeyStore, SaveMode};
use crate::types::{KeyRecord, KeyState, KeyUse};

/// Outcome of a rotation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationReport {
    /// Ids of keys that were rotated.
    pub rotated: Vec<String>,
    /// `(key id, error message)` for keys that were due but failed.
    pub failed: Vec<(String, String)>,
}

impl RotationReport {
    pub fn rotated_count(&self) -> usize {
        self.rotated.len()
    }
}

/// True iff `record` is active and its material is at least `max_age` old.
pub fn evaluate_due(record: &KeyRecord, max_age: Duration) -> bool {
    is_due_at(record, max_age, Utc::now())
}

/// [`evaluate_due`] against an explicit clock.
pub fn is_due_at(record: &KeyRecord, max_age: Duration, now: DateTime<Utc>) -> bool {
    record.is_active() && now - record.last_rotation() >= max_age
}

pub struct KeyLifecycleManager {
    store: Arc<dyn KeyStore>,
    wrapper: MasterKeyWrapper,
}

impl KeyLifecycleManager {
    pub fn new(config: &EngineConfig, store: Arc<dyn KeyStore>) -> Result<Self> {
        let wrapper = MasterKeyWrapper::new(config.master_secret())
            .map_err(|e| KmsError::Configuration(format!("master key: {e}")))?;
        Ok(Self::with_wrapper(wrapper, store))
    }

    pub fn with_wrapper(wrapper: MasterKeyWrapper, store: Arc<dyn KeyStore>) -> Self {
        Self { store, wrapper }
    }

    /// Generate, wrap, and persist a new key at version 1.
    pub fn create(&self, name: &str, algorithm: Algorithm, owner_id: &str) -> Result<KeyRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KmsError::InvalidInput("key name must not be empty".into()));
        }

        let material = generate_key(algorithm)?;
        let record = KeyRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            algorithm,
            wrapped_key: self.wrapper.wrap(&material)?,
            version: 1,
            state: KeyState::Active,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
            rotated_at: None,
            revoked_at: None,
        };
        self.store.save(&record, SaveMode::Create)?;

        tracing::info!(key_id = %record.id, algorithm = %algorithm, "created key");
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<KeyRecord> {
        self.store
            .load(id)?
            .ok_or_else(|| KmsError::NotFound(id.to_string()))
    }

    pub fn list(&self) -> Result<Vec<KeyRecord>> {
        Ok(self.store.list()?)
    }

    /// Replace the key's material with fresh material of the same algorithm.
    ///
    /// Ciphertext sealed under earlier versions no longer opens.
    pub fn rotate(&self, id: &str) -> Result<KeyRecord> {
        let current = self.get(id)?;
        if current.is_revoked() {
            return Err(KmsError::InvalidState(format!(
                "key {id} is revoked and cannot be rotated"
            )));
        }

        let version = current.version.checked_add(1).ok_or_else(|| {
            KmsError::InvalidState(format!("key {id} has exhausted its version counter"))
        })?;
        let material = generate_key(current.algorithm)?;
        let mut next = current.clone();
        next.wrapped_key = self.wrapper.wrap(&material)?;
        next.version = version;
        next.rotated_at = Some(Utc::now());
        self.store.save(
            &next,
            SaveMode::Replace {
                version: current.version,
                state: current.state,
            },
        )?;

        tracing::info!(key_id = %id, version = next.version, "rotated key");
        Ok(next)
    }

    /// Revoke a key. Revoking an already revoked key is a no-op.
    pub fn revoke(&self, id: &str) -> Result<KeyRecord> {
        let current = self.get(id)?;
        if current.is_revoked() {
            return Ok(current);
        }

        let mut next = current.clone();
        next.state = KeyState::Revoked;
        next.revoked_at = Some(Utc::now());
        self.store.save(
            &next,
            SaveMode::Replace {
                version: current.version,
                state: current.state,
            },
        )?;

        tracing::info!(key_id = %id, version = next.version, "revoked key");
        Ok(next)
    }

    /// Permanently remove a key. Data sealed under it becomes unrecoverable.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id)? {
            return Err(KmsError::NotFound(id.to_string()));
        }
        tracing::info!(key_id = %id, "deleted key");
        Ok(())
    }

    /// Rotate every active key whose material is at least `max_age` old.
    ///
    /// Best effort: a failure on one key is recorded and the sweep moves on.
    /// Only a failure to list keys aborts it.
    pub fn auto_rotate(&self, max_age: Duration) -> Result<RotationReport> {
        let now = Utc::now();
        let mut report = RotationReport::default();

        for record in self.store.list()? {
            if !is_due_at(&record, max_age, now) {
                continue;
            }
            match self.rotate(&record.id) {
                Ok(_) => report.rotated.push(record.id),
                Err(e) => {
                    tracing::warn!(key_id = %record.id, error = %e, "scheduled rotation failed");
                    report.failed.push((record.id, e.to_string()));
                }
            }
        }

        tracing::info!(
            rotated = report.rotated.len(),
            failed = report.failed.len(),
            "rotation sweep finished"
        );
        Ok(report)
    }

    /// Load a key and unwrap its material for `key_use`, enforcing the
    /// access-for-use policy.
    pub fn unwrap_for_use(
        &self,
        id: &str,
        key_use: KeyUse,
    ) -> Result<(KeyRecord, Zeroizing<Vec<u8>>)> {
        let record = self.get(id)?;
        if !record.permits(key_use) {
            return Err(KmsError::InvalidState(format!(
                "key {id} is revoked and cannot be used to encrypt"
            )));
        }
        let material = self.wrapper.unwrap(&record.wrapped_key)?;
        Ok((record, material))
    }

    /// Seal `plaintext` under the current version of key `id`.
    pub fn encrypt(&self, id: &str, plaintext: &[u8]) -> Result<(KeyRecord, Vec<u8>)> {
        let (record, material) = self.unwrap_for_use(id, KeyUse::Encrypt)?;
        let sealed = seal(record.algorithm, &material, plaintext)?;
        Ok((record, sealed))
    }

    /// Open `sealed` with the current version of key `id`.
    pub fn decrypt(&self, id: &str, sealed: &[u8]) -> Result<(KeyRecord, Vec<u8>)> {
        let (record, material) = self.unwrap_for_use(id, KeyUse::Decrypt)?;
        let plaintext = open(record.algorithm, &material, sealed)?;
        Ok((record, plaintext))
    }
}
