//! In-memory `KeyStore` and audit log.
//!
//! Interior mutability via `parking_lot::Mutex`. Suitable for tests and
//! single-process embedding; nothing survives a restart.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::audit::AuditRecord;
use crate::error::StoreError;
use crate::types::KeyRecord;

use super::traits::{AuditReader, AuditSink, KeyStore, SaveMode};

// ============================================================================
// MemoryKeyStore
// ============================================================================

#[derive(Default)]
pub struct MemoryKeyStore {
    /// key id → record
    records: Mutex<HashMap<String, KeyRecord>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self, id: &str) -> Result<Option<KeyRecord>, StoreError> {
        Ok(self.records.lock().get(id).cloned())
    }

    fn save(&self, record: &KeyRecord, mode: SaveMode) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        match mode {
            SaveMode::Create => {
                if records.contains_key(&record.id) {
                    return Err(StoreError::AlreadyExists(record.id.clone()));
                }
            }
            SaveMode::Replace { version, state } => {
                let current = records
                    .get(&record.id)
                    .filter(|stored| stored.version == version && stored.state == state);
                if current.is_none() {
                    return Err(StoreError::Conflict {
                        id: record.id.clone(),
                        expected_version: version,
                    });
                }
            }
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    /// Oldest first, ties broken by id.
    fn list(&self) -> Result<Vec<KeyRecord>, StoreError> {
        let mut all: Vec<KeyRecord> = self.records.lock().values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.records.lock().remove(id).is_some())
    }
}

// ============================================================================
// MemoryAuditLog
// ============================================================================

#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

impl AuditReader for MemoryAuditLog {
    fn records(&self) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self.records.lock().clone())
    }
}
