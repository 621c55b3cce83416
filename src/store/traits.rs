//! Persistence seams. Durability, transactions, and indexing live behind
//! these traits; the core only hands over plain records.

use crate::audit::AuditRecord;
use crate::error::StoreError;
use crate::types::{KeyRecord, KeyState};

/// How [`KeyStore::save`] must treat an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Insert a new record. Fails with `AlreadyExists` if the id is taken.
    Create,
    /// Replace a record that still has the given version and state.
    /// Fails with `Conflict` otherwise, including when it has been deleted.
    Replace { version: u32, state: KeyState },
}

/// Key record storage.
///
/// `save` is the only write path and must apply its [`SaveMode`] check and
/// the write atomically, so a read-modify-write (rotation, revocation) can
/// never silently overwrite a concurrent one.
pub trait KeyStore: Send + Sync {
    fn load(&self, id: &str) -> Result<Option<KeyRecord>, StoreError>;

    fn save(&self, record: &KeyRecord, mode: SaveMode) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<KeyRecord>, StoreError>;

    /// Remove a record. Returns `false` if it did not exist.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Append-only destination for signed audit records.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError>;
}

/// Read access to previously appended audit records, in append order.
pub trait AuditReader: Send + Sync {
    fn records(&self) -> Result<Vec<AuditRecord>, StoreError>;
}
