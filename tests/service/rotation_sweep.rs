//! Rotation sweeps through the service with unreliable stores and sinks.

use std::sync::Arc;

use keyward::{
    AuditOutcome, AuditReader, AuditRecord, AuditSink, CreateKeyRequest, EngineConfig,
    KeyRecord, KeyService, KeyStore, MemoryAuditLog, MemoryKeyStore, RequestContext, SaveMode,
    StoreError,
};
use parking_lot::Mutex;

// ============================================================================
// Helpers
// ============================================================================

enum Rule {
    AcceptAll,
    RejectNext(usize),
    RejectFailures,
}

/// An audit log that drops records according to its current rule.
struct UnreliableLog {
    inner: MemoryAuditLog,
    rule: Mutex<Rule>,
}

impl UnreliableLog {
    fn new() -> Self {
        Self {
            inner: MemoryAuditLog::new(),
            rule: Mutex::new(Rule::AcceptAll),
        }
    }
}

impl AuditSink for UnreliableLog {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let mut rule = self.rule.lock();
        let reject = match &mut *rule {
            Rule::AcceptAll => false,
            Rule::RejectNext(0) => false,
            Rule::RejectNext(n) => {
                *n -= 1;
                true
            }
            Rule::RejectFailures => record.outcome == AuditOutcome::Failure,
        };
        if reject {
            return Err(StoreError::Backend("sink down".into()));
        }
        self.inner.append(record)
    }
}

impl AuditReader for UnreliableLog {
    fn records(&self) -> Result<Vec<AuditRecord>, StoreError> {
        self.inner.records()
    }
}

/// A key store that refuses writes to one id.
struct StubbornStore {
    inner: MemoryKeyStore,
    refused: Mutex<Option<String>>,
}

impl KeyStore for StubbornStore {
    fn load(&self, id: &str) -> Result<Option<KeyRecord>, StoreError> {
        self.inner.load(id)
    }

    fn save(&self, record: &KeyRecord, mode: SaveMode) -> Result<(), StoreError> {
        if self.refused.lock().as_deref() == Some(record.id.as_str()) {
            return Err(StoreError::Backend("write refused".into()));
        }
        self.inner.save(record, mode)
    }

    fn list(&self) -> Result<Vec<KeyRecord>, StoreError> {
        self.inner.list()
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(id)
    }
}

fn setup() -> (KeyService, Arc<StubbornStore>, Arc<UnreliableLog>) {
    let config = EngineConfig::new(&[0x31u8; 32], &[0x32u8; 32]).unwrap();
    let store = Arc::new(StubbornStore {
        inner: MemoryKeyStore::new(),
        refused: Mutex::new(None),
    });
    let log = Arc::new(UnreliableLog::new());
    let service = KeyService::new(&config, store.clone(), log.clone(), log.clone()).unwrap();
    (service, store, log)
}

fn create_keys(service: &KeyService, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            service
                .create_key(
                    &RequestContext::admin("admin-1"),
                    CreateKeyRequest {
                        name: format!("key {i}"),
                        algorithm: "AES128GCM".into(),
                    },
                )
                .unwrap()
                .id
        })
        .collect()
}

fn sweep_records(log: &UnreliableLog) -> Vec<AuditRecord> {
    log.records()
        .unwrap()
        .into_iter()
        .filter(|r| r.action == "auto_rotate_key")
        .collect()
}

// ============================================================================
// Sweep
// ============================================================================

#[test]
fn rejected_audit_does_not_lose_rotated_count() {
    let (service, store, log) = setup();
    let ids = create_keys(&service, 3);

    *log.rule.lock() = Rule::RejectNext(1);
    assert_eq!(service.auto_rotate(0).unwrap(), 3);

    for id in &ids {
        assert_eq!(store.inner.load(id).unwrap().unwrap().version, 2);
    }
    // The first sweep record was dropped; the rest still landed.
    let sweep = sweep_records(&log);
    assert_eq!(sweep.len(), 2);
    assert!(sweep.iter().all(|r| r.outcome == AuditOutcome::Success));
}

#[test]
fn failed_rotation_is_audited_without_actor() {
    let (service, store, log) = setup();
    let ids = create_keys(&service, 3);

    *store.refused.lock() = Some(ids[1].clone());
    assert_eq!(service.auto_rotate(0).unwrap(), 2);

    let failures: Vec<AuditRecord> = sweep_records(&log)
        .into_iter()
        .filter(|r| r.outcome == AuditOutcome::Failure)
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].actor_id, None);
    assert_eq!(failures[0].resource_id.as_deref(), Some(ids[1].as_str()));
    assert!(failures[0].detail.is_some());
    assert_eq!(store.inner.load(&ids[1]).unwrap().unwrap().version, 1);
    assert!(service.verify_audit_log().unwrap().is_empty());
}

#[test]
fn rejected_failure_audit_is_swallowed() {
    let (service, store, log) = setup();
    let ids = create_keys(&service, 3);

    *store.refused.lock() = Some(ids[0].clone());
    *log.rule.lock() = Rule::RejectFailures;
    assert_eq!(service.auto_rotate(0).unwrap(), 2);

    let sweep = sweep_records(&log);
    assert_eq!(sweep.len(), 2);
    assert!(sweep.iter().all(|r| r.outcome == AuditOutcome::Success));
}
