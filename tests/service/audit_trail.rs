//! Audit signing, tamper detection, and audit log queries.

use std::sync::Arc;

use keyward::{
    AuditFilter, AuditOutcome, AuditReader, AuditRecord, AuditSink, CreateKeyRequest,
    EngineConfig, ErrorKind, KeyService, MemoryKeyStore, RequestContext, StoreError,
};
use parking_lot::Mutex;

// ============================================================================
// Helpers
// ============================================================================

/// An audit log whose records tests can rewrite after the fact.
#[derive(Default)]
struct EditableLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditSink for EditableLog {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

impl AuditReader for EditableLog {
    fn records(&self) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self.records.lock().clone())
    }
}

fn service_with_log() -> (KeyService, Arc<EditableLog>) {
    let config = EngineConfig::new(&[0x01u8; 32], &[0x02u8; 64]).unwrap();
    let log = Arc::new(EditableLog::default());
    let service = KeyService::new(
        &config,
        Arc::new(MemoryKeyStore::new()),
        log.clone(),
        log.clone(),
    )
    .unwrap();
    (service, log)
}

fn admin() -> RequestContext {
    RequestContext::admin("admin-1")
}

fn create(service: &KeyService, algorithm: &str) -> String {
    service
        .create_key(
            &admin(),
            CreateKeyRequest {
                name: format!("{algorithm} key"),
                algorithm: algorithm.into(),
            },
        )
        .unwrap()
        .id
}

// ============================================================================
// Tamper evidence
// ============================================================================

#[test]
fn untouched_log_verifies() {
    let (service, _) = service_with_log();
    let id = create(&service, "AES256GCM");
    service.rotate_key(&admin(), &id).unwrap();
    service.revoke_key(&admin(), &id).unwrap();
    assert!(service.verify_audit_log().unwrap().is_empty());
}

#[test]
fn edited_records_are_reported() {
    let (service, log) = service_with_log();
    let id = create(&service, "AES256GCM");
    service.rotate_key(&admin(), &id).unwrap();
    service.revoke_key(&admin(), &id).unwrap();

    let tampered_id = {
        let mut records = log.records.lock();
        // Rewrite history: the revoke was "done" by someone else.
        records[2].actor_id = Some("someone-else".into());
        records[2].id.clone()
    };
    assert_eq!(service.verify_audit_log().unwrap(), [tampered_id]);
}

#[test]
fn flipped_outcome_is_reported() {
    let (service, log) = service_with_log();
    let _ = service.rotate_key(&admin(), "does-not-exist");
    {
        let mut records = log.records.lock();
        assert_eq!(records[0].outcome, AuditOutcome::Failure);
        records[0].outcome = AuditOutcome::Success;
    }
    assert_eq!(service.verify_audit_log().unwrap().len(), 1);
}

#[test]
fn records_signed_under_another_secret_are_reported() {
    let (service, log) = service_with_log();
    create(&service, "HMAC256");

    let other = EngineConfig::new(&[0x01u8; 32], &[0x03u8; 64]).unwrap();
    let (other_service, other_log) = {
        let log = Arc::new(EditableLog::default());
        let svc = KeyService::new(
            &other,
            Arc::new(MemoryKeyStore::new()),
            log.clone(),
            log.clone(),
        )
        .unwrap();
        (svc, log)
    };
    create(&other_service, "HMAC256");
    let foreign = other_log.records.lock()[0].clone();
    log.records.lock().push(foreign.clone());

    assert_eq!(service.verify_audit_log().unwrap(), [foreign.id]);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn audit_logs_filter_and_page() {
    let (service, _) = service_with_log();
    let id = create(&service, "AES128GCM");
    let user = RequestContext::user("user-7");
    for _ in 0..3 {
        service
            .encrypt(
                &user,
                keyward::EncryptRequest {
                    key_id: id.clone(),
                    plaintext: "p".into(),
                },
            )
            .unwrap();
    }
    let _ = service.rotate_key(&user, &id);

    let by_user = service
        .audit_logs(
            &admin(),
            &AuditFilter {
                actor_id: Some("user-7".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(by_user.len(), 4);
    assert_eq!(by_user[0].action, "rotate_key");
    assert_eq!(by_user[0].outcome, AuditOutcome::Failure);

    let page = service
        .audit_logs(
            &admin(),
            &AuditFilter {
                action: Some("encrypt".into()),
                limit: Some(2),
                offset: 2,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.len(), 1);

    let err = service
        .audit_logs(
            &admin(),
            &AuditFilter {
                limit: Some(5000),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn audit_summary_counts_by_action_and_outcome() {
    let (service, _) = service_with_log();
    let id = create(&service, "AES256CBC");
    service.rotate_key(&admin(), &id).unwrap();
    let _ = service.rotate_key(&RequestContext::user("u"), &id);

    let summary = service.audit_summary(&admin()).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.by_action["create_key"], 1);
    assert_eq!(summary.by_action["rotate_key"], 2);
    assert_eq!(summary.by_outcome["success"], 2);
    assert_eq!(summary.by_outcome["failure"], 1);
}

#[test]
fn reading_the_log_requires_admin() {
    let (service, log) = service_with_log();
    let err = service
        .audit_logs(&RequestContext::user("u"), &AuditFilter::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let records = log.records.lock();
    assert_eq!(records.last().unwrap().action, "view_audit_logs");
    assert_eq!(records.last().unwrap().outcome, AuditOutcome::Failure);
}
