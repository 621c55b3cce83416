//! End-to-end key lifecycle through `KeyService`.

use keyward::{
    AuditFilter, AuditOutcome, CreateKeyRequest, DecryptRequest, EncryptRequest, EngineConfig,
    ErrorKind, KeyService, KmsError, RequestContext,
};

// ============================================================================
// Helpers
// ============================================================================

fn service() -> KeyService {
    let config = EngineConfig::new(&[0x3Cu8; 32], b"integration-audit-secret-0123456789").unwrap();
    KeyService::in_memory(&config).unwrap()
}

fn admin() -> RequestContext {
    RequestContext::admin("admin-1")
        .with_ip_address("127.0.0.1")
        .with_user_agent("keyward-tests")
}

fn encrypt(service: &KeyService, key_id: &str, plaintext: &str) -> keyward::Result<String> {
    service
        .encrypt(
            &admin(),
            EncryptRequest {
                key_id: key_id.into(),
                plaintext: plaintext.into(),
            },
        )
        .map(|r| r.ciphertext)
}

fn decrypt(
    service: &KeyService,
    key_id: &str,
    ciphertext: &str,
) -> keyward::Result<(String, u32)> {
    service
        .decrypt(
            &admin(),
            DecryptRequest {
                key_id: key_id.into(),
                ciphertext: ciphertext.into(),
            },
        )
        .map(|r| (r.plaintext, r.version))
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn create_encrypt_rotate_revoke() {
    let service = service();
    let key = service
        .create_key(
            &admin(),
            CreateKeyRequest {
                name: "customer-data".into(),
                algorithm: "AES256GCM".into(),
            },
        )
        .unwrap();
    assert_eq!(key.version, 1);
    assert!(key.is_active);
    assert!(!key.is_revoked);
    assert_eq!(key.owner_id, "admin-1");

    // Encrypt and decrypt at version 1.
    let v1_ciphertext = encrypt(&service, &key.id, "hello world").unwrap();
    let (plaintext, version) = decrypt(&service, &key.id, &v1_ciphertext).unwrap();
    assert_eq!(plaintext, "hello world");
    assert_eq!(version, 1);

    // Rotation replaces the material: old ciphertext no longer opens.
    let rotated = service.rotate_key(&admin(), &key.id).unwrap();
    assert_eq!(rotated.version, 2);
    assert!(rotated.rotated_at.is_some());
    let err = decrypt(&service, &key.id, &v1_ciphertext).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);

    // Seal under v2, then revoke.
    let v2_ciphertext = encrypt(&service, &key.id, "sealed before revoke").unwrap();
    let revoked = service.revoke_key(&admin(), &key.id).unwrap();
    assert!(revoked.is_revoked);
    assert!(!revoked.is_active);
    assert!(revoked.revoked_at.is_some());

    let err = encrypt(&service, &key.id, "after revoke").unwrap_err();
    assert!(matches!(err, KmsError::InvalidState(_)));

    let (plaintext, version) = decrypt(&service, &key.id, &v2_ciphertext).unwrap();
    assert_eq!(plaintext, "sealed before revoke");
    assert_eq!(version, 2);

    // Revoked keys cannot be rotated; revoking again is a no-op.
    let err = service.rotate_key(&admin(), &key.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    let again = service.revoke_key(&admin(), &key.id).unwrap();
    assert_eq!(again.revoked_at, revoked.revoked_at);

    // Failures were audited.
    let failures = service
        .audit_logs(
            &admin(),
            &AuditFilter {
                outcome: Some(AuditOutcome::Failure),
                ..Default::default()
            },
        )
        .unwrap();
    let failed_actions: Vec<&str> = failures.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(failed_actions, ["rotate_key", "encrypt", "decrypt"]);
    assert!(failures
        .iter()
        .all(|r| r.ip_address.as_deref() == Some("127.0.0.1")));
}

#[test]
fn delete_is_destructive() {
    let service = service();
    let key = service
        .create_key(
            &admin(),
            CreateKeyRequest {
                name: "short-lived".into(),
                algorithm: "HMAC256".into(),
            },
        )
        .unwrap();
    let sealed = encrypt(&service, &key.id, "tagged").unwrap();

    service.delete_key(&admin(), &key.id).unwrap();

    assert_eq!(
        decrypt(&service, &key.id, &sealed).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.delete_key(&admin(), &key.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(service.list_keys(&admin()).unwrap().is_empty());
}

#[test]
fn tampered_ciphertext_is_rejected_and_audited() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let service = service();
    let key = service
        .create_key(
            &admin(),
            CreateKeyRequest {
                name: "signing".into(),
                algorithm: "ECC256".into(),
            },
        )
        .unwrap();
    let sealed = encrypt(&service, &key.id, "transfer 100").unwrap();

    let mut bytes = STANDARD.decode(&sealed).unwrap();
    bytes[9] = b'9';
    let tampered = STANDARD.encode(bytes);
    let err = decrypt(&service, &key.id, &tampered).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);

    let last = service
        .audit_logs(&admin(), &AuditFilter::default())
        .unwrap()
        .into_iter()
        .find(|r| r.action == "decrypt")
        .unwrap();
    assert_eq!(last.outcome, AuditOutcome::Failure);
    assert_eq!(last.resource_id.as_deref(), Some(key.id.as_str()));
}

#[test]
fn sign_families_return_readable_payloads() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let service = service();
    for algorithm in ["HMAC512", "ECC384", "Ed25519"] {
        let key = service
            .create_key(
                &admin(),
                CreateKeyRequest {
                    name: algorithm.into(),
                    algorithm: algorithm.into(),
                },
            )
            .unwrap();
        let sealed = encrypt(&service, &key.id, "visible text").unwrap();
        let bytes = STANDARD.decode(&sealed).unwrap();
        assert!(bytes.starts_with(b"visible text|"), "{algorithm}");
        assert_eq!(
            decrypt(&service, &key.id, &sealed).unwrap().0,
            "visible text"
        );
    }
}
