//! Concurrent lifecycle operations against one key.

use std::sync::Arc;

use keyward::{
    CreateKeyRequest, EngineConfig, ErrorKind, KeyService, KmsError, RequestContext, StoreError,
};

fn shared_service() -> Arc<KeyService> {
    let config = EngineConfig::new(&[0x5Eu8; 32], &[0xE5u8; 32]).unwrap();
    Arc::new(KeyService::in_memory(&config).unwrap())
}

fn create(service: &KeyService) -> String {
    service
        .create_key(
            &RequestContext::admin("admin-1"),
            CreateKeyRequest {
                name: "contended".into(),
                algorithm: "AES256GCM".into(),
            },
        )
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rotations_never_share_a_version() {
    let service = shared_service();
    let id = create(&service);

    let mut handles = Vec::new();
    for n in 0..16 {
        let service = Arc::clone(&service);
        let id = id.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            service.rotate_key(&RequestContext::admin(format!("admin-{n}")), &id)
        }));
    }

    let mut versions = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(view) => versions.push(view.version),
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Conflict);
                assert!(matches!(err, KmsError::Store(StoreError::Conflict { .. })));
            }
        }
    }

    let mut unique = versions.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), versions.len(), "two rotations produced one version");
    assert!(!versions.is_empty());

    let final_view = service
        .get_key(&RequestContext::admin("admin-1"), &id)
        .unwrap();
    assert_eq!(final_view.version as usize, 1 + versions.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rotation_racing_revocation_never_reactivates() {
    let service = shared_service();
    let id = create(&service);
    let admin = RequestContext::admin("admin-1");

    let rotate = {
        let service = Arc::clone(&service);
        let id = id.clone();
        let admin = admin.clone();
        tokio::task::spawn_blocking(move || {
            for _ in 0..20 {
                let _ = service.rotate_key(&admin, &id);
            }
        })
    };
    let revoke = {
        let service = Arc::clone(&service);
        let id = id.clone();
        let admin = admin.clone();
        tokio::task::spawn_blocking(move || loop {
            match service.revoke_key(&admin, &id) {
                Ok(view) => break view,
                Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict),
            }
        })
    };
    rotate.await.unwrap();
    let revoked = revoke.await.unwrap();
    assert!(revoked.is_revoked);

    let view = service.get_key(&admin, &id).unwrap();
    assert!(view.is_revoked);
    assert!(!view.is_active);
    assert_eq!(view.version, revoked.version);
}
