//! Every algorithm through the lifecycle manager, wrapped and unwrapped.

use std::sync::Arc;

use keyward::{Algorithm, EngineConfig, KeyLifecycleManager, KeyStore, MemoryKeyStore};

fn manager() -> (KeyLifecycleManager, Arc<MemoryKeyStore>) {
    let config = EngineConfig::new(&[0x77u8; 48], &[0x88u8; 32]).unwrap();
    let store = Arc::new(MemoryKeyStore::new());
    (KeyLifecycleManager::new(&config, store.clone()).unwrap(), store)
}

#[test]
fn round_trip_every_algorithm_except_rsa4096() {
    let (manager, _) = manager();
    let multi_block = "x".repeat(1000);
    for algorithm in Algorithm::ALL {
        if algorithm == Algorithm::Rsa4096 {
            continue;
        }
        let record = manager.create("matrix", algorithm, "admin-1").unwrap();
        let payloads: [&[u8]; 3] = [b"", b"hello world", multi_block.as_bytes()];
        for payload in payloads {
            if algorithm.rsa_bits().is_some() && payload.len() > 190 {
                continue;
            }
            let (_, sealed) = manager.encrypt(&record.id, payload).unwrap();
            let (_, opened) = manager.decrypt(&record.id, &sealed).unwrap();
            assert_eq!(opened, payload, "{algorithm}");
        }
    }
}

#[test]
fn stored_material_is_never_plaintext() {
    let (manager, store) = manager();
    let record = manager.create("opaque", Algorithm::Ed25519, "admin-1").unwrap();
    let stored = store.load(&record.id).unwrap().unwrap();
    assert!(!stored
        .wrapped_key
        .windows(11)
        .any(|w| w == b"-----BEGIN "));
}

#[test]
fn rotation_preserves_identity_for_asymmetric_keys() {
    let (manager, _) = manager();
    let v1 = manager.create("rsa", Algorithm::Rsa2048, "admin-1").unwrap();
    let v2 = manager.rotate(&v1.id).unwrap();
    assert_eq!(v2.id, v1.id);
    assert_eq!(v2.algorithm, Algorithm::Rsa2048);
    assert_eq!(v2.version, 2);
    assert_ne!(v2.wrapped_key, v1.wrapped_key);
}

#[test]
#[ignore = "RSA-4096 generation is slow in debug builds"]
fn rsa4096_round_trip() {
    let (manager, _) = manager();
    let record = manager.create("big", Algorithm::Rsa4096, "admin-1").unwrap();
    let (_, sealed) = manager.encrypt(&record.id, b"large modulus").unwrap();
    assert_eq!(sealed.len(), 512);
    let (_, opened) = manager.decrypt(&record.id, &sealed).unwrap();
    assert_eq!(opened, b"large modulus");
}
