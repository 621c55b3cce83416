pub mod audit;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod service;
pub mod store;
pub mod types;

pub use audit::{AuditFilter, AuditOutcome, AuditRecord, AuditSigner, AuditSummary};
pub use config::EngineConfig;
pub use error::{ErrorKind, KmsError, Result, StoreError};
pub use lifecycle::{evaluate_due, KeyLifecycleManager, RotationReport};
pub use service::KeyService;
pub use store::{AuditReader, AuditSink, KeyStore, MemoryAuditLog, MemoryKeyStore, SaveMode};
pub use types::{
    CreateKeyRequest, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KeyRecord,
    KeyState, KeyUse, KeyView, RequestContext, Role,
};

pub use keyward_crypto::{Algorithm, CryptoError};
