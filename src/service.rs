//! `KeyService`: the caller-facing surface.
//!
//! Adds authorization, transport encoding (base64 ciphertext, UTF-8
//! plaintext), and one signed audit record per call on top of
//! [`KeyLifecycleManager`]. Every failure is audited before it is returned.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Duration;
use keyward_crypto::{Algorithm, CryptoError};

use crate::audit::{
    filter_records, summarize, AuditEvent, AuditFilter, AuditRecord, AuditSigner, AuditSummary,
    Auditor,
};
use crate::config::EngineConfig;
use crate::error::{KmsError, Result};
use crate::lifecycle::KeyLifecycleManager;
use crate::store::{AuditReader, AuditSink, KeyStore, MemoryAuditLog, MemoryKeyStore};
use crate::types::{
    CreateKeyRequest, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KeyView,
    RequestContext, Role,
};

const RESOURCE_KEY: &str = "key";
const RESOURCE_DATA: &str = "data";
const RESOURCE_AUDIT: &str = "audit";

pub struct KeyService {
    lifecycle: KeyLifecycleManager,
    auditor: Auditor,
    audit_reader: Arc<dyn AuditReader>,
    rotation_max_age_days: u32,
}

impl KeyService {
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn KeyStore>,
        audit_sink: Arc<dyn AuditSink>,
        audit_reader: Arc<dyn AuditReader>,
    ) -> Result<Self> {
        Ok(Self {
            lifecycle: KeyLifecycleManager::new(config, store)?,
            auditor: Auditor::new(AuditSigner::new(config)?, audit_sink),
            audit_reader,
            rotation_max_age_days: config.rotation_max_age_days(),
        })
    }

    /// A service backed by the in-memory store and audit log.
    pub fn in_memory(config: &EngineConfig) -> Result<Self> {
        let log = Arc::new(MemoryAuditLog::new());
        Self::new(config, Arc::new(MemoryKeyStore::new()), log.clone(), log)
    }

    pub fn lifecycle(&self) -> &KeyLifecycleManager {
        &self.lifecycle
    }

    // ========================================================================
    // Key management
    // ========================================================================

    pub fn create_key(&self, ctx: &RequestContext, request: CreateKeyRequest) -> Result<KeyView> {
        self.audited(ctx, AuditEvent::new("create_key", RESOURCE_KEY), |event| {
            let actor = authorize(ctx, Role::Admin)?;
            let algorithm: Algorithm = request.algorithm.parse()?;
            let record = self.lifecycle.create(&request.name, algorithm, actor)?;
            event.resource_id = Some(record.id.clone());
            Ok(KeyView::from(&record))
        })
    }

    pub fn list_keys(&self, ctx: &RequestContext) -> Result<Vec<KeyView>> {
        self.audited(ctx, AuditEvent::new("list_keys", RESOURCE_KEY), |_| {
            authorize(ctx, Role::User)?;
            Ok(self.lifecycle.list()?.iter().map(KeyView::from).collect())
        })
    }

    pub fn get_key(&self, ctx: &RequestContext, key_id: &str) -> Result<KeyView> {
        let event = AuditEvent::new("get_key", RESOURCE_KEY).resource(key_id);
        self.audited(ctx, event, |_| {
            authorize(ctx, Role::User)?;
            Ok(KeyView::from(&self.lifecycle.get(key_id)?))
        })
    }

    pub fn rotate_key(&self, ctx: &RequestContext, key_id: &str) -> Result<KeyView> {
        let event = AuditEvent::new("rotate_key", RESOURCE_KEY).resource(key_id);
        self.audited(ctx, event, |_| {
            authorize(ctx, Role::Admin)?;
            Ok(KeyView::from(&self.lifecycle.rotate(key_id)?))
        })
    }

    pub fn revoke_key(&self, ctx: &RequestContext, key_id: &str) -> Result<KeyView> {
        let event = AuditEvent::new("revoke_key", RESOURCE_KEY).resource(key_id);
        self.audited(ctx, event, |_| {
            authorize(ctx, Role::Admin)?;
            Ok(KeyView::from(&self.lifecycle.revoke(key_id)?))
        })
    }

    pub fn delete_key(&self, ctx: &RequestContext, key_id: &str) -> Result<()> {
        let event = AuditEvent::new("delete_key", RESOURCE_KEY).resource(key_id);
        self.audited(ctx, event, |_| {
            authorize(ctx, Role::Admin)?;
            self.lifecycle.delete(key_id)
        })
    }

    // ========================================================================
    // Data operations
    // ========================================================================

    pub fn encrypt(
        &self,
        ctx: &RequestContext,
        request: EncryptRequest,
    ) -> Result<EncryptResponse> {
        let event = AuditEvent::new("encrypt", RESOURCE_DATA).resource(&request.key_id);
        self.audited(ctx, event, |_| {
            authorize(ctx, Role::User)?;
            let (record, sealed) = self
                .lifecycle
                .encrypt(&request.key_id, request.plaintext.as_bytes())?;
            Ok(EncryptResponse {
                ciphertext: STANDARD.encode(sealed),
                key_id: record.id,
                version: record.version,
            })
        })
    }

    pub fn decrypt(
        &self,
        ctx: &RequestContext,
        request: DecryptRequest,
    ) -> Result<DecryptResponse> {
        let event = AuditEvent::new("decrypt", RESOURCE_DATA).resource(&request.key_id);
        self.audited(ctx, event, |_| {
            authorize(ctx, Role::User)?;
            let sealed = STANDARD.decode(request.ciphertext.trim()).map_err(|e| {
                CryptoError::MalformedInput(format!("ciphertext is not valid base64: {e}"))
            })?;
            let (record, plaintext) = self.lifecycle.decrypt(&request.key_id, &sealed)?;
            let plaintext = String::from_utf8(plaintext).map_err(|_| {
                CryptoError::MalformedInput("decrypted plaintext is not UTF-8".into())
            })?;
            Ok(DecryptResponse {
                plaintext,
                key_id: record.id,
                version: record.version,
            })
        })
    }

    // ========================================================================
    // Rotation sweep
    // ========================================================================

    /// Rotate every active key at least `max_age_days` old and return how
    /// many were rotated. Meant for a periodic external trigger.
    ///
    /// Audit sink errors are logged per key and never abort the sweep.
    pub fn auto_rotate(&self, max_age_days: u32) -> Result<usize> {
        let report = self
            .lifecycle
            .auto_rotate(Duration::days(i64::from(max_age_days)))?;

        for key_id in &report.rotated {
            let event = AuditEvent::new("auto_rotate_key", RESOURCE_KEY).resource(key_id);
            if let Err(e) = self.auditor.record(event) {
                tracing::error!(key_id = %key_id, error = %e, "failed to audit rotation");
            }
        }
        for (key_id, reason) in &report.failed {
            let event = AuditEvent::new("auto_rotate_key", RESOURCE_KEY)
                .resource(key_id)
                .failed(reason.as_str());
            if let Err(e) = self.auditor.record(event) {
                tracing::error!(key_id = %key_id, error = %e, "failed to audit rotation failure");
            }
        }
        Ok(report.rotated_count())
    }

    /// [`KeyService::auto_rotate`] with the configured maximum age.
    pub fn rotate_due_keys(&self) -> Result<usize> {
        self.auto_rotate(self.rotation_max_age_days)
    }

    // ========================================================================
    // Audit log
    // ========================================================================

    pub fn audit_logs(
        &self,
        ctx: &RequestContext,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditRecord>> {
        self.audited(ctx, AuditEvent::new("view_audit_logs", RESOURCE_AUDIT), |_| {
            authorize(ctx, Role::Admin)?;
            filter_records(self.audit_reader.records()?, filter)
        })
    }

    pub fn audit_summary(&self, ctx: &RequestContext) -> Result<AuditSummary> {
        self.audited(ctx, AuditEvent::new("view_audit_summary", RESOURCE_AUDIT), |_| {
            authorize(ctx, Role::Admin)?;
            Ok(summarize(&self.audit_reader.records()?))
        })
    }

    /// Ids of audit records whose signature no longer verifies.
    pub fn verify_audit_log(&self) -> Result<Vec<String>> {
        let signer = self.auditor.signer();
        Ok(self
            .audit_reader
            .records()?
            .into_iter()
            .filter(|record| !signer.verify(record))
            .map(|record| record.id)
            .collect())
    }

    /// Run `op`, then append exactly one audit record describing it.
    fn audited<T>(
        &self,
        ctx: &RequestContext,
        event: AuditEvent,
        op: impl FnOnce(&mut AuditEvent) -> Result<T>,
    ) -> Result<T> {
        let mut event = event.context(ctx);
        match op(&mut event) {
            Ok(value) => {
                self.auditor.record(event)?;
                Ok(value)
            }
            Err(err) => Err(self.auditor.record_failure(event, err)),
        }
    }
}

/// Check the caller is authenticated and holds `required`, returning the
/// actor id.
fn authorize(ctx: &RequestContext, required: Role) -> Result<&str> {
    let actor = ctx
        .actor_id
        .as_deref()
        .ok_or_else(|| KmsError::Forbidden("authentication required".into()))?;
    if required == Role::Admin && ctx.role != Role::Admin {
        return Err(KmsError::Forbidden("admin role required".into()));
    }
    Ok(actor)
}
