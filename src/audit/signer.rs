//! Tamper-evidence for audit records.
//!
//! Canonical encoding: the record's fields (minus `signature`) as a JSON
//! object with sorted keys and no whitespace. Timestamps are RFC 3339 UTC
//! with nanosecond precision, absent optionals are `null`.

use chrono::{SecondsFormat, Utc};
use keyward_crypto::{canonical_json, TamperSeal};
use serde_json::json;

use crate::config::{EngineConfig, MIN_SECRET_LENGTH};
use crate::error::{KmsError, Result};

use super::record::{AuditEvent, AuditRecord};

pub struct AuditSigner {
    seal: TamperSeal,
}

impl AuditSigner {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Self::from_secret(config.audit_secret())
    }

    /// Build a signer from a raw secret of at least
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(KmsError::Configuration(format!(
                "audit secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }
        let seal = TamperSeal::new(secret)
            .map_err(|e| KmsError::Configuration(format!("audit secret: {e}")))?;
        Ok(Self { seal })
    }

    /// Canonical byte encoding of every field except the signature.
    pub fn canonical_encoding(record: &AuditRecord) -> Result<Vec<u8>> {
        let fields = json!({
            "id": record.id,
            "actor_id": record.actor_id,
            "action": record.action,
            "resource_type": record.resource_type,
            "resource_id": record.resource_id,
            "outcome": record.outcome.as_str(),
            "detail": record.detail,
            "ip_address": record.ip_address,
            "user_agent": record.user_agent,
            "timestamp": record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        });
        Ok(canonical_json(&fields)?.into_bytes())
    }

    /// Hex HMAC-SHA256 over the canonical encoding.
    pub fn sign(&self, record: &AuditRecord) -> Result<String> {
        Ok(self.seal.tag(&Self::canonical_encoding(record)?))
    }

    /// Constant-time check of `record.signature`.
    pub fn verify(&self, record: &AuditRecord) -> bool {
        match Self::canonical_encoding(record) {
            Ok(encoded) => self.seal.check(&encoded, &record.signature),
            Err(_) => false,
        }
    }

    /// Stamp an event with a fresh id and the current time, and sign it.
    pub fn seal_event(&self, event: AuditEvent) -> Result<AuditRecord> {
        let mut record = AuditRecord {
            id: uuid::Uuid::new_v4().to_string(),
            actor_id: event.actor_id,
            action: event.action,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            outcome: event.outcome,
            detail: event.detail,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            timestamp: Utc::now(),
            signature: String::new(),
        };
        record.signature = self.sign(&record)?;
        Ok(record)
    }
}

impl std::fmt::Debug for AuditSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditSigner").finish_non_exhaustive()
    }
}
