//! Signs audit events and hands them to the sink.

use std::sync::Arc;

use crate::error::{KmsError, Result};
use crate::store::AuditSink;

use super::record::AuditEvent;
use super::signer::AuditSigner;

pub struct Auditor {
    signer: AuditSigner,
    sink: Arc<dyn AuditSink>,
}

impl Auditor {
    pub fn new(signer: AuditSigner, sink: Arc<dyn AuditSink>) -> Self {
        Self { signer, sink }
    }

    pub fn signer(&self) -> &AuditSigner {
        &self.signer
    }

    /// Sign and append. A sink failure is returned to the caller.
    pub fn record(&self, event: AuditEvent) -> Result<()> {
        let record = self.signer.seal_event(event)?;
        self.sink.append(&record)?;
        Ok(())
    }

    /// Audit a failed operation and hand back its error.
    ///
    /// The operation's error always wins: if the audit write itself fails
    /// that is logged, not returned.
    pub fn record_failure(&self, event: AuditEvent, err: KmsError) -> KmsError {
        let event = event.failed(err.to_string());
        tracing::warn!(
            action = %event.action,
            resource_id = ?event.resource_id,
            kind = ?err.kind(),
            "operation failed"
        );
        if let Err(audit_err) = self.record(event) {
            tracing::error!(
                error = %audit_err,
                "failed to append audit record for failed operation"
            );
        }
        err
    }
}
