pub mod emit;
pub mod query;
pub mod record;
pub mod signer;

pub use emit::Auditor;
pub use query::{filter_records, summarize, AuditFilter, AuditSummary};
pub use record::{AuditEvent, AuditOutcome, AuditRecord};
pub use signer::AuditSigner;
