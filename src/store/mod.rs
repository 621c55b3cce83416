pub mod memory;
pub mod traits;

pub use memory::{MemoryAuditLog, MemoryKeyStore};
pub use traits::{AuditReader, AuditSink, KeyStore, SaveMode};
