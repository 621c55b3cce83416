//! Filtering, paging, and summarizing audit records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{KmsError, Result};

use super::record::{AuditOutcome, AuditRecord};

pub const DEFAULT_AUDIT_LIMIT: usize = 100;
pub const MAX_AUDIT_LIMIT: usize = 1000;

/// Audit log query. Blank string filters are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub actor_id: Option<String>,
    pub action: Option<String>,
    pub outcome: Option<AuditOutcome>,
    /// 1..=1000, default 100.
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl AuditFilter {
    pub fn effective_limit(&self) -> Result<usize> {
        match self.limit {
            None => Ok(DEFAULT_AUDIT_LIMIT),
            Some(limit) if (1..=MAX_AUDIT_LIMIT).contains(&limit) => Ok(limit),
            Some(limit) => Err(KmsError::InvalidInput(format!(
                "limit must be between 1 and {MAX_AUDIT_LIMIT}, got {limit}"
            ))),
        }
    }

    fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(actor) = non_blank(&self.actor_id) {
            if record.actor_id.as_deref() != Some(actor) {
                return false;
            }
        }
        if let Some(action) = non_blank(&self.action) {
            if record.action != action {
                return false;
            }
        }
        if let Some(outcome) = self.outcome {
            if record.outcome != outcome {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Apply `filter` to records in append order; the result is newest first.
pub fn filter_records(
    records: Vec<AuditRecord>,
    filter: &AuditFilter,
) -> Result<Vec<AuditRecord>> {
    let limit = filter.effective_limit()?;
    let mut matched: Vec<AuditRecord> = records
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();
    // Reverse first so equal timestamps stay newest-appended first.
    matched.reverse();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(matched.into_iter().skip(filter.offset).take(limit).collect())
}

/// Record counts, overall and grouped by action and outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub by_action: BTreeMap<String, usize>,
    pub by_outcome: BTreeMap<String, usize>,
}

pub fn summarize(records: &[AuditRecord]) -> AuditSummary {
    let mut summary = AuditSummary {
        total: records.len(),
        ..AuditSummary::default()
    };
    for record in records {
        *summary.by_action.entry(record.action.clone()).or_default() += 1;
        *summary
            .by_outcome
            .entry(record.outcome.as_str().to_string())
            .or_default() += 1;
    }
    summary
}
