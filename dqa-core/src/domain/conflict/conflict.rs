// dqa-core/src/domain/conflict/conflict.rs

use serde::{Deserialize, Serialize};

use crate::domain::conflict::catalog::Threshold;
use crate::domain::ident::same;
use crate::domain::results::{ReportFile, ResultRecord};

/// Which columns identify "the same finding" when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    /// Field and issue code, within the table's own report file.
    #[default]
    FieldIssueCode,
    TableFieldIssueCode,
}

impl MatchKey {
    pub fn matches(&self, existing: &ResultRecord, finding: &ResultRecord) -> bool {
        let base = same(&existing.field, &finding.field)
            && same(&existing.issue_code, &finding.issue_code);
        match self {
            Self::FieldIssueCode => base,
            Self::TableFieldIssueCode => base && same(&existing.table, &finding.table),
        }
    }
}

/// Where a new finding lands in an existing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Nothing matched; the finding is appended.
    New,
    /// Matched a record still open for review.
    Conflict(usize),
    /// Matched a finalized record; already represented.
    Represented(usize),
}

/// First record matching `finding` under `key` decides the outcome.
pub fn scan(report: &ReportFile, finding: &ResultRecord, key: MatchKey) -> ScanOutcome {
    match report
        .records
        .iter()
        .position(|existing| key.matches(existing, finding))
    {
        None => ScanOutcome::New,
        Some(index) if report.records[index].is_open() => ScanOutcome::Conflict(index),
        Some(index) => ScanOutcome::Represented(index),
    }
}

/// A new finding ("log") colliding with an open existing one ("secondary").
///
/// Serialized as the resolver expects; the bookkeeping members stay local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Position of `secondary` in its report file.
    #[serde(skip)]
    pub index: usize,
    /// Report file name.
    #[serde(skip)]
    pub file: String,
    pub log: ResultRecord,
    pub secondary: ResultRecord,
    pub threshold_low: i64,
    pub threshold_high: i64,
}

impl Conflict {
    pub fn new(file: impl Into<String>, index: usize, log: ResultRecord, secondary: ResultRecord) -> Self {
        Self {
            index,
            file: file.into(),
            log,
            secondary,
            threshold_low: 0,
            threshold_high: 0,
        }
    }

    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold_low = threshold.lower;
        self.threshold_high = threshold.upper;
    }

    pub fn table(&self) -> &str {
        &self.secondary.table
    }

    pub fn field(&self) -> &str {
        &self.secondary.field
    }

    pub fn issue_code(&self) -> &str {
        &self.secondary.issue_code
    }
}
