// dqa-core/src/application/mod.rs

pub mod merge;
pub mod migrate;
pub mod ranking;
pub mod report;
pub mod templates;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI imports use cases from here without knowing the file layout.

pub use merge::{load_issue_logs, merge_issues, IssueLog, MergeRequest, MergeSummary};
pub use migrate::{migrate_directory, MigrationOutcome, MigrationSummary};
pub use ranking::{assign_ranks, build_engine, load_rule_sets, write_changed, RankMatch, RankSummary};
pub use report::IssueReport;
pub use templates::{build_templates, write_templates, TemplateRequest};
pub use validation::{validate_directory, FileValidation, ValidationSummary};
