// dqa-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid header: unrecognized column '{0}'")]
    #[diagnostic(
        code(dqa::domain::header),
        help("Column names are matched case-insensitively, spaces count as underscores.")
    )]
    InvalidHeader(String),

    #[error("Invalid header: columns do not match any known results layout ({0})")]
    #[diagnostic(
        code(dqa::domain::header_layout),
        help("Run 'dqa migrate' on files produced by older tooling.")
    )]
    UnknownLayout(String),

    #[error("Line {line}: wrong number of fields (expected {expected}, found {found})")]
    #[diagnostic(code(dqa::domain::column_count))]
    WrongColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {message}")]
    #[diagnostic(code(dqa::domain::rule_parse))]
    RuleParse { line: usize, message: String },

    #[error("Rule set '{rule_set}' has {count} validation error(s)")]
    #[diagnostic(
        code(dqa::domain::rule_validation),
        help("Fix undefined tables, fields or ranks before ranking issues.")
    )]
    RuleValidation { rule_set: String, count: usize },

    #[error("Resolver protocol violation: {0}")]
    #[diagnostic(
        code(dqa::domain::resolver_protocol),
        help("The resolver must print one JSON array per input conflict, in input order.")
    )]
    ResolverProtocol(String),

    #[error("No report file '{0}' for the findings of that table")]
    #[diagnostic(
        code(dqa::domain::missing_report),
        help("Generate the report templates first, or fix the table name in the issue log.")
    )]
    MissingReport(String),

    #[error("Issue log is missing required columns: {0}")]
    #[diagnostic(code(dqa::domain::issue_log))]
    IssueLog(String),
}
