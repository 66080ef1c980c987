// dqa-core/src/infrastructure/issue_log.rs
//
// Issue logs: newly detected findings produced by the data quality checks.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::ident::column_key;
use crate::domain::results::record::{split_data_version, METHOD_AUTO, STATUS_NEW};
use crate::domain::results::{ResultRecord, SchemaVersion};
use crate::error::DqaError;
use crate::infrastructure::codec::UniversalReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogColumn {
    DataVersion,
    Table,
    Field,
    IssueCode,
    IssueDescription,
    Finding,
    Prevalence,
}

impl LogColumn {
    const ALL: [LogColumn; 7] = [
        LogColumn::DataVersion,
        LogColumn::Table,
        LogColumn::Field,
        LogColumn::IssueCode,
        LogColumn::IssueDescription,
        LogColumn::Finding,
        LogColumn::Prevalence,
    ];

    fn from_header(cell: &str) -> Option<Self> {
        let column = match column_key(cell).as_str() {
            "data_version" => Self::DataVersion,
            "table" => Self::Table,
            "field" => Self::Field,
            "check_code" | "issue_code" => Self::IssueCode,
            "check_type" | "issue_description" => Self::IssueDescription,
            "finding" => Self::Finding,
            "prevalence" => Self::Prevalence,
            _ => return None,
        };
        Some(column)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::DataVersion => "data_version",
            Self::Table => "table",
            Self::Field => "field",
            Self::IssueCode => "check_code",
            Self::IssueDescription => "check_type",
            Self::Finding => "finding",
            Self::Prevalence => "prevalence",
        }
    }
}

/// Reads new findings from an issue log. Each becomes a record in the newest
/// layout with status `new` and method `auto`.
pub fn read_issue_log<R: Read>(reader: R) -> Result<Vec<ResultRecord>, DqaError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(UniversalReader::new(reader));

    let mut header = csv::StringRecord::new();
    if !csv.read_record(&mut header)? {
        return Ok(Vec::new());
    }

    let mut positions: Vec<(LogColumn, usize)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        match LogColumn::from_header(cell) {
            Some(column) => positions.push((column, idx)),
            None => warn!(column = %cell.trim(), "Ignoring unknown issue log column"),
        }
    }

    let missing: Vec<&str> = LogColumn::ALL
        .iter()
        .filter(|c| !positions.iter().any(|(p, _)| p == *c))
        .map(LogColumn::name)
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::IssueLog(missing.join(", ")).into());
    }

    let width = header.len();
    let mut issues = Vec::new();
    let mut row = csv::StringRecord::new();

    while csv.read_record(&mut row)? {
        if row.len() != width {
            return Err(DomainError::WrongColumnCount {
                line: row.position().map(|p| p.line()).unwrap_or_default(),
                expected: width,
                found: row.len(),
            }
            .into());
        }

        let mut issue = ResultRecord {
            dqa_version: "0".to_string(),
            status: STATUS_NEW.to_string(),
            method: METHOD_AUTO.to_string(),
            version: SchemaVersion::LATEST,
            ..Default::default()
        };

        for (column, idx) in &positions {
            let value = row.get(*idx).unwrap_or_default().trim_start().to_string();
            match column {
                LogColumn::DataVersion => issue.data_version = value,
                LogColumn::Table => issue.table = value,
                LogColumn::Field => issue.field = value,
                LogColumn::IssueCode => issue.issue_code = value,
                LogColumn::IssueDescription => issue.issue_description = value,
                LogColumn::Finding => issue.finding = value,
                LogColumn::Prevalence => issue.prevalence = value,
            }
        }

        let (model, model_version) = split_data_version(&issue.data_version);
        issue.model = model;
        issue.model_version = model_version;

        issues.push(issue);
    }

    Ok(issues)
}

#[instrument]
pub fn read_issue_log_file(path: &Path) -> Result<Vec<ResultRecord>, DqaError> {
    read_issue_log(File::open(path)?)
}
