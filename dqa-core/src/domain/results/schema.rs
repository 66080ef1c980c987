// dqa-core/src/domain/results/schema.rs
//
// Historical column layouts of a results file. The set is append-only: a new
// layout gets a new variant, existing variants never change.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::ident::column_key;
use crate::domain::results::rank::Rank;
use crate::domain::results::record::ResultRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Model,
    ModelVersion,
    DataVersion,
    DqaVersion,
    Table,
    Field,
    Goal,
    IssueCode,
    IssueDescription,
    Finding,
    Prevalence,
    Rank,
    SiteResponse,
    Cause,
    Status,
    Reviewer,
    GithubId,
    Method,
}

impl Column {
    /// Header text as written to disk.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::ModelVersion => "Model Version",
            Self::DataVersion => "Data Version",
            Self::DqaVersion => "DQA Version",
            Self::Table => "Table",
            Self::Field => "Field",
            Self::Goal => "Goal",
            Self::IssueCode => "Issue Code",
            Self::IssueDescription => "Issue Description",
            Self::Finding => "Finding",
            Self::Prevalence => "Prevalence",
            Self::Rank => "Rank",
            Self::SiteResponse => "Site Response",
            Self::Cause => "Cause",
            Self::Status => "Status",
            Self::Reviewer => "Reviewer",
            Self::GithubId => "Github ID",
            Self::Method => "Method",
        }
    }

    /// Resolves a header cell. Matching ignores case, surrounding whitespace,
    /// and treats spaces as underscores.
    pub fn from_header(cell: &str) -> Option<Self> {
        let column = match column_key(cell).as_str() {
            "model" => Self::Model,
            "model_version" => Self::ModelVersion,
            "data_version" => Self::DataVersion,
            "dqa_version" => Self::DqaVersion,
            "table" => Self::Table,
            "field" => Self::Field,
            "goal" => Self::Goal,
            "issue_code" => Self::IssueCode,
            "issue_description" => Self::IssueDescription,
            "finding" => Self::Finding,
            "prevalence" => Self::Prevalence,
            "rank" => Self::Rank,
            "site_response" => Self::SiteResponse,
            "cause" => Self::Cause,
            "status" => Self::Status,
            "reviewer" => Self::Reviewer,
            "github_id" => Self::GithubId,
            "method" => Self::Method,
            _ => return None,
        };
        Some(column)
    }
}

const V1_COLUMNS: [Column; 16] = [
    Column::Model,
    Column::ModelVersion,
    Column::DataVersion,
    Column::DqaVersion,
    Column::Table,
    Column::Field,
    Column::Goal,
    Column::IssueCode,
    Column::IssueDescription,
    Column::Finding,
    Column::Prevalence,
    Column::Rank,
    Column::SiteResponse,
    Column::Cause,
    Column::Status,
    Column::Reviewer,
];

const V2_COLUMNS: [Column; 17] = [
    Column::Model,
    Column::ModelVersion,
    Column::DataVersion,
    Column::DqaVersion,
    Column::Table,
    Column::Field,
    Column::Goal,
    Column::IssueCode,
    Column::IssueDescription,
    Column::Finding,
    Column::Prevalence,
    Column::Rank,
    Column::SiteResponse,
    Column::Cause,
    Column::Status,
    Column::Reviewer,
    Column::GithubId,
];

const V3_COLUMNS: [Column; 15] = [
    Column::Model,
    Column::ModelVersion,
    Column::DataVersion,
    Column::DqaVersion,
    Column::Table,
    Column::Field,
    Column::IssueCode,
    Column::IssueDescription,
    Column::Finding,
    Column::Prevalence,
    Column::Rank,
    Column::Cause,
    Column::Status,
    Column::GithubId,
    Column::Method,
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Goal, Site Response and Reviewer columns.
    V1,
    /// V1 plus the Github ID issue reference.
    V2,
    /// Drops Goal/Site Response/Reviewer, adds the resolution Method.
    #[default]
    V3,
}

impl SchemaVersion {
    pub const LATEST: SchemaVersion = SchemaVersion::V3;
    pub const ALL: [SchemaVersion; 3] = [SchemaVersion::V1, SchemaVersion::V2, SchemaVersion::V3];

    pub fn number(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.number() == number)
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::V1 => &V1_COLUMNS,
            Self::V2 => &V2_COLUMNS,
            Self::V3 => &V3_COLUMNS,
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns().iter().map(Column::title).collect()
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns().contains(&column)
    }

    /// The layout whose column set is exactly `present`.
    pub fn detect(present: &HashSet<Column>) -> Option<Self> {
        Self::ALL.into_iter().find(|v| {
            v.columns().len() == present.len() && v.columns().iter().all(|c| present.contains(c))
        })
    }

    /// Encodes a record in this layout's column order.
    pub fn encode(&self, record: &ResultRecord) -> Vec<String> {
        self.columns()
            .iter()
            .map(|column| record.value(*column).to_string())
            .collect()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Position of every column of a parsed header, plus the layout it implies.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    version: SchemaVersion,
    positions: Vec<(Column, usize)>,
    width: usize,
}

impl ColumnMap {
    /// Indexes a header row. Fails on the first unrecognized column, or when the
    /// recognized columns do not form one of the known layouts.
    pub fn from_header<S: AsRef<str>>(row: &[S]) -> Result<Self, DomainError> {
        let mut positions = Vec::with_capacity(row.len());
        let mut seen = HashSet::new();

        for (idx, cell) in row.iter().enumerate() {
            let cell = cell.as_ref();
            let column =
                Column::from_header(cell).ok_or_else(|| DomainError::InvalidHeader(cell.to_string()))?;
            if !seen.insert(column) {
                return Err(DomainError::UnknownLayout(format!(
                    "duplicate column '{}'",
                    column.title()
                )));
            }
            positions.push((column, idx));
        }

        let version = SchemaVersion::detect(&seen).ok_or_else(|| {
            let expected = SchemaVersion::ALL
                .iter()
                .map(|v| format!("{}: {} columns", v, v.columns().len()))
                .collect::<Vec<_>>()
                .join(", ");
            DomainError::UnknownLayout(format!("found {} columns; {}", row.len(), expected))
        })?;

        Ok(Self {
            version,
            positions,
            width: row.len(),
        })
    }

    /// Canonical map of a layout (header written in its own order).
    pub fn for_version(version: SchemaVersion) -> Self {
        Self {
            version,
            positions: version
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, c)| (*c, idx))
                .collect(),
            width: version.columns().len(),
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, idx)| *idx)
    }

    /// Builds a record from a row already checked to have `width()` cells.
    /// Unknown rank text is kept as raw text instead of failing.
    pub fn decode<S: AsRef<str>>(&self, row: &[S]) -> ResultRecord {
        let mut record = ResultRecord {
            version: self.version,
            ..Default::default()
        };

        for (column, idx) in &self.positions {
            let value = row.get(*idx).map(|v| v.as_ref()).unwrap_or_default();
            match column {
                Column::Rank => {
                    record.rank = Rank::from_label(value).unwrap_or_default();
                    record.raw_rank = value.to_string();
                }
                other => record.set_value(*other, value.to_string()),
            }
        }

        record
    }
}
