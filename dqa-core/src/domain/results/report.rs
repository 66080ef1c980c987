// dqa-core/src/domain/results/report.rs

use crate::domain::results::record::ResultRecord;
use crate::domain::results::schema::SchemaVersion;

pub const REPORT_EXTENSION: &str = "csv";

/// One results file of a secondary report: the findings for a single table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFile {
    pub name: String,
    pub version: SchemaVersion,
    pub records: Vec<ResultRecord>,
}

impl ReportFile {
    /// An empty file in the newest layout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: SchemaVersion::LATEST,
            records: Vec::new(),
        }
    }

    pub fn with_records(
        name: impl Into<String>,
        version: SchemaVersion,
        records: Vec<ResultRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            records,
        }
    }

    /// File name for a table (`person` -> `person.csv`).
    pub fn file_name_for(table: &str) -> String {
        format!("{}.{}", table, REPORT_EXTENSION)
    }

    /// Table this file is named after.
    pub fn table(&self) -> &str {
        self.name
            .strip_suffix(&format!(".{}", REPORT_EXTENSION))
            .unwrap_or(&self.name)
    }

    /// Stable sort by field name; records of one field keep their relative order.
    pub fn sort_by_field(&mut self) {
        self.records.sort_by(|a, b| a.field.cmp(&b.field));
    }

    pub fn issues(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter().filter(|r| r.is_issue())
    }

    /// Model name and version the file was produced against (taken from the first record).
    pub fn model(&self) -> Option<(&str, &str)> {
        self.records
            .first()
            .map(|r| (r.model.as_str(), r.model_version.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
