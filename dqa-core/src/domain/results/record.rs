// dqa-core/src/domain/results/record.rs

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::domain::ident::normalize;
use crate::domain::results::rank::Rank;
use crate::domain::results::schema::{Column, SchemaVersion};

pub const STATUS_PERSISTENT: &str = "persistent";
pub const STATUS_UNDER_REVIEW: &str = "under review";
pub const STATUS_NEW: &str = "new";
pub const METHOD_AUTO: &str = "auto";

/// One finding about a single (table, field).
///
/// The struct is the union of every historical layout; `version` records the
/// layout the row was read from. Columns absent from that layout stay empty.
/// JSON keys keep the historical PascalCase names used by resolver scripts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResultRecord {
    pub model: String,
    pub model_version: String,
    pub data_version: String,
    #[serde(rename = "DQAVersion")]
    pub dqa_version: String,
    pub table: String,
    pub field: String,
    pub goal: String,
    pub issue_code: String,
    pub issue_description: String,
    pub finding: String,
    pub prevalence: String,
    pub rank: Rank,
    pub site_response: String,
    pub cause: String,
    pub status: String,
    pub reviewer: String,
    #[serde(rename = "GithubID")]
    pub github_id: String,
    pub method: String,

    /// Rank cell exactly as read, kept so unknown labels survive a round trip
    /// and can be reported by validation.
    #[serde(skip)]
    pub raw_rank: String,

    #[serde(skip)]
    pub version: SchemaVersion,
}

impl ResultRecord {
    pub fn value(&self, column: Column) -> Cow<'_, str> {
        let value = match column {
            Column::Model => &self.model,
            Column::ModelVersion => &self.model_version,
            Column::DataVersion => &self.data_version,
            Column::DqaVersion => &self.dqa_version,
            Column::Table => &self.table,
            Column::Field => &self.field,
            Column::Goal => &self.goal,
            Column::IssueCode => &self.issue_code,
            Column::IssueDescription => &self.issue_description,
            Column::Finding => &self.finding,
            Column::Prevalence => &self.prevalence,
            Column::Rank => {
                return if self.rank.is_set() {
                    Cow::Borrowed(self.rank.as_str())
                } else {
                    Cow::Borrowed(self.raw_rank.as_str())
                };
            }
            Column::SiteResponse => &self.site_response,
            Column::Cause => &self.cause,
            Column::Status => &self.status,
            Column::Reviewer => &self.reviewer,
            Column::GithubId => &self.github_id,
            Column::Method => &self.method,
        };
        Cow::Borrowed(value.as_str())
    }

    pub fn set_value(&mut self, column: Column, value: String) {
        match column {
            Column::Model => self.model = value,
            Column::ModelVersion => self.model_version = value,
            Column::DataVersion => self.data_version = value,
            Column::DqaVersion => self.dqa_version = value,
            Column::Table => self.table = value,
            Column::Field => self.field = value,
            Column::Goal => self.goal = value,
            Column::IssueCode => self.issue_code = value,
            Column::IssueDescription => self.issue_description = value,
            Column::Finding => self.finding = value,
            Column::Prevalence => self.prevalence = value,
            Column::Rank => {
                self.rank = Rank::from_label(&value).unwrap_or_default();
                self.raw_rank = value;
            }
            Column::SiteResponse => self.site_response = value,
            Column::Cause => self.cause = value,
            Column::Status => self.status = value,
            Column::Reviewer => self.reviewer = value,
            Column::GithubId => self.github_id = value,
            Column::Method => self.method = value,
        }
    }

    /// Replaces the rank, keeping the raw cell in sync.
    pub fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
        self.raw_rank = rank.as_str().to_string();
    }

    /// Raw rank text that could not be parsed, if any.
    pub fn invalid_rank(&self) -> Option<&str> {
        (!self.rank.is_set() && !self.raw_rank.trim().is_empty()).then_some(self.raw_rank.as_str())
    }

    pub fn is_persistent(&self) -> bool {
        normalize(&self.status) == STATUS_PERSISTENT
    }

    pub fn is_under_review(&self) -> bool {
        normalize(&self.status) == STATUS_UNDER_REVIEW
    }

    /// Not finalized: still open for discussion with the site.
    pub fn is_open(&self) -> bool {
        self.is_persistent() || self.is_under_review()
    }

    /// A flagged issue: carries an issue code and is not a standing persistent finding.
    pub fn is_issue(&self) -> bool {
        !self.issue_code.trim().is_empty() && !self.is_persistent()
    }
}

/// Splits a data version key (`model-version-site-extract`) into model and model version.
pub fn split_data_version(data_version: &str) -> (String, String) {
    let mut parts = data_version.splitn(3, '-');
    let model = parts.next().unwrap_or_default().to_string();
    let version = parts.next().unwrap_or_default().to_string();
    (model, version)
}

/// Builds the data version key shared by every record of one site extract.
pub fn data_version_key(model: &str, model_version: &str, site: &str, extract: &str) -> String {
    format!("{}-{}-{}-{}", model, model_version, site, extract)
}
