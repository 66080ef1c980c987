// dqa-core/src/application/templates.rs

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{info, instrument};

use crate::domain::ident::normalize;
use crate::domain::model::DataModel;
use crate::domain::ports::SchemaProvider;
use crate::domain::results::record::{data_version_key, METHOD_AUTO};
use crate::domain::results::vocabulary::is_excluded_table;
use crate::domain::results::{ReportFile, ResultRecord, SchemaVersion};
use crate::error::DqaError;
use crate::infrastructure::codec::write_report;

/// Identifies the site extract a template is generated for.
#[derive(Debug, Clone)]
pub struct TemplateRequest {
    pub site: String,
    pub extract: String,
    pub dqa_version: String,
}

/// Builds one template per data model table, newest layout, one blank record
/// per field. When `previous` is given, open issues (persistent or under
/// review) of the same field replace the blank record.
pub fn build_templates(
    model: &DataModel,
    request: &TemplateRequest,
    previous: Option<&BTreeMap<String, ReportFile>>,
) -> Vec<ReportFile> {
    let data_version = data_version_key(&model.name, &model.version, &request.site, &request.extract);

    model
        .tables()
        .iter()
        .filter(|table| !is_excluded_table(&normalize(&table.name)))
        .map(|table| {
            let name = ReportFile::file_name_for(&table.name);
            let carried = previous
                .and_then(|files| files.get(&name))
                .map(open_issues_by_field)
                .unwrap_or_default();

            let blank = |field: &str| ResultRecord {
                model: model.name.clone(),
                model_version: model.version.clone(),
                data_version: data_version.clone(),
                dqa_version: request.dqa_version.clone(),
                table: table.name.clone(),
                field: field.to_string(),
                version: SchemaVersion::LATEST,
                ..Default::default()
            };

            let mut records = Vec::with_capacity(table.fields.len());
            for field in &table.fields {
                match carried.get(&normalize(field)) {
                    Some(issues) => records.extend(issues.iter().map(|issue| {
                        let mut record = blank(field);
                        carry_issue(&mut record, issue);
                        record
                    })),
                    None => records.push(blank(field)),
                }
            }

            ReportFile::with_records(name, SchemaVersion::LATEST, records)
        })
        .collect()
}

fn open_issues_by_field(file: &ReportFile) -> HashMap<String, Vec<&ResultRecord>> {
    let mut index: HashMap<String, Vec<&ResultRecord>> = HashMap::new();
    for record in file.records.iter().filter(|r| r.is_open()) {
        index.entry(normalize(&record.field)).or_default().push(record);
    }
    index
}

fn carry_issue(record: &mut ResultRecord, issue: &ResultRecord) {
    record.goal = issue.goal.clone();
    record.issue_code = issue.issue_code.clone();
    record.issue_description = issue.issue_description.clone();
    record.finding = issue.finding.clone();
    record.prevalence = issue.prevalence.clone();
    record.rank = issue.rank;
    record.raw_rank = issue.raw_rank.clone();
    record.site_response = issue.site_response.clone();
    record.cause = issue.cause.clone();
    record.status = issue.status.clone();
    record.reviewer = issue.reviewer.clone();
    record.github_id = issue.github_id.clone();
    record.method = if issue.method.is_empty() {
        METHOD_AUTO.to_string()
    } else {
        issue.method.clone()
    };
}

/// Writes the templates into `out_dir`, creating it when needed.
#[instrument(skip_all, fields(dir = %out_dir.display(), files = templates.len()))]
pub fn write_templates(out_dir: &Path, templates: &[ReportFile]) -> Result<(), DqaError> {
    std::fs::create_dir_all(out_dir)?;
    for template in templates {
        write_report(out_dir, template)?;
    }
    info!("Wrote templates");
    Ok(())
}
