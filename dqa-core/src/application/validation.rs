// dqa-core/src/application/validation.rs

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::domain::results::validation::needs_migration;
use crate::domain::results::{validate_report, SchemaVersion};
use crate::error::DqaError;
use crate::infrastructure::codec::{read_report, report_paths};

/// Result of checking one report file.
#[derive(Debug)]
pub struct FileValidation {
    pub name: String,
    pub version: SchemaVersion,
    /// Record index → messages such as `status = 'closed'`.
    pub errors: BTreeMap<usize, Vec<String>>,
    pub needs_migration: bool,
}

impl FileValidation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub files: Vec<FileValidation>,
    /// Files that could not be read at all.
    pub unreadable: Vec<(String, DqaError)>,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.unreadable.is_empty() && self.files.iter().all(FileValidation::is_clean)
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum::<usize>() + self.unreadable.len()
    }
}

/// Checks every report file of `dir` against the controlled vocabularies.
#[instrument(fields(dir = %dir.display()))]
pub fn validate_directory(dir: &Path) -> Result<ValidationSummary, DqaError> {
    let mut summary = ValidationSummary::default();

    for path in report_paths(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match read_report(&path) {
            Ok(report) => {
                let errors = validate_report(&report);
                if !errors.is_empty() {
                    warn!(file = %name, records = errors.len(), "Invalid values");
                }
                summary.files.push(FileValidation {
                    needs_migration: needs_migration(&report),
                    version: report.version,
                    errors,
                    name,
                });
            }
            Err(e) => {
                warn!(file = %name, error = %e, "Unreadable report file");
                summary.unreadable.push((name, e));
            }
        }
    }

    info!(files = summary.files.len(), errors = summary.error_count(), "Validation finished");
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    const V2_HEADER: &str = "Model,Model Version,Data Version,DQA Version,Table,Field,Goal,Issue Code,Issue Description,Finding,Prevalence,Rank,Site Response,Cause,Status,Reviewer,Github ID\n";

    #[test]
    fn test_reports_bad_values_per_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("person.csv"),
            format!(
                "{V2_HEADER}pedsnet,2.3.0,v,0,person,person_id,Fidelity,g4-001,d,f,full,High,,ETL,new,,\n\
                 pedsnet,2.3.0,v,0,person,year_of_birth,Speed,g2-013,d,f,full,Urgent,,ETL,closed,,\n"
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join("death.csv"),
            format!("{V2_HEADER}pedsnet,2.3.0,v,0,death,death_date,Accuracy,,,,,,,,,,\n"),
        )
        .unwrap();
        fs::write(dir.path().join("broken.csv"), "Model,Version\n").unwrap();

        let summary = validate_directory(dir.path()).unwrap();
        assert!(!summary.is_clean());
        assert_eq!(summary.unreadable.len(), 1);
        assert_eq!(summary.unreadable[0].0, "broken.csv");

        let death = &summary.files[0];
        assert_eq!(death.name, "death.csv");
        assert!(death.is_clean());
        assert!(death.needs_migration);

        let person = &summary.files[1];
        assert_eq!(person.errors.len(), 1);
        // Records are sorted by field on read: year_of_birth comes second.
        assert_eq!(
            person.errors[&1],
            ["goal = 'Speed'", "rank = 'Urgent'", "status = 'closed'"]
        );
        assert_eq!(summary.error_count(), 2);
    }
}
